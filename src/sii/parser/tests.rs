use super::*;
use crate::fs::MemoryFileSystem;

const ROAD_LOOK: &str = r#"SiiNunit
{
# Autobahn, baulich getrennt
road_look : road.hw2_1 {
    name: "Highway 2+2"
    lanes_left[]: traffic_lane.road.expressway
    lanes_left[]: traffic_lane.road.expressway
    lanes_right[]: traffic_lane.road.expressway
    lanes_right[]: traffic_lane.road.expressway
    road_offset: 1.5
    lane_offsets_right: 2
    lane_offsets_right[0]: (0, 0)
    lane_offsets_right[1]: (0.5, 0)
}

road_look : local_1 {
    lanes_right[]: traffic_lane.road.local
    lane_offsets_right[]: &3f800000 // 1.0
}
}
"#;

fn parse(text: &str) -> DefinitionFile {
    parse_sii_text("/def/world/road_look.sii", text).expect("Parsing fehlgeschlagen")
}

#[test]
fn test_parse_framed_units_in_order() {
    let file = parse(ROAD_LOOK);

    assert_eq!(file.path, "/def/world/road_look.sii");
    assert_eq!(file.unit_count(), 2);
    assert_eq!(file.units[0].class, "road_look");
    assert_eq!(file.units[0].name, "road.hw2_1");
    assert_eq!(file.units[1].name, "local_1");
}

#[test]
fn test_parse_strings_keep_quotes() {
    let file = parse(ROAD_LOOK);
    let unit = file.find_unit("road.hw2_1").expect("Unit erwartet");

    assert_eq!(
        unit.get("name").and_then(|v| v.as_str()),
        Some("\"Highway 2+2\"")
    );
}

#[test]
fn test_parse_append_arrays_and_tokens() {
    let file = parse(ROAD_LOOK);
    let unit = file.find_unit("road.hw2_1").expect("Unit erwartet");

    let lanes = unit
        .get("lanes_right")
        .and_then(|v| v.as_list())
        .expect("Liste erwartet");
    assert_eq!(lanes.len(), 2);
    assert_eq!(lanes[0].as_str(), Some("traffic_lane.road.expressway"));
}

#[test]
fn test_parse_size_declaration_is_replaced_by_indexed_entries() {
    let file = parse(ROAD_LOOK);
    let unit = file.find_unit("road.hw2_1").expect("Unit erwartet");

    let offsets = unit
        .get("lane_offsets_right")
        .and_then(|v| v.as_list())
        .expect("Liste erwartet");
    assert_eq!(offsets.len(), 2);
    assert_eq!(offsets[1].as_vec2(), Some(Vec2::new(0.5, 0.0)));
    assert_eq!(unit.get("road_offset").and_then(|v| v.as_number()), Some(1.5));
}

#[test]
fn test_parse_hex_float() {
    let file = parse(ROAD_LOOK);
    let unit = file.find_unit("local_1").expect("Unit erwartet");

    let offsets = unit
        .get("lane_offsets_right")
        .and_then(|v| v.as_list())
        .expect("Liste erwartet");
    assert_eq!(offsets[0].as_number(), Some(1.0));
}

#[test]
fn test_parse_unframed_file_and_tuples() {
    let file = parse(
        "prefab_model : prefab.cross { pos: (1, 2, 3) rot: (1; 0, 0, 0) single: (4) }",
    );
    let unit = &file.units[0];

    assert_eq!(
        unit.get("pos").and_then(|v| v.as_vec3()),
        Some(Vec3::new(1.0, 2.0, 3.0))
    );
    assert_eq!(unit.get("rot").map(|v| v.element_count()), Some(4));
    assert_eq!(unit.get("single").and_then(|v| v.as_number()), Some(4.0));
}

#[test]
fn test_parse_number_rules() {
    assert_eq!(parse_number("-2.25"), Some(-2.25));
    assert_eq!(parse_number("1e2"), Some(100.0));
    assert_eq!(parse_number("&bf800000"), Some(-1.0));
    assert_eq!(parse_number("&123"), None);
    assert_eq!(parse_number("traffic_lane.road"), None);
    assert_eq!(parse_number(".anon"), None);
}

#[test]
fn test_parse_fails_for_unclosed_unit() {
    let err = parse_sii_text("/x.sii", "road_look : road.a { lanes_right[]: a")
        .expect_err("Parser sollte fehlschlagen");
    let msg = format!("{err:#}");
    assert!(msg.contains("road.a"), "{msg}");
}

#[test]
fn test_parse_fails_for_skipped_index() {
    let err = parse_sii_text("/x.sii", "a : b { lanes[2]: x }").expect_err("Fehler erwartet");
    assert!(format!("{err:#}").contains("überspringt"));
}

#[test]
fn test_parse_fails_for_trailing_content_after_frame() {
    assert!(parse_sii_text("/x.sii", "SiiNunit { } a : b { }").is_err());
    assert!(parse_sii_text("/x.sii", "SiiNunit { a : b { }").is_err());
}

#[test]
fn test_parser_resolves_includes_relative_to_file() {
    let fs = MemoryFileSystem::new().with_file(
        "/def/world/road_look.hw.sui",
        "lanes_right[]: traffic_lane.road.expressway\nroad_offset: 2.0\n",
    );
    let text = "SiiNunit {\nroad_look : road.hw {\n@include \"road_look.hw.sui\"\n}\n}\n";

    let file = SiiTextParser
        .parse("/def/world/road_look.sii", text.as_bytes(), &fs)
        .expect("Parsing mit Include fehlgeschlagen");
    let unit = file.find_unit("road.hw").expect("Unit erwartet");

    assert_eq!(unit.get("lanes_right").map(|v| v.element_count()), Some(1));
    assert_eq!(unit.get("road_offset").and_then(|v| v.as_number()), Some(2.0));
    assert_eq!(fs.open_count("/def/world/road_look.hw.sui"), 1);
}

#[test]
fn test_parser_reports_missing_include() {
    let fs = MemoryFileSystem::new();
    let text = "a : b {\n@include \"fehlt.sui\"\n}\n";

    let err = SiiTextParser
        .parse("/def/world/x.sii", text.as_bytes(), &fs)
        .expect_err("Fehler erwartet");
    assert!(format!("{err:#}").contains("@include"));
}

#[test]
fn test_parser_skips_utf8_bom() {
    let mut data = vec![0xEF, 0xBB, 0xBF];
    data.extend_from_slice(b"SiiNunit { a : b { } }");
    let file = SiiTextParser
        .parse("/x.sii", &data, &MemoryFileSystem::new())
        .expect("BOM sollte ignoriert werden");
    assert_eq!(file.unit_count(), 1);
}
