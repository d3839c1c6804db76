//! Fahrspur-Mittellinien-Offsets aus Road-Look-Templates.
//!
//! Offsets sind Querabstände zur Straßenmittellinie in Metern. Rechts und
//! links werden getrennt geführt; eine leere Seite bedeutet "keine Spuren".

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::cache::{lock, CacheEntry, TemplateCache};
use crate::core::Road;
use crate::error::LookupError;
use crate::sii::{AttributeValue, Unit};

/// Offsets der Fahrspur-Mittellinien einer Straße.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaneGeometry {
    /// Linke Spuren (nur bei baulich getrennten Straßen)
    pub left: Vec<f32>,
    /// Rechte Spuren
    pub right: Vec<f32>,
}

impl LaneGeometry {
    /// `true` wenn keine Seite Spuren hat.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    /// Gesamtzahl der Spuren.
    pub fn lane_count(&self) -> usize {
        self.left.len() + self.right.len()
    }
}

fn write_side(f: &mut fmt::Formatter<'_>, side: &[f32]) -> fmt::Result {
    if side.is_empty() {
        return f.write_str("[0]");
    }
    f.write_str("[")?;
    for (i, offset) in side.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{offset}")?;
    }
    f.write_str("]")
}

impl fmt::Display for LaneGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_side(f, &self.left)?;
        f.write_str(", ")?;
        write_side(f, &self.right)
    }
}

/// Listen-Attribut mit mindestens einem Eintrag.
fn non_empty_list<'a>(unit: &'a Unit, key: &str) -> Option<&'a [AttributeValue]> {
    unit.get(key)
        .and_then(|v| v.as_list())
        .filter(|items| !items.is_empty())
}

/// Individuelle Zusatz-Offsets (`x`-Komponente), Skalar oder Vektor.
fn extra_offsets(unit: &Unit, key: &str) -> Vec<f32> {
    match unit.get(key) {
        Some(AttributeValue::List(items)) => items
            .iter()
            .map(|v| v.as_vec2_with_fallback().map_or(0.0, |o| o.x))
            .collect(),
        Some(single) => single
            .as_vec2_with_fallback()
            .map(|o| vec![o.x])
            .unwrap_or_default(),
        None => Vec::new(),
    }
}

/// Berechnet die Spur-Offsets eines Road-Look-Templates.
///
/// - ohne `lanes_right` (oder leer): keine Spuren
/// - mit `lanes_left`: baulich getrennt, rechts ab `+w/2`, links ab `-w/2`
/// - sonst: rechts ab `ceil(n/2) * -w + w/2` in Schritten von `w`
/// - `road_offset` verschiebt rechts um `+o`, links um `-o`
/// - `lane_offsets_right/left` wirken pro Spur (rechts `+`, links `-`)
pub fn compute_lane_centers(unit: &Unit, lane_width: f32) -> LaneGeometry {
    let Some(lanes_right) = non_empty_list(unit, "lanes_right") else {
        return LaneGeometry::default();
    };
    let lanes_left = non_empty_list(unit, "lanes_left");
    let half = lane_width / 2.0;
    let right_count = lanes_right.len();

    let first_right = if lanes_left.is_some() {
        half
    } else {
        (right_count as f32 / 2.0).ceil() * -lane_width + half
    };
    let mut right: Vec<f32> = (0..right_count)
        .map(|i| first_right + i as f32 * lane_width)
        .collect();
    let mut left: Vec<f32> = lanes_left
        .map(|lanes| (0..lanes.len()).map(|i| -half - i as f32 * lane_width).collect())
        .unwrap_or_default();

    if let Some(road_offset) = unit.get("road_offset").and_then(|v| v.as_number()) {
        right.iter_mut().for_each(|o| *o += road_offset);
        left.iter_mut().for_each(|o| *o -= road_offset);
    }

    for (lane, extra) in right.iter_mut().zip(extra_offsets(unit, "lane_offsets_right")) {
        *lane += extra;
    }
    for (lane, extra) in left.iter_mut().zip(extra_offsets(unit, "lane_offsets_left")) {
        *lane -= extra;
    }

    LaneGeometry { left, right }
}

/// Spur-Offsets pro Road-Type-Token, lazy aus den Templates berechnet.
///
/// Nicht auflösbare Tokens landen einmalig (mit Log-Meldung) im
/// Negativ-Cache und werden danach ohne Dateizugriff übersprungen.
/// Road-Types ohne Spuren werden ebenfalls nur beim ersten Mal gemeldet.
pub struct LaneGeometryCalculator {
    templates: Arc<TemplateCache>,
    lane_width: f32,
    cache: Mutex<HashMap<String, CacheEntry<LaneGeometry>>>,
}

impl LaneGeometryCalculator {
    /// Erstellt den Rechner mit der gegebenen Spurbreite.
    pub fn new(templates: Arc<TemplateCache>, lane_width: f32) -> Self {
        Self {
            templates,
            lane_width,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Spur-Offsets für `road_type` oder der Grund, warum es keine gibt.
    pub fn resolve(&self, road_type: &str) -> Result<LaneGeometry, LookupError> {
        let mut cache = lock(&self.cache, "lanes");
        if let Some(entry) = cache.get(road_type) {
            return entry
                .resolved()
                .cloned()
                .ok_or_else(|| LookupError::unresolvable(road_type, "kein Road-Look-Template"));
        }

        let Some(template) = self.templates.lookup_road_template(road_type) else {
            // Solange eine Road-Look-Datei aussteht, ist das Fehlen nicht endgültig
            if self.templates.is_complete() {
                log::warn!("Road-Type '{}' ohne Road-Look-Template, wird ignoriert", road_type);
                cache.insert(road_type.to_string(), CacheEntry::Unresolved);
            }
            return Err(LookupError::unresolvable(road_type, "kein Road-Look-Template"));
        };

        let lanes = compute_lane_centers(&template, self.lane_width);
        if lanes.is_empty() {
            log::warn!("Road-Type '{}' hat keine Fahrspuren", road_type);
        }
        cache.insert(road_type.to_string(), CacheEntry::Resolved(lanes.clone()));
        Ok(lanes)
    }

    /// Spur-Offsets für `road_type`; leer wenn nicht auflösbar.
    pub fn lane_centers(&self, road_type: &str) -> LaneGeometry {
        self.resolve(road_type).unwrap_or_default()
    }

    /// Spur-Offsets einer Straße.
    pub fn lane_centers_for(&self, road: &Road) -> LaneGeometry {
        self.lane_centers(&road.road_type)
    }

    /// `true` wenn `road_type` bereits als nicht auflösbar bekannt ist.
    pub fn is_invalid(&self, road_type: &str) -> bool {
        lock(&self.cache, "lanes")
            .get(road_type)
            .is_some_and(CacheEntry::is_unresolved)
    }

    /// Anzahl gecachter Road-Types (positiv und negativ).
    pub fn cached_count(&self) -> usize {
        lock(&self.cache, "lanes").len()
    }

    /// Leert den Cache.
    pub fn clear(&self) {
        lock(&self.cache, "lanes").clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DefinitionFileReader;
    use crate::fs::MemoryFileSystem;
    use crate::shared::GeometryOptions;
    use approx::assert_relative_eq;
    use glam::Vec2;

    const W: f32 = 4.5;

    fn lanes(n: usize) -> AttributeValue {
        AttributeValue::List(vec![AttributeValue::String("traffic_lane.road".into()); n])
    }

    fn assert_offsets(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?} != {expected:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert_relative_eq!(*a, *e, epsilon = 1e-5);
        }
    }

    #[test]
    fn undivided_roads_are_centered() {
        for n in 1..=12usize {
            let unit = Unit::new("road_look", "road.t").with_attribute("lanes_right", lanes(n));
            let geo = compute_lane_centers(&unit, W);

            assert!(geo.left.is_empty());
            assert_eq!(geo.right.len(), n);
            assert_relative_eq!(geo.right[0], (n as f32 / 2.0).ceil() * -4.5 + 2.25);
            for pair in geo.right.windows(2) {
                assert_relative_eq!(pair[1] - pair[0], 4.5, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn two_lane_road() {
        let unit = Unit::new("road_look", "road.t").with_attribute("lanes_right", lanes(2));
        let geo = compute_lane_centers(&unit, W);
        assert_offsets(&geo.right, &[-2.25, 2.25]);
        assert!(geo.left.is_empty());
    }

    #[test]
    fn road_offset_shifts_both_sides_apart() {
        let unit = Unit::new("road_look", "road.t")
            .with_attribute("lanes_right", lanes(2))
            .with_attribute("road_offset", AttributeValue::Number(1.0));
        assert_offsets(&compute_lane_centers(&unit, W).right, &[-1.25, 3.25]);

        let divided = Unit::new("road_look", "road.t")
            .with_attribute("lanes_right", lanes(2))
            .with_attribute("lanes_left", lanes(2))
            .with_attribute("road_offset", AttributeValue::Number(2.0));
        let geo = compute_lane_centers(&divided, W);
        assert_offsets(&geo.right, &[4.25, 8.75]);
        assert_offsets(&geo.left, &[-4.25, -8.75]);
    }

    #[test]
    fn divided_roads_diverge_from_center() {
        for n in 1..=6usize {
            let unit = Unit::new("road_look", "road.t")
                .with_attribute("lanes_right", lanes(n))
                .with_attribute("lanes_left", lanes(n + 1));
            let geo = compute_lane_centers(&unit, W);

            assert_relative_eq!(geo.right[0], 2.25);
            assert_relative_eq!(geo.left[0], -2.25);
            assert_eq!(geo.left.len(), n + 1);
            for pair in geo.right.windows(2) {
                assert_relative_eq!(pair[1] - pair[0], 4.5, epsilon = 1e-5);
            }
            for pair in geo.left.windows(2) {
                assert_relative_eq!(pair[1] - pair[0], -4.5, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn empty_left_list_means_undivided() {
        let unit = Unit::new("road_look", "road.t")
            .with_attribute("lanes_right", lanes(2))
            .with_attribute("lanes_left", lanes(0));
        let geo = compute_lane_centers(&unit, W);
        assert_offsets(&geo.right, &[-2.25, 2.25]);
        assert!(geo.left.is_empty());
    }

    #[test]
    fn missing_or_empty_right_lanes_give_no_geometry() {
        let none = Unit::new("road_look", "road.t").with_attribute("lanes_left", lanes(2));
        assert!(compute_lane_centers(&none, W).is_empty());

        let empty = Unit::new("road_look", "road.t").with_attribute("lanes_right", lanes(0));
        assert!(compute_lane_centers(&empty, W).is_empty());
    }

    #[test]
    fn individual_offsets_accept_scalars_and_vectors() {
        let unit = Unit::new("road_look", "road.t")
            .with_attribute("lanes_right", lanes(2))
            .with_attribute("lanes_left", lanes(2))
            .with_attribute(
                "lane_offsets_right",
                AttributeValue::List(vec![
                    AttributeValue::Vector2(Vec2::new(0.5, 0.0)),
                    AttributeValue::Number(1.0),
                    AttributeValue::Number(99.0),
                ]),
            )
            .with_attribute(
                "lane_offsets_left",
                AttributeValue::List(vec![AttributeValue::Number(0.25)]),
            );
        let geo = compute_lane_centers(&unit, W);

        assert_offsets(&geo.right, &[2.75, 7.75]);
        assert_offsets(&geo.left, &[-2.5, -6.75]);
    }

    #[test]
    fn display_matches_tooltip_format() {
        let geo = LaneGeometry {
            left: vec![],
            right: vec![-2.25, 2.25],
        };
        assert_eq!(geo.to_string(), "[0], [-2.25, 2.25]");
        assert_eq!(LaneGeometry::default().to_string(), "[0], [0]");
    }

    const ROAD_LOOK: &str = r#"SiiNunit {
road_look : road.hw2_1 {
    lanes_left[]: traffic_lane.road.expressway
    lanes_left[]: traffic_lane.road.expressway
    lanes_right[]: traffic_lane.road.expressway
    lanes_right[]: traffic_lane.road.expressway
}
road_look : local_1 {
    lanes_right[]: traffic_lane.road.local
    lanes_right[]: traffic_lane.road.local
    road_offset: 1.0
}
road_look : road.footpath { }
}"#;

    fn calculator() -> (Arc<MemoryFileSystem>, Arc<TemplateCache>, LaneGeometryCalculator) {
        let fs = Arc::new(MemoryFileSystem::new().with_file("/def/world/road_look.sii", ROAD_LOOK));
        let reader = Arc::new(DefinitionFileReader::new(fs.clone()));
        let templates = Arc::new(
            TemplateCache::new(reader, &GeometryOptions::default()).expect("Cache erwartet"),
        );
        let calc = LaneGeometryCalculator::new(templates.clone(), W);
        (fs, templates, calc)
    }

    #[test]
    fn calculator_resolves_prefixed_and_plain_templates() {
        let (_, _, calc) = calculator();

        let hw = calc.lane_centers("hw2_1");
        assert_offsets(&hw.right, &[2.25, 6.75]);
        assert_offsets(&hw.left, &[-2.25, -6.75]);

        let local = calc.lane_centers("local_1");
        assert_offsets(&local.right, &[-1.25, 3.25]);
    }

    #[test]
    fn lane_centers_are_idempotent_without_rescans() {
        let (fs, templates, calc) = calculator();

        let first = calc.lane_centers("hw2_1");
        let second = calc.lane_centers("hw2_1");

        assert_eq!(first, second);
        assert_eq!(templates.scan_count(), 1);
        assert_eq!(fs.open_count("/def/world/road_look.sii"), 1);
    }

    #[test]
    fn unresolvable_type_is_negatively_cached() {
        let (fs, templates, calc) = calculator();

        assert!(calc.lane_centers("foo").is_empty());
        assert!(calc.is_invalid("foo"));
        let err = calc.resolve("foo").expect_err("Fehler erwartet");
        assert!(err.is_missing());

        assert_eq!(templates.scan_count(), 1);
        assert_eq!(fs.total_open_count(), 1);
    }

    #[test]
    fn unreadable_road_look_does_not_poison_the_cache() {
        let (fs, templates, calc) = calculator();
        fs.insert("/def/world/road_look.sii", "road_look : road.hw2_1 { lanes_right[]: a");

        assert!(calc.lane_centers("hw2_1").is_empty());
        assert!(!calc.is_invalid("hw2_1"));
        assert_eq!(calc.cached_count(), 0);

        fs.insert("/def/world/road_look.sii", ROAD_LOOK);
        assert_offsets(&calc.lane_centers("hw2_1").right, &[2.25, 6.75]);
        assert!(templates.is_complete());
        assert_eq!(templates.scan_count(), 1);
    }

    #[test]
    fn template_without_lanes_is_cached_as_empty() {
        let (_, _, calc) = calculator();

        assert!(calc.lane_centers("footpath").is_empty());
        assert!(!calc.is_invalid("footpath"));
        assert_eq!(calc.cached_count(), 1);
    }
}
