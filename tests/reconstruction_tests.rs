//! Kompletter Tick über Fixture-Spieldaten und einen Welt-Schnappschuss.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use approx::assert_relative_eq;
use ets2_map_geometry::{
    BlendPolicy, DirectoryFileSystem, GeometryOptions, ReconstructionDriver, TickOutput,
    WorldContext, WorldMap,
};
use glam::Vec3;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn context(options: GeometryOptions) -> WorldContext {
    let world = WorldMap::load_snapshot_json(&fixtures().join("world.json")).expect("Welt erwartet");
    let fs = Arc::new(DirectoryFileSystem::new(fixtures().join("game")));
    WorldContext::new(fs, world, options).expect("Kontext erwartet")
}

fn road_uids(output: &TickOutput) -> Vec<u64> {
    output.roads.iter().map(|r| r.uid).collect()
}

#[test]
fn tick_reconstructs_visible_roads_and_prefabs() {
    let ctx = context(GeometryOptions::default());
    let mut driver = ReconstructionDriver::new();
    let output = driver.tick(&ctx, Vec3::new(0.0, 0.0, -50.0));

    assert_eq!(output.nodes, (1..=9).collect::<Vec<u64>>());
    assert_eq!(road_uids(output), vec![100, 101, 102]);
    assert_eq!(output.prefabs.len(), 1);
    assert_eq!(output.prefabs[0].uid, 200);

    let stats = output.statistics;
    assert_eq!(stats.skipped_roads, 2);
    assert_eq!(stats.skipped_prefabs, 1);
    assert_eq!(stats.filtered_prefabs, 1);
    assert!(stats.points > 0);
}

#[test]
fn junction_blends_from_local_into_highway() {
    let ctx = context(GeometryOptions::default());
    let mut driver = ReconstructionDriver::new();
    let output = driver.tick(&ctx, Vec3::new(0.0, 0.0, -50.0));

    let hw = output.roads.iter().find(|r| r.uid == 101).expect("Straße erwartet");
    assert_eq!(hw.centerline.len(), 11);

    let lane1 = &hw.right_lanes[1];
    assert_relative_eq!(lane1[0].x, -3.75, epsilon = 1e-4);
    assert_relative_eq!(lane1[5].x, -5.25, epsilon = 1e-4);
    assert_relative_eq!(lane1[10].x, -6.75, epsilon = 1e-4);
    assert_relative_eq!(lane1[10].z, -100.0, epsilon = 1e-4);
}

#[test]
fn smoothstep_keeps_endpoints() {
    let options = GeometryOptions {
        blend_policy: BlendPolicy::SmoothStep,
        ..GeometryOptions::default()
    };
    let ctx = context(options);
    let mut driver = ReconstructionDriver::new();
    let output = driver.tick(&ctx, Vec3::new(0.0, 0.0, -50.0));

    let hw = output.roads.iter().find(|r| r.uid == 101).expect("Straße erwartet");
    let lane1 = &hw.right_lanes[1];
    assert_relative_eq!(lane1[0].x, -3.75, epsilon = 1e-4);
    assert_relative_eq!(lane1[5].x, -5.25, epsilon = 1e-4);
    assert!(lane1[2].x > -4.2);
}

#[test]
fn prefab_curves_follow_descriptor_and_placement() {
    let ctx = context(GeometryOptions::default());
    let mut driver = ReconstructionDriver::new();
    let output = driver.tick(&ctx, Vec3::new(0.0, 0.0, -50.0));

    let cross = &output.prefabs[0];
    assert_eq!(cross.curves.len(), 2);

    let straight = &cross.curves[0];
    assert_relative_eq!(straight[1].z, -100.0, epsilon = 1e-3);
    assert_relative_eq!(straight[straight.len() - 2].z, -120.0, epsilon = 1e-3);

    let turn = &cross.curves[1];
    let end = turn[turn.len() - 2];
    assert_relative_eq!(end.x, 10.0, epsilon = 1e-3);
    assert_relative_eq!(end.z, -130.0, epsilon = 1e-3);
}

#[test]
fn repeated_ticks_reuse_caches() {
    let ctx = context(GeometryOptions::default());
    let mut driver = ReconstructionDriver::new();

    let first = driver.tick(&ctx, Vec3::new(0.0, 0.0, -50.0)).clone();
    let second = driver.tick(&ctx, Vec3::new(0.0, 0.0, -50.0)).clone();

    assert_eq!(first.roads, second.roads);
    assert_eq!(first.prefabs, second.prefabs);
    assert_eq!(ctx.templates().scan_count(), 1);
    assert_eq!(ctx.tokens().scan_count(), 1);
    assert!(ctx.models().is_invalid("broken"));
    assert!(ctx.lanes().is_invalid("unknown_type"));
}

#[test]
fn far_reference_sees_only_distant_road() {
    let ctx = context(GeometryOptions::default());
    let mut driver = ReconstructionDriver::new();
    let output = driver.tick(&ctx, Vec3::new(2000.0, 0.0, 0.0));

    assert_eq!(output.nodes, vec![10, 11]);
    assert_eq!(road_uids(output), vec![105]);
    let hw = &output.roads[0];
    assert_eq!(hw.left_lanes.len(), 2);
    assert_eq!(hw.right_lanes.len(), 2);
    assert!(output.prefabs.is_empty());
}

#[test]
fn output_serializes_to_json() {
    let ctx = context(GeometryOptions::default());
    let mut driver = ReconstructionDriver::new();
    driver.tick(&ctx, Vec3::new(2000.0, 0.0, 0.0));

    let json = serde_json::to_value(driver.last_output()).expect("JSON erwartet");
    assert_eq!(json["statistics"]["roads"], 1);
    assert_eq!(json["roads"][0]["road_type"], "hw2_1");
}
