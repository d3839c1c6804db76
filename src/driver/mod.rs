//! Tick-Treiber: rekonstruiert Straßen- und Prefab-Geometrie um einen Referenzpunkt.
//!
//! Pro Tick:
//! 1. Nodes im Quadrat `±view_distance` um den Referenzpunkt abfragen
//! 2. Items der Nodes (erst rückwärts, dann vorwärts) nach UID deduplizieren
//! 3. Straßen abtasten, Spur-Offsets mit der Vorgänger-Straße überblenden
//! 4. Prefab-Kurven aus dem Deskriptor in die Welt transformieren

mod output;

pub use output::{PrefabGeometry, RoadGeometry, TickOutput, TickStatistics};

use glam::{Quat, Vec3};
use indexmap::IndexMap;

use crate::context::WorldContext;
use crate::core::{MapItem, Prefab, Road};
use crate::geometry::{blend_offset, sample_curve, yaw_of, BlendPolicy, OrientedPoint};

/// Quelle des Referenzpunkts (z.B. Telemetrie-Position des Trucks).
pub trait ReferencePointProvider {
    /// Aktueller Referenzpunkt; `None` solange keine Position bekannt ist.
    fn reference_point(&self) -> Option<Vec3>;
}

impl ReferencePointProvider for Vec3 {
    fn reference_point(&self) -> Option<Vec3> {
        Some(*self)
    }
}

/// Führt die Rekonstruktion tickweise aus und hält die letzte Ausgabe.
///
/// Negativ-Einträge (ungültige Prefab-Modelle, Road-Types ohne Template)
/// liegen in den Caches des [`WorldContext`] und verschwinden mit ihm.
#[derive(Debug, Default)]
pub struct ReconstructionDriver {
    output: TickOutput,
    ticks: u64,
}

impl ReconstructionDriver {
    /// Erstellt einen Treiber ohne Ausgabe.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ausgabe des letzten Ticks.
    pub fn last_output(&self) -> &TickOutput {
        &self.output
    }

    /// Anzahl ausgeführter Ticks.
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Vergisst die letzte Ausgabe und den Tick-Zähler.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Tick mit dem Referenzpunkt eines Providers; `None` ohne Position.
    pub fn tick_from(
        &mut self,
        ctx: &WorldContext,
        provider: &dyn ReferencePointProvider,
    ) -> Option<&TickOutput> {
        let Some(reference) = provider.reference_point() else {
            log::debug!("Kein Referenzpunkt, Tick ausgelassen");
            return None;
        };
        Some(self.tick(ctx, reference))
    }

    /// Rekonstruiert alles im Sichtbereich um `reference`.
    pub fn tick(&mut self, ctx: &WorldContext, reference: Vec3) -> &TickOutput {
        let world = ctx.world();
        let view = ctx.options().view_distance.max(0.0);
        let nodes = world.nodes_within(
            reference.x - view,
            reference.z - view,
            reference.x + view,
            reference.z + view,
        );

        let mut roads: IndexMap<u64, &Road> = IndexMap::new();
        let mut prefabs: IndexMap<u64, &Prefab> = IndexMap::new();
        for uid in &nodes {
            let Some(node) = world.node(*uid) else {
                continue;
            };
            for item_uid in node.item_refs() {
                match world.item(item_uid) {
                    Some(MapItem::Road(road)) => {
                        roads.entry(item_uid).or_insert(road);
                    }
                    Some(MapItem::Prefab(prefab)) => {
                        prefabs.entry(item_uid).or_insert(prefab);
                    }
                    _ => {}
                }
            }
        }

        let mut statistics = TickStatistics {
            nodes: nodes.len(),
            ..TickStatistics::default()
        };

        let mut road_output = Vec::with_capacity(roads.len());
        for road in roads.values() {
            match self.reconstruct_road(ctx, road) {
                Some(geometry) => {
                    statistics.points += geometry.point_count();
                    road_output.push(geometry);
                }
                None => statistics.skipped_roads += 1,
            }
        }

        let mut prefab_output = Vec::with_capacity(prefabs.len());
        for prefab in prefabs.values() {
            if !prefab.show_in_ui_map || !prefab.ai_vehicles {
                statistics.filtered_prefabs += 1;
                continue;
            }
            match self.reconstruct_prefab(ctx, prefab) {
                Some(geometry) => {
                    statistics.points += geometry.point_count();
                    prefab_output.push(geometry);
                }
                None => statistics.skipped_prefabs += 1,
            }
        }

        statistics.roads = road_output.len();
        statistics.prefabs = prefab_output.len();
        self.ticks += 1;
        log::debug!(
            "Tick {}: {} Nodes, {} Straßen ({} übersprungen), {} Prefabs ({} übersprungen, {} gefiltert), {} Punkte",
            self.ticks,
            statistics.nodes,
            statistics.roads,
            statistics.skipped_roads,
            statistics.prefabs,
            statistics.skipped_prefabs,
            statistics.filtered_prefabs,
            statistics.points
        );

        self.output = TickOutput {
            reference,
            nodes,
            roads: road_output,
            prefabs: prefab_output,
            statistics,
        };
        &self.output
    }

    fn reconstruct_road(&self, ctx: &WorldContext, road: &Road) -> Option<RoadGeometry> {
        if road.road_type.is_empty() {
            return None;
        }
        let lanes_calc = ctx.lanes();
        if lanes_calc.is_invalid(&road.road_type) {
            return None;
        }
        let lanes = lanes_calc.resolve(&road.road_type).ok()?;
        if lanes.is_empty() {
            return None;
        }

        let world = ctx.world();
        let Some((start, end)) = world.road_endpoints(road) else {
            log::debug!("Straße {}: Start- oder End-Node fehlt", road.uid);
            return None;
        };

        let options = ctx.options();
        let centerline = road.sample_centerline(start, end, options.road_resolution);
        let previous = world
            .previous_road(road)
            .map(|prev| lanes_calc.lane_centers(&prev.road_type));

        let left_lanes = lane_points(
            options.blend_policy,
            previous.as_ref().map(|p| p.left.as_slice()),
            &lanes.left,
            &centerline,
        );
        let right_lanes = lane_points(
            options.blend_policy,
            previous.as_ref().map(|p| p.right.as_slice()),
            &lanes.right,
            &centerline,
        );

        Some(RoadGeometry {
            uid: road.uid,
            road_type: road.road_type.clone(),
            lanes,
            centerline,
            left_lanes,
            right_lanes,
        })
    }

    fn reconstruct_prefab(&self, ctx: &WorldContext, prefab: &Prefab) -> Option<PrefabGeometry> {
        let descriptor = ctx.models().resolve_model(&prefab.model).ok()?;

        let world = ctx.world();
        let Some(anchor) = prefab.nodes.first().and_then(|uid| world.node(*uid)) else {
            log::debug!("Prefab {}: erster Welt-Node fehlt", prefab.uid);
            return None;
        };
        let Some(origin) = descriptor.nodes.get(prefab.origin as usize) else {
            log::debug!(
                "Prefab {}: Origin {} außerhalb der {} Deskriptor-Nodes",
                prefab.uid,
                prefab.origin,
                descriptor.nodes.len()
            );
            return None;
        };

        let start = anchor.position - origin.position;
        let yaw = yaw_of(anchor.rotation) - origin.yaw();
        let placement = Placement {
            pivot: anchor.position,
            start,
            rotation: Quat::from_rotation_y(yaw),
        };

        let resolution = ctx.options().curve_resolution;
        let curves = descriptor
            .nav_curves
            .iter()
            .map(|curve| {
                sample_curve(curve, resolution)
                    .into_iter()
                    .map(|p| placement.apply(p))
                    .collect()
            })
            .collect();

        Some(PrefabGeometry {
            uid: prefab.uid,
            model: prefab.model.clone(),
            curves,
        })
    }
}

/// Starrkörper-Transformation Prefab-lokal → Welt.
#[derive(Debug, Clone, Copy)]
struct Placement {
    pivot: Vec3,
    start: Vec3,
    rotation: Quat,
}

impl Placement {
    fn apply(&self, local: Vec3) -> Vec3 {
        self.pivot + self.rotation * (local + self.start - self.pivot)
    }
}

/// Weltpunkte aller Spuren einer Seite.
fn lane_points(
    policy: BlendPolicy,
    previous: Option<&[f32]>,
    own: &[f32],
    centerline: &[OrientedPoint],
) -> Vec<Vec<Vec3>> {
    let count = centerline.len();
    own.iter()
        .enumerate()
        .map(|(lane, &offset)| {
            centerline
                .iter()
                .enumerate()
                .map(|(sample, point)| {
                    let blended = blend_offset(policy, previous, offset, lane, sample, count);
                    point.offset_laterally(blended)
                })
                .collect()
        })
        .collect()
}
