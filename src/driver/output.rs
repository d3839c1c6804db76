//! Ergebnis eines Rekonstruktions-Ticks.

use glam::Vec3;
use serde::Serialize;

use crate::geometry::{LaneGeometry, OrientedPoint};

/// Rekonstruierte Geometrie einer Straße.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadGeometry {
    /// UID der Straße
    pub uid: u64,
    /// Road-Type-Token
    pub road_type: String,
    /// Eigene Spur-Offsets (ohne Blending)
    #[serde(skip)]
    pub lanes: LaneGeometry,
    /// Stützpunkte der Mittellinie
    pub centerline: Vec<OrientedPoint>,
    /// Weltpunkte je linker Spur
    pub left_lanes: Vec<Vec<Vec3>>,
    /// Weltpunkte je rechter Spur
    pub right_lanes: Vec<Vec<Vec3>>,
}

impl RoadGeometry {
    /// Anzahl aller Spurpunkte.
    pub fn point_count(&self) -> usize {
        self.left_lanes
            .iter()
            .chain(&self.right_lanes)
            .map(Vec::len)
            .sum()
    }
}

/// Platzierte Navigationskurven eines Prefabs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrefabGeometry {
    /// UID des Prefabs
    pub uid: u64,
    /// Modell-Token
    pub model: String,
    /// Weltpunkte je Navigationskurve (Deskriptor-Reihenfolge)
    pub curves: Vec<Vec<Vec3>>,
}

impl PrefabGeometry {
    /// Anzahl aller Kurvenpunkte.
    pub fn point_count(&self) -> usize {
        self.curves.iter().map(Vec::len).sum()
    }
}

/// Zähler eines Ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickStatistics {
    /// Nodes im Sichtbereich
    pub nodes: usize,
    /// Ausgegebene Straßen
    pub roads: usize,
    /// Übersprungene Straßen (ungültiger Typ, keine Spuren, fehlende Nodes)
    pub skipped_roads: usize,
    /// Ausgegebene Prefabs
    pub prefabs: usize,
    /// Herausgefilterte Prefabs (nicht in UI-Karte oder nicht für KI)
    pub filtered_prefabs: usize,
    /// Übersprungene Prefabs (nicht auflösbar, fehlende Nodes)
    pub skipped_prefabs: usize,
    /// Summe aller Spur- und Kurvenpunkte
    pub points: usize,
}

/// Komplette Ausgabe eines Ticks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickOutput {
    /// Referenzpunkt des Ticks
    pub reference: Vec3,
    /// UIDs der Nodes im Sichtbereich (sortiert)
    pub nodes: Vec<u64>,
    /// Straßen in Fundreihenfolge
    pub roads: Vec<RoadGeometry>,
    /// Prefabs in Fundreihenfolge
    pub prefabs: Vec<PrefabGeometry>,
    /// Zähler
    pub statistics: TickStatistics,
}
