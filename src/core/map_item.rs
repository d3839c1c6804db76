//! Map-Items: Straßen, Prefabs und sonstige Objekte der Spielwelt.

use serde::{Deserialize, Serialize};

use super::Node;
use crate::geometry::hermite::oriented_between;
use crate::geometry::OrientedPoint;
use crate::shared::options::MAX_SAMPLES;

/// Straßensegment zwischen zwei Nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Road {
    /// Eindeutige ID
    pub uid: u64,
    /// Road-Type-Token (Name des Road-Look-Templates)
    pub road_type: String,
    /// Länge der Mittellinie (Meter); ≤ 0 heißt unbekannt
    #[serde(default)]
    pub length: f32,
    /// UID des Start-Nodes
    pub start_node: u64,
    /// UID des End-Nodes
    pub end_node: u64,
}

impl Road {
    /// Länge der Mittellinie; ohne gespeicherte Länge die Sehnenlänge.
    pub fn effective_length(&self, start: &Node, end: &Node) -> f32 {
        if self.length.is_finite() && self.length > 0.0 {
            self.length
        } else {
            start.position.distance(end.position)
        }
    }

    /// Punkt der Mittellinie am Parameter `t` (0 = Start, 1 = Ende).
    pub fn point_at(&self, start: &Node, end: &Node, t: f32) -> OrientedPoint {
        let length = self.effective_length(start, end);
        oriented_between(&start.oriented(), &end.oriented(), length, t)
    }

    /// Punkt der Mittellinie nach `distance` Metern ab dem Start.
    pub fn point_at_distance(&self, start: &Node, end: &Node, distance: f32) -> OrientedPoint {
        let length = self.effective_length(start, end);
        if !length.is_finite() || length <= 0.0 {
            return start.oriented();
        }
        self.point_at(start, end, distance / length)
    }

    /// Stützpunkte alle `resolution` Meter; der letzte liegt immer bei `t = 1`.
    ///
    /// Höchstens [`MAX_SAMPLES`] Stützpunkte plus Endpunkt.
    pub fn sample_centerline(&self, start: &Node, end: &Node, resolution: f32) -> Vec<OrientedPoint> {
        let length = self.effective_length(start, end);
        if !length.is_finite() || length <= 0.0 {
            return vec![start.oriented()];
        }
        if !(resolution.is_finite() && resolution > 0.0) {
            return vec![self.point_at(start, end, 0.0), self.point_at(start, end, 1.0)];
        }

        // Sehr lange Straßen werden mit gröberem Abstand abgetastet
        let resolution = resolution.max(length / MAX_SAMPLES as f32);
        let count = ((length / resolution).ceil() as usize).min(MAX_SAMPLES);

        let mut samples = Vec::with_capacity(count + 1);
        for i in 0..count {
            let distance = i as f32 * resolution;
            if distance >= length {
                break;
            }
            samples.push(self.point_at(start, end, distance / length));
        }
        samples.push(self.point_at(start, end, 1.0));
        samples
    }
}

fn default_true() -> bool {
    true
}

/// Platziertes Prefab (Kreuzung, Auffahrt, Firmengelände, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prefab {
    /// Eindeutige ID
    pub uid: u64,
    /// Modell-Token (wird über die Prefab-Registratur aufgelöst)
    pub model: String,
    /// Index des Deskriptor-Nodes, der am ersten Welt-Node liegt
    #[serde(default)]
    pub origin: u16,
    /// UIDs der platzierten Anschluss-Nodes; Index 0 ist der Bezugsrahmen
    pub nodes: Vec<u64>,
    /// In der UI-Karte sichtbar
    #[serde(default = "default_true")]
    pub show_in_ui_map: bool,
    /// Für KI-Fahrzeuge befahrbar
    #[serde(default = "default_true")]
    pub ai_vehicles: bool,
}

/// Item der Spielwelt, identifiziert über seine UID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MapItem {
    /// Straßensegment
    Road(Road),
    /// Prefab
    Prefab(Prefab),
    /// Schild
    Sign {
        /// Eindeutige ID
        uid: u64,
    },
    /// Gebäude
    Building {
        /// Eindeutige ID
        uid: u64,
    },
    /// Alles andere
    Other {
        /// Eindeutige ID
        uid: u64,
    },
}

impl MapItem {
    /// UID des Items.
    pub fn uid(&self) -> u64 {
        match self {
            Self::Road(road) => road.uid,
            Self::Prefab(prefab) => prefab.uid,
            Self::Sign { uid } | Self::Building { uid } | Self::Other { uid } => *uid,
        }
    }

    /// Straße, falls das Item eine ist.
    pub fn as_road(&self) -> Option<&Road> {
        match self {
            Self::Road(road) => Some(road),
            _ => None,
        }
    }

    /// Prefab, falls das Item eines ist.
    pub fn as_prefab(&self) -> Option<&Prefab> {
        match self {
            Self::Prefab(prefab) => Some(prefab),
            _ => None,
        }
    }
}
