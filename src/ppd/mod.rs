//! Prefab-Deskriptoren (PPD): Nodes und Navigationskurven eines Prefab-Modells.
//!
//! Das Binärformat selbst wird von einem externen [`PrefabDecoder`] gelesen.
//! Mitgeliefert wird ein JSON-Decoder für exportierte Deskriptoren.

use anyhow::{bail, Context, Result};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::geometry::{yaw_from_heading, yaw_of};
use crate::shared::options::MAX_CURVE_LENGTH;

/// Anschluss-Node eines Prefabs im lokalen Prefab-Koordinatensystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefabNode {
    /// Lokale Position
    pub position: Vec3,
    /// Lokale Rotation
    #[serde(default = "identity")]
    pub rotation: Quat,
    /// Ausgangsrichtung des Anschlusses (Tangente nach außen)
    #[serde(default)]
    pub direction: Vec3,
}

impl PrefabNode {
    /// Gierwinkel (um Y) dieses Anschlusses.
    ///
    /// Bevorzugt den Richtungsvektor; ohne Richtung wird die Rotation benutzt.
    pub fn yaw(&self) -> f32 {
        if self.direction.length_squared() > f32::EPSILON {
            yaw_from_heading(self.direction)
        } else {
            yaw_of(self.rotation)
        }
    }
}

/// Gerichtete Navigationskurve innerhalb eines Prefabs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavCurve {
    /// Startposition (lokal)
    pub start_position: Vec3,
    /// Startrotation (lokal)
    #[serde(default = "identity")]
    pub start_rotation: Quat,
    /// Endposition (lokal)
    pub end_position: Vec3,
    /// Endrotation (lokal)
    #[serde(default = "identity")]
    pub end_rotation: Quat,
    /// Bogenlänge in Metern
    pub length: f32,
    /// Indizes der Nachfolger-Kurven
    #[serde(default)]
    pub next_curves: Vec<u32>,
    /// Indizes der Vorgänger-Kurven
    #[serde(default)]
    pub prev_curves: Vec<u32>,
}

impl NavCurve {
    /// Erstellt eine Kurve ohne Verknüpfungen.
    pub fn new(
        start_position: Vec3,
        start_rotation: Quat,
        end_position: Vec3,
        end_rotation: Quat,
        length: f32,
    ) -> Self {
        Self {
            start_position,
            start_rotation,
            end_position,
            end_rotation,
            length,
            next_curves: Vec::new(),
            prev_curves: Vec::new(),
        }
    }
}

/// Geparster Prefab-Deskriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrefabDescriptor {
    /// Anschluss-Nodes in Datei-Reihenfolge
    pub nodes: Vec<PrefabNode>,
    /// Navigationskurven in Datei-Reihenfolge
    pub nav_curves: Vec<NavCurve>,
}

impl PrefabDescriptor {
    /// Prüft Kurvenlängen und Kurven-Verknüpfungen.
    pub fn validate(&self) -> Result<()> {
        let curve_count = self.nav_curves.len() as u32;
        for (index, curve) in self.nav_curves.iter().enumerate() {
            if !curve.length.is_finite() || curve.length < 0.0 || curve.length > MAX_CURVE_LENGTH {
                bail!("Nav-Kurve {}: ungültige Länge {}", index, curve.length);
            }
            if !curve.start_position.is_finite() || !curve.end_position.is_finite() {
                bail!("Nav-Kurve {}: ungültige Position", index);
            }
            if let Some(link) = curve
                .next_curves
                .iter()
                .chain(&curve.prev_curves)
                .find(|&&link| link >= curve_count)
            {
                bail!("Nav-Kurve {}: Verweis auf unbekannte Kurve {}", index, link);
            }
        }
        Ok(())
    }
}

fn identity() -> Quat {
    Quat::IDENTITY
}

/// Low-Level-Decoder: Bytes → [`PrefabDescriptor`].
pub trait PrefabDecoder: Send + Sync {
    /// Dekodiert den Deskriptor aus `path`.
    fn decode(&self, path: &str, data: &[u8]) -> Result<PrefabDescriptor>;
}

/// Decoder für JSON-exportierte Deskriptoren.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPrefabDecoder;

impl PrefabDecoder for JsonPrefabDecoder {
    fn decode(&self, path: &str, data: &[u8]) -> Result<PrefabDescriptor> {
        let descriptor: PrefabDescriptor = serde_json::from_slice(data)
            .with_context(|| format!("Ungültiger Prefab-Deskriptor: {}", path))?;
        descriptor
            .validate()
            .with_context(|| format!("Inkonsistenter Prefab-Deskriptor: {}", path))?;
        Ok(descriptor)
    }
}
