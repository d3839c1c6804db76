//! Zentrale Konfiguration der Geometrie-Rekonstruktion.
//!
//! `GeometryOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::geometry::BlendPolicy;

// ── Sichtbereich & Tick ─────────────────────────────────────────────

/// Halbe Kantenlänge des Abfrage-Quadrats um den Referenzpunkt (Meter).
pub const VIEW_DISTANCE: f32 = 300.0;

// ── Abtastung ───────────────────────────────────────────────────────

/// Abstand der Mittellinien-Stützpunkte einer Straße (Meter).
pub const ROAD_RESOLUTION: f32 = 5.0;
/// Abstand der Stützpunkte auf Prefab-Navigationskurven (Meter).
pub const CURVE_RESOLUTION: f32 = 0.25;
/// Obergrenze der Stützpunkte pro Straße bzw. Kurve.
pub const MAX_SAMPLES: usize = 100_000;
/// Größte zulässige Länge einer Prefab-Navigationskurve (Meter).
pub const MAX_CURVE_LENGTH: f32 = 100_000.0;

// ── Fahrspuren ──────────────────────────────────────────────────────

/// Fahrspurbreite (Meter). Die halbe Breite ergibt den ersten Offset.
pub const LANE_WIDTH: f32 = 4.5;

// ── Spieldateien ────────────────────────────────────────────────────

/// Verzeichnis der Prefab-Registraturen.
pub const PREFAB_DIR: &str = "/def/world/";
/// Dateinamen-Muster der Prefab-Registraturen.
pub const PREFAB_FILE_PATTERN: &str = r"^prefab(\..+)?\.sii$";
/// Bekannte Registratur, falls das Verzeichnis nicht gelistet werden kann.
pub const PREFAB_FALLBACK_FILE: &str = "/def/world/prefab.sii";
/// Verzeichnis der Road-Look-Templates.
pub const ROAD_LOOK_DIR: &str = "/def/world/";
/// Dateinamen-Muster der Road-Look-Templates.
pub const ROAD_LOOK_FILE_PATTERN: &str = r"^road_look(\..+)?\.sii$";

// ── Laufzeit-Optionen (serialisierbar) ─────────────────────────────

/// Alle zur Laufzeit änderbaren Optionen.
/// Wird als `ets2_map_geometry.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryOptions {
    // ── Sichtbereich ────────────────────────────────────────────
    /// Halbe Kantenlänge des Abfrage-Quadrats (Meter)
    pub view_distance: f32,

    // ── Abtastung ───────────────────────────────────────────────
    /// Stützpunkt-Abstand auf Straßen (Meter)
    pub road_resolution: f32,
    /// Stützpunkt-Abstand auf Prefab-Kurven (Meter)
    pub curve_resolution: f32,

    // ── Fahrspuren ──────────────────────────────────────────────
    /// Fahrspurbreite (Meter)
    pub lane_width: f32,
    /// Übergang der Spur-Offsets an Straßenverbindungen
    pub blend_policy: BlendPolicy,

    // ── Spieldateien ────────────────────────────────────────────
    /// Verzeichnis der Prefab-Registraturen
    pub prefab_dir: String,
    /// Regex für Registratur-Dateinamen
    pub prefab_file_pattern: String,
    /// Fallback-Registratur
    pub prefab_fallback_file: String,
    /// Verzeichnis der Road-Look-Templates
    pub road_look_dir: String,
    /// Regex für Road-Look-Dateinamen
    pub road_look_file_pattern: String,
}

impl Default for GeometryOptions {
    fn default() -> Self {
        Self {
            view_distance: VIEW_DISTANCE,
            road_resolution: ROAD_RESOLUTION,
            curve_resolution: CURVE_RESOLUTION,
            lane_width: LANE_WIDTH,
            blend_policy: BlendPolicy::default(),
            prefab_dir: PREFAB_DIR.to_string(),
            prefab_file_pattern: PREFAB_FILE_PATTERN.to_string(),
            prefab_fallback_file: PREFAB_FALLBACK_FILE.to_string(),
            road_look_dir: ROAD_LOOK_DIR.to_string(),
            road_look_file_pattern: ROAD_LOOK_FILE_PATTERN.to_string(),
        }
    }
}

impl GeometryOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("ets2_map_geometry"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("ets2_map_geometry.toml")
    }

    /// Kompiliertes Muster der Prefab-Registraturen.
    pub fn prefab_file_regex(&self) -> Result<Regex> {
        Regex::new(&self.prefab_file_pattern)
            .with_context(|| format!("Ungültiges Muster: {}", self.prefab_file_pattern))
    }

    /// Kompiliertes Muster der Road-Look-Dateien.
    pub fn road_look_file_regex(&self) -> Result<Regex> {
        Regex::new(&self.road_look_file_pattern)
            .with_context(|| format!("Ungültiges Muster: {}", self.road_look_file_pattern))
    }
}
