//! Definitionsdateien (SII): Units mit dynamisch typisierten Attributen.
//!
//! Der Parser deckt nur die Teilmenge der Grammatik ab, die Road-Looks und
//! Prefab-Registraturen benutzen (siehe [`parser`]).

use glam::{Vec2, Vec3};
use indexmap::IndexMap;

pub mod parser;

pub use parser::{DefinitionParser, SiiTextParser};

/// Attributwert einer Unit.
///
/// Die Spieldaten sind uneinheitlich typisiert (z.B. `(0, 0)` vs. `1.5` für
/// dieselbe Eigenschaft); statt impliziter Konvertierung gibt es explizite,
/// fehlbare Accessoren.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// String oder unquotiertes Token. Anführungszeichen bleiben erhalten.
    String(String),
    /// Skalare Zahl
    Number(f32),
    /// 2er-Tupel `(x, y)`
    Vector2(Vec2),
    /// 3er-Tupel `(x, y, z)`
    Vector3(Vec3),
    /// Geordnete Liste (aus `key[]: ...` bzw. `key[i]: ...`)
    List(Vec<AttributeValue>),
}

impl AttributeValue {
    /// Rohstring (inkl. eventueller Anführungszeichen).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// String ohne umschließende Anführungszeichen.
    pub fn as_unquoted_str(&self) -> Option<&str> {
        self.as_str().map(|s| s.trim_matches('"'))
    }

    /// Skalarer Zahlenwert.
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Exakter 2D-Vektor.
    pub fn as_vec2(&self) -> Option<Vec2> {
        match self {
            Self::Vector2(v) => Some(*v),
            _ => None,
        }
    }

    /// 2D-Vektor mit Fallback: Skalar `n` → `(n, 0)`, 3D → `(x, y)`.
    ///
    /// Normalisiert die inkonsistente Tupel/Vektor/Skalar-Darstellung von
    /// Lane-Offsets an einer Stelle.
    pub fn as_vec2_with_fallback(&self) -> Option<Vec2> {
        match self {
            Self::Number(n) => Some(Vec2::new(*n, 0.0)),
            Self::Vector2(v) => Some(*v),
            Self::Vector3(v) => Some(v.truncate()),
            _ => None,
        }
    }

    /// 3D-Vektor.
    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            Self::Vector3(v) => Some(*v),
            _ => None,
        }
    }

    /// Listenelemente.
    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Anzahl Elemente: Liste → Länge, jeder andere Wert → 1.
    pub fn element_count(&self) -> usize {
        match self {
            Self::List(items) => items.len(),
            _ => 1,
        }
    }
}

/// Benannter, typisierter Block einer Definitionsdatei.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    /// Unit-Typ (z.B. `road_look`, `prefab_model`)
    pub class: String,
    /// Hierarchischer Name (z.B. `road.hw2_1`)
    pub name: String,
    /// Attribute in Datei-Reihenfolge
    pub attributes: IndexMap<String, AttributeValue>,
}

impl Unit {
    /// Erstellt eine Unit ohne Attribute.
    pub fn new(class: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            name: name.into(),
            attributes: IndexMap::new(),
        }
    }

    /// Builder: setzt ein Attribut.
    pub fn with_attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Attribut per exaktem Namen. Fehlende Attribute sind kein Fehler.
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Letzte Komponente des gepunkteten Namens (`prefab.us_cross` → `us_cross`).
    pub fn token(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// Geparste Definitionsdatei.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionFile {
    /// Spielpfad der Quelldatei
    pub path: String,
    /// Units in Datei-Reihenfolge
    pub units: Vec<Unit>,
}

impl DefinitionFile {
    /// Erste Unit mit exakt diesem Namen.
    pub fn find_unit(&self, name: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.name == name)
    }

    /// Anzahl der Units.
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }
}
