//! Fehler-Taxonomie der Lookup-Schichten (Dateien, Tokens, Templates).

use thiserror::Error;

/// Fehler beim Auflösen einer Datei, eines Tokens oder eines Templates.
///
/// Keiner dieser Fehler ist fatal: Aufrufer überspringen das betroffene
/// Objekt und machen mit dem Rest des Ticks weiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// Pfad, Token oder Template existiert nicht (oder I/O schlug fehl)
    #[error("nicht gefunden: {path}")]
    NotFound {
        /// Gesuchter Pfad bzw. Schlüssel
        path: String,
    },
    /// Datei wurde gelesen, ist aber fehlerhaft
    #[error("Parse-Fehler in {path}: {message}")]
    Parse {
        /// Pfad der fehlerhaften Datei
        path: String,
        /// Fehlerbeschreibung des Parsers/Decoders
        message: String,
    },
    /// Eine Berechnung kann mangels Daten nicht durchgeführt werden
    #[error("nicht auflösbar: {key} ({reason})")]
    Unresolvable {
        /// Betroffener Schlüssel (z.B. Road-Type-Token)
        key: String,
        /// Grund
        reason: String,
    },
}

impl LookupError {
    /// Erstellt einen `NotFound`-Fehler.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Erstellt einen `Parse`-Fehler aus einer beliebigen Fehlerursache.
    pub fn parse(path: impl Into<String>, err: &anyhow::Error) -> Self {
        Self::Parse {
            path: path.into(),
            message: format!("{err:#}"),
        }
    }

    /// Erstellt einen `Unresolvable`-Fehler.
    pub fn unresolvable(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unresolvable {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// `true` für `NotFound` und `Unresolvable` (erwartete Ausfälle).
    pub fn is_missing(&self) -> bool {
        !matches!(self, Self::Parse { .. })
    }
}
