//! Lazy befüllte Caches über den Spieldateien.
//!
//! Jeder Cache ist ein `Mutex<HashMap<..>>`; Prüfen und Befüllen passieren
//! unter demselben Lock. Nur die erste Befüllung liest Dateien. Die Caches
//! leben bis zum Entladen der Welt und werden nur gemeinsam geleert
//! (siehe [`crate::context::WorldContext`]).
//!
//! Lock-Reihenfolge bei verschachtelten Zugriffen:
//! Lanes → Templates → Definitionen, Modelle → Tokens → Definitionen,
//! Modelle → Prefabs.

pub mod definitions;
mod entry;
pub mod models;
pub mod prefabs;
mod scan;
pub mod templates;
pub mod tokens;

pub use definitions::DefinitionFileReader;
pub use entry::CacheEntry;
pub use models::PrefabModelResolver;
pub use prefabs::PrefabDescriptorReader;
pub use templates::TemplateCache;
pub use tokens::TokenResolver;

use std::sync::{Mutex, MutexGuard};

/// Sperrt einen Cache; ein vergifteter Lock wird übernommen statt zu paniken.
///
/// Die Caches sind append-only, ein abgebrochener Schreiber hinterlässt
/// höchstens einen fehlenden Eintrag.
pub(crate) fn lock<'a, T>(mutex: &'a Mutex<T>, name: &str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        log::warn!("Cache '{}' war vergiftet, Inhalt wird weiterverwendet", name);
        poisoned.into_inner()
    })
}
