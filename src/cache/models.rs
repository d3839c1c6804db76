//! Prefab-Modell-Token → dekodierter Deskriptor, mit Negativ-Cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{lock, CacheEntry, PrefabDescriptorReader, TokenResolver};
use crate::error::LookupError;
use crate::ppd::PrefabDescriptor;

/// Löst Prefab-Modelle über Registratur und Deskriptor-Reader auf.
///
/// Ein Modell ohne Registratur-Eintrag oder mit unlesbarem Deskriptor wird
/// einmal gemeldet und danach ohne Dateizugriff übersprungen. Fehlt der
/// Eintrag nur, weil eine Registratur noch nicht lesbar war, bleibt das
/// Modell offen.
pub struct PrefabModelResolver {
    tokens: Arc<TokenResolver>,
    prefabs: Arc<PrefabDescriptorReader>,
    cache: Mutex<HashMap<String, CacheEntry<Arc<PrefabDescriptor>>>>,
}

impl PrefabModelResolver {
    /// Erstellt den Resolver über Token- und Deskriptor-Cache.
    pub fn new(tokens: Arc<TokenResolver>, prefabs: Arc<PrefabDescriptorReader>) -> Self {
        Self {
            tokens,
            prefabs,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Deskriptor des Modells `model`.
    pub fn resolve_model(&self, model: &str) -> Result<Arc<PrefabDescriptor>, LookupError> {
        let mut cache = lock(&self.cache, "models");
        match cache.get(model) {
            Some(CacheEntry::Resolved(desc)) => return Ok(Arc::clone(desc)),
            Some(CacheEntry::Unresolved) => {
                return Err(LookupError::unresolvable(model, "als ungültig markiert"))
            }
            None => {}
        }

        let Some(path) = self.tokens.resolve_token(model) else {
            if self.tokens.is_complete() {
                log::warn!("Prefab-Modell '{}' in keiner Registratur, wird ignoriert", model);
                cache.insert(model.to_string(), CacheEntry::Unresolved);
            }
            return Err(LookupError::unresolvable(model, "kein Registratur-Eintrag"));
        };

        match self.prefabs.get_prefab(&path) {
            Ok(desc) => {
                cache.insert(model.to_string(), CacheEntry::Resolved(Arc::clone(&desc)));
                Ok(desc)
            }
            Err(e) => {
                log::warn!("Prefab-Modell '{}' nicht lesbar, wird ignoriert: {}", model, e);
                cache.insert(model.to_string(), CacheEntry::Unresolved);
                Err(e)
            }
        }
    }

    /// `true` wenn `model` bereits als nicht auflösbar bekannt ist.
    pub fn is_invalid(&self, model: &str) -> bool {
        lock(&self.cache, "models")
            .get(model)
            .is_some_and(CacheEntry::is_unresolved)
    }

    /// Anzahl gecachter Modelle (positiv und negativ).
    pub fn cached_count(&self) -> usize {
        lock(&self.cache, "models").len()
    }

    /// Leert den Cache.
    pub fn clear(&self) {
        lock(&self.cache, "models").clear();
    }
}
