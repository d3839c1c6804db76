//! Cache dekodierter Prefab-Deskriptoren.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::lock;
use crate::error::LookupError;
use crate::fs::{normalize_path, FileSystem};
use crate::ppd::{JsonPrefabDecoder, PrefabDecoder, PrefabDescriptor};

/// Liest Prefab-Deskriptoren über einen austauschbaren Decoder.
pub struct PrefabDescriptorReader {
    fs: Arc<dyn FileSystem>,
    decoder: Box<dyn PrefabDecoder>,
    cache: Mutex<HashMap<String, Arc<PrefabDescriptor>>>,
}

impl PrefabDescriptorReader {
    /// Reader mit dem JSON-Decoder.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self::with_decoder(fs, Box::new(JsonPrefabDecoder))
    }

    /// Reader mit eigenem Decoder (z.B. für das Binärformat).
    pub fn with_decoder(fs: Arc<dyn FileSystem>, decoder: Box<dyn PrefabDecoder>) -> Self {
        Self {
            fs,
            decoder,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Liefert den Deskriptor unter `path`; Fehlschläge werden nicht gecacht.
    pub fn get_prefab(&self, path: &str) -> Result<Arc<PrefabDescriptor>, LookupError> {
        let path = normalize_path(path);
        let mut cache = lock(&self.cache, "prefabs");
        if let Some(desc) = cache.get(&path) {
            return Ok(Arc::clone(desc));
        }

        let data = self
            .fs
            .open(&path)
            .map_err(|_| LookupError::not_found(path.as_str()))?;
        let desc = self.decoder.decode(&path, &data).map_err(|e| {
            log::error!("Prefab-Deskriptor fehlerhaft: {} ({:#})", path, e);
            LookupError::parse(path.as_str(), &e)
        })?;

        log::debug!(
            "Prefab-Deskriptor geladen: {} ({} Nodes, {} Kurven)",
            path,
            desc.nodes.len(),
            desc.nav_curves.len()
        );
        let desc = Arc::new(desc);
        cache.insert(path, Arc::clone(&desc));
        Ok(desc)
    }

    /// Anzahl gecachter Deskriptoren.
    pub fn cached_count(&self) -> usize {
        lock(&self.cache, "prefabs").len()
    }

    /// Leert den Cache.
    pub fn clear(&self) {
        lock(&self.cache, "prefabs").clear();
    }
}
