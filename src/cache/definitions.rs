//! Cache geparster Definitionsdateien.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::lock;
use crate::error::LookupError;
use crate::fs::{normalize_path, FileSystem};
use crate::sii::{DefinitionFile, DefinitionParser, SiiTextParser};

/// Liest Definitionsdateien über das Dateisystem und hält sie im Speicher.
///
/// Fehlschläge werden gemeldet, aber nicht gecacht: ein späterer Aufruf
/// versucht es erneut.
pub struct DefinitionFileReader {
    fs: Arc<dyn FileSystem>,
    parser: Box<dyn DefinitionParser>,
    cache: Mutex<HashMap<String, Arc<DefinitionFile>>>,
}

impl DefinitionFileReader {
    /// Erstellt einen Reader mit dem Standard-Textparser.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self::with_parser(fs, Box::new(SiiTextParser))
    }

    /// Erstellt einen Reader mit eigenem Parser (z.B. für Binär-SII).
    pub fn with_parser(fs: Arc<dyn FileSystem>, parser: Box<dyn DefinitionParser>) -> Self {
        Self {
            fs,
            parser,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Liefert die geparste Datei; liest und parsed sie nur beim ersten Aufruf.
    pub fn get_file(&self, path: &str) -> Result<Arc<DefinitionFile>, LookupError> {
        let path = normalize_path(path);
        let mut cache = lock(&self.cache, "definitions");
        if let Some(file) = cache.get(&path) {
            return Ok(Arc::clone(file));
        }

        let data = self.fs.open(&path).map_err(|e| {
            log::debug!("Definitionsdatei nicht lesbar: {} ({:#})", path, e);
            LookupError::not_found(path.as_str())
        })?;
        let file = self
            .parser
            .parse(&path, &data, self.fs.as_ref())
            .map_err(|e| {
                log::error!("Definitionsdatei fehlerhaft: {} ({:#})", path, e);
                LookupError::parse(path.as_str(), &e)
            })?;

        log::info!("Definitionsdatei geladen: {} ({} Units)", path, file.unit_count());
        let file = Arc::new(file);
        cache.insert(path, Arc::clone(&file));
        Ok(file)
    }

    /// Das zugrundeliegende Dateisystem.
    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Anzahl gecachter Dateien.
    pub fn cached_count(&self) -> usize {
        lock(&self.cache, "definitions").len()
    }

    /// Leert den Cache (nur zusammen mit allen anderen Caches aufrufen).
    pub fn clear(&self) {
        lock(&self.cache, "definitions").clear();
    }
}
