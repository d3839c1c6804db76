//! Gemeinsamer Verzeichnis-Scan für Registraturen und Road-Look-Dateien.
//!
//! Die Dateien werden einmal gelistet und sortiert; ihr Index ist ihr Rang.
//! Bei doppelten Schlüsseln gewinnt der kleinere Rang, auch wenn eine
//! fehlgeschlagene Datei erst bei einem späteren Aufruf nachgelesen wird.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};

use super::DefinitionFileReader;
use crate::error::LookupError;
use crate::sii::Unit;

/// Zu lesende Dateien eines Scans.
#[derive(Debug, Default)]
pub(crate) struct ScanFiles {
    /// Pfade in Leserichtung
    pub paths: Vec<String>,
    /// `true` wenn nur die Fallback-Datei gelesen wird; fehlt sie, ist das kein Fehler
    pub fallback: bool,
}

#[derive(Debug)]
struct Ranked<T> {
    rank: usize,
    value: T,
}

/// Schlüssel → Wert aus allen Dateien eines Scans, inklusive offener Wiederholungen.
#[derive(Debug)]
pub(crate) struct ScanTable<T> {
    scanned: bool,
    scans: usize,
    files: ScanFiles,
    pending: BTreeSet<usize>,
    entries: HashMap<String, Ranked<T>>,
}

impl<T> Default for ScanTable<T> {
    fn default() -> Self {
        Self {
            scanned: false,
            scans: 0,
            files: ScanFiles::default(),
            pending: BTreeSet::new(),
            entries: HashMap::new(),
        }
    }
}

impl<T> ScanTable<T> {
    /// Liest beim ersten Aufruf alle Dateien, danach nur fehlgeschlagene erneut.
    pub fn refresh(
        &mut self,
        definitions: &DefinitionFileReader,
        kind: &str,
        list: impl FnOnce() -> ScanFiles,
        extract: impl Fn(&Unit) -> Option<(String, T)>,
    ) {
        let first = !self.scanned;
        if first {
            self.scanned = true;
            self.scans += 1;
            self.files = list();
            self.pending = (0..self.files.paths.len()).collect();
        }
        if self.pending.is_empty() {
            return;
        }

        let before = self.entries.len();
        for rank in std::mem::take(&mut self.pending) {
            let Some(path) = self.files.paths.get(rank).cloned() else {
                continue;
            };
            match definitions.get_file(&path) {
                Ok(file) => {
                    for (key, value) in file.units.iter().filter_map(&extract) {
                        self.insert(key, rank, value);
                    }
                }
                Err(LookupError::NotFound { .. }) if self.files.fallback => {
                    log::debug!("{}: keine Datei unter {}", kind, path);
                }
                Err(e) => {
                    if first {
                        log::warn!("{}: Datei übersprungen, wird erneut versucht: {}", kind, e);
                    } else {
                        log::debug!("{}: Datei weiterhin nicht lesbar: {}", kind, e);
                    }
                    self.pending.insert(rank);
                }
            }
        }

        if first || self.entries.len() != before {
            log::info!("{} geladen: {}", kind, self.entries.len());
        }
    }

    fn insert(&mut self, key: String, rank: usize, value: T) {
        match self.entries.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(Ranked { rank, value });
            }
            Entry::Occupied(mut slot) => {
                if rank < slot.get().rank {
                    slot.insert(Ranked { rank, value });
                }
            }
        }
    }

    /// Wert zu `key`.
    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key).map(|ranked| &ranked.value)
    }

    /// Anzahl bekannter Schlüssel.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Wie oft das Verzeichnis gelistet wurde.
    pub fn scans(&self) -> usize {
        self.scans
    }

    /// `true` wenn gescannt wurde und keine Datei mehr aussteht.
    pub fn is_complete(&self) -> bool {
        self.scanned && self.pending.is_empty()
    }
}
