//! In-Memory-Dateisystem mit Zugriffszählern.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use anyhow::{anyhow, Result};

use super::{normalize_dir, normalize_path, FileSystem};

/// Dateisystem über einer Tabelle Pfad → Bytes.
///
/// Zählt pro Pfad die `open`-Aufrufe; damit lässt sich prüfen, ob Caches
/// eine Datei tatsächlich nur einmal einlesen.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: Mutex<HashMap<String, Vec<u8>>>,
    open_counts: Mutex<HashMap<String, usize>>,
}

impl MemoryFileSystem {
    /// Erstellt ein leeres Dateisystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Erstellt ein Dateisystem aus einer fertigen Tabelle.
    pub fn from_files(files: HashMap<String, Vec<u8>>) -> Self {
        let files = files
            .into_iter()
            .map(|(path, data)| (normalize_path(&path), data))
            .collect();
        Self {
            files: Mutex::new(files),
            open_counts: Mutex::new(HashMap::new()),
        }
    }

    /// Builder-Variante von [`insert`](Self::insert).
    pub fn with_file(self, path: &str, data: impl Into<Vec<u8>>) -> Self {
        self.insert(path, data);
        self
    }

    /// Legt eine Datei an oder überschreibt sie.
    pub fn insert(&self, path: &str, data: impl Into<Vec<u8>>) {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(normalize_path(path), data.into());
    }

    /// Entfernt eine Datei. Gibt `true` zurück falls sie existierte.
    pub fn remove(&self, path: &str) -> bool {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&normalize_path(path))
            .is_some()
    }

    /// Anzahl der Dateien.
    pub fn len(&self) -> usize {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// `true` wenn keine Dateien vorhanden sind.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wie oft `open` für diesen Pfad aufgerufen wurde (auch fehlgeschlagene Aufrufe).
    pub fn open_count(&self, path: &str) -> usize {
        self.open_counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&normalize_path(path))
            .copied()
            .unwrap_or(0)
    }

    /// Summe aller `open`-Aufrufe.
    pub fn total_open_count(&self) -> usize {
        self.open_counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .sum()
    }
}

impl FileSystem for MemoryFileSystem {
    fn list_files(&self, dir: &str) -> Result<Vec<String>> {
        let prefix = normalize_dir(dir);
        let files = self.files.lock().unwrap_or_else(PoisonError::into_inner);

        let mut result: Vec<String> = files
            .keys()
            .filter(|path| {
                path.strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
            })
            .cloned()
            .collect();
        result.sort_unstable();
        Ok(result)
    }

    fn open(&self, path: &str) -> Result<Vec<u8>> {
        let path = normalize_path(path);
        *self
            .open_counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(path.clone())
            .or_default() += 1;

        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&path)
            .cloned()
            .ok_or_else(|| anyhow!("Datei nicht gefunden: {}", path))
    }

    fn exists(&self, path: &str) -> bool {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&normalize_path(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryFileSystem {
        MemoryFileSystem::new()
            .with_file("/def/world/prefab.sii", "a")
            .with_file("/def/world/prefab.eu.sii", "b")
            .with_file("/def/world/sub/road.sii", "c")
            .with_file("/def/city.sii", "d")
    }

    #[test]
    fn list_files_returns_direct_children_sorted() {
        let fs = sample();
        let files = fs.list_files("/def/world").expect("Listing erwartet");
        assert_eq!(
            files,
            vec!["/def/world/prefab.eu.sii", "/def/world/prefab.sii"]
        );
    }

    #[test]
    fn open_counts_every_attempt() {
        let fs = sample();
        assert_eq!(fs.open("/def/city.sii").expect("Datei erwartet"), b"d");
        assert!(fs.open("/def/missing.sii").is_err());
        assert!(fs.open("def/city.sii").is_ok());

        assert_eq!(fs.open_count("/def/city.sii"), 2);
        assert_eq!(fs.open_count("/def/missing.sii"), 1);
        assert_eq!(fs.total_open_count(), 3);
    }

    #[test]
    fn remove_and_reinsert() {
        let fs = sample();
        assert!(fs.remove("/def/city.sii"));
        assert!(!fs.exists("/def/city.sii"));
        fs.insert("/def/city.sii", "neu");
        assert!(fs.exists("/def/city.sii"));
        assert_eq!(fs.len(), 4);
    }
}
