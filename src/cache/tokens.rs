//! Auflösung von Prefab-Modell-Tokens auf Deskriptor-Pfade.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use regex::Regex;

use super::scan::{ScanFiles, ScanTable};
use super::{lock, DefinitionFileReader};
use crate::fs::{file_name, normalize_dir};
use crate::shared::GeometryOptions;

/// Token → Pfad des Prefab-Deskriptors (`prefab_desc`).
///
/// Die Registraturen werden beim ersten Aufruf einmal vollständig gelesen.
/// Auch ein leeres Ergebnis gilt als gescannt; nur fehlerhafte Dateien
/// werden bei späteren Aufrufen erneut versucht.
pub struct TokenResolver {
    definitions: Arc<DefinitionFileReader>,
    dir: String,
    pattern: Regex,
    fallback_file: String,
    table: Mutex<ScanTable<String>>,
}

impl TokenResolver {
    /// Erstellt den Resolver; kompiliert das Dateinamen-Muster.
    pub fn new(definitions: Arc<DefinitionFileReader>, options: &GeometryOptions) -> Result<Self> {
        Ok(Self {
            definitions,
            dir: normalize_dir(&options.prefab_dir),
            pattern: options.prefab_file_regex()?,
            fallback_file: options.prefab_fallback_file.clone(),
            table: Mutex::new(ScanTable::default()),
        })
    }

    /// Deskriptor-Pfad zu `token`; `None` wenn keine Registratur ihn kennt.
    pub fn resolve_token(&self, token: &str) -> Option<String> {
        let mut table = lock(&self.table, "tokens");
        self.refresh(&mut table);
        table.get(token).cloned()
    }

    /// Anzahl bekannter Tokens (löst den Scan aus).
    pub fn token_count(&self) -> usize {
        let mut table = lock(&self.table, "tokens");
        self.refresh(&mut table);
        table.len()
    }

    /// Wie oft die Registraturen gelesen wurden.
    pub fn scan_count(&self) -> usize {
        lock(&self.table, "tokens").scans()
    }

    /// `true` wenn alle Registraturen gelesen werden konnten.
    pub fn is_complete(&self) -> bool {
        lock(&self.table, "tokens").is_complete()
    }

    /// Vergisst alle Tokens; der nächste Aufruf scannt erneut.
    pub fn clear(&self) {
        *lock(&self.table, "tokens") = ScanTable::default();
    }

    fn registry_files(&self) -> ScanFiles {
        let listed = match self.definitions.file_system().list_files(&self.dir) {
            Ok(files) => files
                .into_iter()
                .filter(|path| self.pattern.is_match(file_name(path)))
                .collect::<Vec<_>>(),
            Err(e) => {
                log::warn!("Prefab-Verzeichnis {} nicht lesbar: {:#}", self.dir, e);
                Vec::new()
            }
        };

        if listed.is_empty() {
            ScanFiles {
                paths: vec![self.fallback_file.clone()],
                fallback: true,
            }
        } else {
            ScanFiles {
                paths: listed,
                fallback: false,
            }
        }
    }

    fn refresh(&self, table: &mut ScanTable<String>) {
        table.refresh(
            &self.definitions,
            "Prefab-Tokens",
            || self.registry_files(),
            |unit| {
                let desc = unit.get("prefab_desc")?.as_unquoted_str()?;
                Some((unit.token().to_string(), desc.to_string()))
            },
        );
    }
}
