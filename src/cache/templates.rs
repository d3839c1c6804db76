//! Road-Look-Templates nach Unit-Namen.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use regex::Regex;

use super::scan::{ScanFiles, ScanTable};
use super::{lock, DefinitionFileReader};
use crate::fs::{file_name, join_paths, normalize_dir};
use crate::shared::GeometryOptions;
use crate::sii::Unit;

/// Datei, die gelesen wird, wenn das Verzeichnis nicht gelistet werden kann.
const FALLBACK_FILE: &str = "road_look.sii";

/// Unit-Name → Template-Unit aus allen Road-Look-Dateien.
///
/// Das Verzeichnis wird einmal gelistet. Dateien, die dabei nicht gelesen
/// werden konnten, werden bei späteren Abfragen erneut versucht.
pub struct TemplateCache {
    definitions: Arc<DefinitionFileReader>,
    dir: String,
    pattern: Regex,
    table: Mutex<ScanTable<Arc<Unit>>>,
}

impl TemplateCache {
    /// Erstellt den Cache; kompiliert das Dateinamen-Muster.
    pub fn new(definitions: Arc<DefinitionFileReader>, options: &GeometryOptions) -> Result<Self> {
        Ok(Self {
            definitions,
            dir: normalize_dir(&options.road_look_dir),
            pattern: options.road_look_file_regex()?,
            table: Mutex::new(ScanTable::default()),
        })
    }

    /// Template per exaktem Unit-Namen.
    pub fn lookup_template(&self, name: &str) -> Option<Arc<Unit>> {
        let mut table = lock(&self.table, "templates");
        self.refresh(&mut table);
        table.get(name).cloned()
    }

    /// Template eines Road-Typs: erst `road.<typ>`, dann `<typ>`.
    pub fn lookup_road_template(&self, road_type: &str) -> Option<Arc<Unit>> {
        self.lookup_template(&format!("road.{road_type}"))
            .or_else(|| self.lookup_template(road_type))
    }

    /// Anzahl bekannter Templates (löst den Scan aus).
    pub fn template_count(&self) -> usize {
        let mut table = lock(&self.table, "templates");
        self.refresh(&mut table);
        table.len()
    }

    /// Wie oft die Road-Look-Dateien gelesen wurden.
    pub fn scan_count(&self) -> usize {
        lock(&self.table, "templates").scans()
    }

    /// `true` wenn alle Road-Look-Dateien gelesen werden konnten.
    ///
    /// Erst dann ist ein fehlendes Template endgültig.
    pub fn is_complete(&self) -> bool {
        lock(&self.table, "templates").is_complete()
    }

    /// Vergisst alle Templates.
    pub fn clear(&self) {
        *lock(&self.table, "templates") = ScanTable::default();
    }

    fn template_files(&self) -> ScanFiles {
        match self.definitions.file_system().list_files(&self.dir) {
            Ok(files) => ScanFiles {
                paths: files
                    .into_iter()
                    .filter(|path| self.pattern.is_match(file_name(path)))
                    .collect(),
                fallback: false,
            },
            Err(e) => {
                log::warn!("Road-Look-Verzeichnis {} nicht lesbar: {:#}", self.dir, e);
                ScanFiles {
                    paths: vec![join_paths(&self.dir, FALLBACK_FILE)],
                    fallback: true,
                }
            }
        }
    }

    fn refresh(&self, table: &mut ScanTable<Arc<Unit>>) {
        table.refresh(
            &self.definitions,
            "Road-Look-Templates",
            || self.template_files(),
            |unit| Some((unit.name.clone(), Arc::new(unit.clone()))),
        );
    }
}
