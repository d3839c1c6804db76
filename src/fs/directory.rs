//! Dateisystem über einem entpackten Installationsverzeichnis.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::{normalize_dir, normalize_path, FileSystem};

/// Bildet Spielpfade auf ein Verzeichnis auf der Festplatte ab.
#[derive(Debug, Clone)]
pub struct DirectoryFileSystem {
    root: PathBuf,
}

impl DirectoryFileSystem {
    /// Erstellt ein Dateisystem mit `root` als Installations-Wurzel.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Wurzelverzeichnis.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, game_path: &str) -> PathBuf {
        let normalized = normalize_path(game_path);
        self.root.join(normalized.trim_start_matches('/'))
    }
}

impl FileSystem for DirectoryFileSystem {
    fn list_files(&self, dir: &str) -> Result<Vec<String>> {
        let game_dir = normalize_dir(dir);
        let disk_dir = self.resolve(&game_dir);
        let entries = std::fs::read_dir(&disk_dir)
            .with_context(|| format!("Verzeichnis nicht lesbar: {}", disk_dir.display()))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                files.push(format!("{game_dir}{name}"));
            }
        }
        files.sort_unstable();
        Ok(files)
    }

    fn open(&self, path: &str) -> Result<Vec<u8>> {
        let disk_path = self.resolve(path);
        std::fs::read(&disk_path)
            .with_context(|| format!("Datei nicht lesbar: {}", disk_path.display()))
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_file()
    }
}
