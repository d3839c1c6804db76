//! Dateisystem-Abstraktion für Spieldateien.
//!
//! Alle Pfade sind Spielpfade relativ zur Installations-Wurzel mit führendem
//! Slash und Vorwärts-Slashes (z.B. `/def/world/road_look.sii`).

mod archive;
mod directory;
mod memory;

pub use archive::ZipFileSystem;
pub use directory::DirectoryFileSystem;
pub use memory::MemoryFileSystem;

use anyhow::Result;

/// Lesender Zugriff auf die Dateien einer Spielinstallation.
pub trait FileSystem: Send + Sync {
    /// Listet alle Dateien (keine Unterverzeichnisse) direkt in `dir`, sortiert.
    fn list_files(&self, dir: &str) -> Result<Vec<String>>;

    /// Liest eine Datei vollständig ein.
    fn open(&self, path: &str) -> Result<Vec<u8>>;

    /// Prüft ob eine Datei existiert.
    fn exists(&self, path: &str) -> bool;
}

/// Normalisiert einen Spielpfad: Vorwärts-Slashes, genau ein führender Slash.
pub fn normalize_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let trimmed = unified.trim_start_matches('/');
    format!("/{trimmed}")
}

/// Normalisiert ein Verzeichnis auf die Form `/a/b/` (mit abschließendem Slash).
pub fn normalize_dir(dir: &str) -> String {
    let path = normalize_path(dir);
    if path.ends_with('/') {
        path
    } else {
        format!("{path}/")
    }
}

/// Gibt das Verzeichnis eines Spielpfads zurück (`/def/world/a.sii` → `/def/world/`).
pub fn parent_dir(path: &str) -> String {
    let path = normalize_path(path);
    match path.rfind('/') {
        Some(idx) => path[..=idx].to_string(),
        None => "/".to_string(),
    }
}

/// Verbindet Basisverzeichnis und relativen Pfad.
///
/// Absolute Pfade (mit führendem Slash) ersetzen die Basis.
pub fn join_paths(base_dir: &str, relative: &str) -> String {
    if relative.starts_with('/') {
        normalize_path(relative)
    } else {
        format!("{}{}", normalize_dir(base_dir), relative)
    }
}

/// Dateiname ohne Verzeichnis.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
