//! ZIP-basiertes Dateisystem (entpackte Mods, ältere `.scs`-Archive im ZIP-Format).

use std::collections::HashMap;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use anyhow::{Context, Result};

use super::{FileSystem, MemoryFileSystem};

/// Liest ein ZIP-Archiv vollständig in den Speicher und stellt es als
/// Dateisystem bereit.
#[derive(Debug)]
pub struct ZipFileSystem {
    inner: MemoryFileSystem,
}

impl ZipFileSystem {
    /// Öffnet ein ZIP-Archiv von der Festplatte.
    pub fn open(zip_path: &Path) -> Result<Self> {
        let file = std::fs::File::open(zip_path)
            .with_context(|| format!("ZIP-Datei nicht gefunden: {}", zip_path.display()))?;
        Self::from_reader(BufReader::new(file))
            .with_context(|| format!("Ungültiges ZIP-Archiv: {}", zip_path.display()))
    }

    /// Liest ein ZIP-Archiv aus einem beliebigen Reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;

        let mut files = HashMap::new();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if !entry.is_file() {
                continue;
            }
            let name = entry.name().to_string();
            let mut buffer = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut buffer)
                .with_context(|| format!("Fehler beim Entpacken von '{}'", name))?;
            files.insert(name, buffer);
        }

        log::info!("ZIP entpackt: {} Dateien", files.len());
        Ok(Self {
            inner: MemoryFileSystem::from_files(files),
        })
    }

    /// Anzahl der Dateien im Archiv.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// `true` wenn das Archiv keine Dateien enthält.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl FileSystem for ZipFileSystem {
    fn list_files(&self, dir: &str) -> Result<Vec<String>> {
        self.inner.list_files(dir)
    }

    fn open(&self, path: &str) -> Result<Vec<u8>> {
        self.inner.open(path)
    }

    fn exists(&self, path: &str) -> bool {
        self.inner.exists(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    fn build_zip() -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            let options = SimpleFileOptions::default();
            writer
                .start_file("def/world/prefab.sii", options)
                .expect("Eintrag anlegen");
            writer.write_all(b"SiiNunit {}").expect("Schreiben");
            writer.add_directory("def/empty/", options).expect("Ordner");
            writer.finish().expect("ZIP abschließen");
        }
        cursor.into_inner()
    }

    #[test]
    fn zip_entries_are_exposed_as_game_paths() {
        let fs = ZipFileSystem::from_reader(Cursor::new(build_zip())).expect("ZIP lesbar");

        assert_eq!(fs.len(), 1);
        assert!(fs.exists("/def/world/prefab.sii"));
        assert_eq!(
            fs.list_files("/def/world/").expect("Listing"),
            vec!["/def/world/prefab.sii"]
        );
        assert_eq!(
            fs.open("/def/world/prefab.sii").expect("Datei"),
            b"SiiNunit {}"
        );
    }

    #[test]
    fn invalid_archive_is_reported() {
        assert!(ZipFileSystem::from_reader(Cursor::new(b"kein zip".to_vec())).is_err());
    }
}
