//! Session scratch storage for binary artifacts.
//!
//! Every write gets a fresh, uniquely named file so a regenerated artifact
//! never overwrites the file an earlier artifact value pointed at. Nothing is
//! cleaned up here; the scratch directory is disposable.

use crate::error::{Result, StudioError, ValidationError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ResourceStore {
    dir: PathBuf,
}

impl ResourceStore {
    /// Open (and create if needed) a scratch directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` to a new resource file.
    ///
    /// The path is only returned once all bytes are on disk.
    pub fn persist(&self, prefix: &str, extension: &str, bytes: &[u8]) -> Result<PathBuf> {
        let suffix = format!(".{extension}");
        let mut file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(&suffix)
            .tempfile_in(&self.dir)?;
        file.write_all(bytes)?;
        file.flush()?;
        let (_, path) = file.keep().map_err(|e| e.error)?;
        debug!(path = %path.display(), bytes = bytes.len(), "resource written");
        Ok(path)
    }

    /// Reserve a new, empty resource file for an external writer.
    pub fn allocate(&self, prefix: &str, extension: &str) -> Result<PathBuf> {
        let suffix = format!(".{extension}");
        let file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(&suffix)
            .tempfile_in(&self.dir)?;
        let (_, path) = file.keep().map_err(|e| e.error)?;
        Ok(path)
    }

    /// Copy a user-provided file into the store, keeping its extension.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank path, an unreadable file or an
    /// empty file.
    pub fn import(&self, source: &Path, prefix: &str) -> Result<PathBuf> {
        if source.as_os_str().is_empty() {
            return Err(ValidationError::EmptyInput {
                field: "upload path",
            }
            .into());
        }
        let bytes = fs::read(source).map_err(|e| ValidationError::InvalidUpload {
            message: format!("{}: {e}", source.display()),
        })?;
        if bytes.is_empty() {
            return Err(ValidationError::InvalidUpload {
                message: format!("{} is empty", source.display()),
            }
            .into());
        }
        let extension = source
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("bin")
            .to_ascii_lowercase();
        self.persist(prefix, &extension, &bytes)
    }

    /// Read a resource back into memory.
    pub fn read(path: &Path) -> Result<Vec<u8>> {
        fs::read(path).map_err(|source| StudioError::ResourceRead {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, ResourceStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ResourceStore::new(dir.path().join("scratch")).unwrap();
        (dir, store)
    }

    #[test]
    fn new_creates_directory() {
        let (_dir, store) = store();
        assert!(store.dir().is_dir());
    }

    #[test]
    fn persist_writes_bytes_with_extension() {
        let (_dir, store) = store();
        let path = store.persist("audio-", "wav", b"RIFFdata").unwrap();
        assert_eq!(path.extension().unwrap(), "wav");
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("audio-"));
        assert_eq!(fs::read(&path).unwrap(), b"RIFFdata");
    }

    #[test]
    fn persist_never_reuses_a_path() {
        let (_dir, store) = store();
        let first = store.persist("audio-", "wav", b"one").unwrap();
        let second = store.persist("audio-", "wav", b"two").unwrap();
        assert_ne!(first, second);
        // The older resource is left in place.
        assert_eq!(fs::read(&first).unwrap(), b"one");
    }

    #[test]
    fn allocate_reserves_empty_file() {
        let (_dir, store) = store();
        let path = store.allocate("video-", "mp4").unwrap();
        assert!(path.exists());
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn import_copies_and_keeps_extension() {
        let (dir, store) = store();
        let source = dir.path().join("Narration.MP3");
        fs::write(&source, b"ID3 fake mp3").unwrap();

        let imported = store.import(&source, "upload-").unwrap();

        assert_ne!(imported, source);
        assert_eq!(imported.extension().unwrap(), "mp3");
        assert_eq!(fs::read(&imported).unwrap(), b"ID3 fake mp3");
    }

    #[test]
    fn import_rejects_missing_and_empty_files() {
        let (dir, store) = store();
        let missing = store.import(&dir.path().join("nope.wav"), "upload-");
        assert!(matches!(
            missing,
            Err(StudioError::Validation(ValidationError::InvalidUpload { .. }))
        ));

        let empty = dir.path().join("empty.wav");
        fs::write(&empty, b"").unwrap();
        assert!(matches!(
            store.import(&empty, "upload-"),
            Err(StudioError::Validation(ValidationError::InvalidUpload { .. }))
        ));

        assert!(matches!(
            store.import(Path::new(""), "upload-"),
            Err(StudioError::Validation(ValidationError::EmptyInput { .. }))
        ));
    }

    #[test]
    fn read_reports_path_on_failure() {
        let err = ResourceStore::read(Path::new("/nonexistent/tldr/a.wav")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/tldr/a.wav"));
    }
}
