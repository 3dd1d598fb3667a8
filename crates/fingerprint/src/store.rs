//! File-backed fingerprint store
//!
//! This module provides [`FileFingerprintStore`], a durable [`FingerprintStore`] that keeps one
//! small JSON marker file per accepted `(source, fingerprint)` pair.
//!
//! # Storage Layout
//!
//! ```text
//! <root>/                      # store root
//! └── source=<source>/         # one partition per submitting source
//!     └── ab/                  # first two hex characters of the fingerprint
//!         └── ab3f9e0c12d4.json
//! ```
//!
//! # Guarantees
//!
//! - Markers are written to a temporary file in the shard directory and moved into place without
//!   overwriting, so a concurrent second writer never replaces the first acceptance record and a
//!   crash never leaves a partial marker at its final path
//! - An empty marker can only come from an interrupted write; it does not count as recorded and
//!   the next `record` replaces it
//! - Paths are derived only from validated [`SourceId`] and [`Fingerprint`] values, which
//!   cannot contain path separators
//! - The root directory is validated and canonicalised at construction time

use crate::{
    Fingerprint, FingerprintError, FingerprintResult, FingerprintStore, SourceId,
    SOURCE_DIR_PREFIX,
};
use chrono::{DateTime, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Contents of a marker file.
///
/// Auditable record of when a payload was first accepted; carries no payload content.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct FingerprintRecord {
    pub source: SourceId,
    pub fingerprint: Fingerprint,
    /// UTC timestamp when the fingerprint was recorded
    pub recorded_at: DateTime<Utc>,
}

/// Durable fingerprint store rooted at a directory.
#[derive(Debug)]
pub struct FileFingerprintStore {
    root_directory: PathBuf,
}

impl FileFingerprintStore {
    /// Opens a store rooted at `root_directory`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `FingerprintError` if:
    /// - the path exists but is not a directory
    /// - the directory cannot be created or canonicalised
    pub fn new(root_directory: &Path) -> FingerprintResult<Self> {
        if root_directory.exists() && !root_directory.is_dir() {
            return Err(FingerprintError::InvalidRootDirectory(format!(
                "Path is not a directory: {}",
                root_directory.display()
            )));
        }

        fs::create_dir_all(root_directory).map_err(|e| {
            FingerprintError::InvalidRootDirectory(format!(
                "Cannot create directory {}: {}",
                root_directory.display(),
                e
            ))
        })?;

        let root_directory = root_directory.canonicalize().map_err(|e| {
            FingerprintError::InvalidRootDirectory(format!(
                "Cannot canonicalize path {}: {}",
                root_directory.display(),
                e
            ))
        })?;

        Ok(Self { root_directory })
    }

    /// Reads back the acceptance record for a pair, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `FingerprintError` if the marker exists but cannot be read or parsed.
    pub fn read_record(
        &self,
        source: &SourceId,
        fingerprint: &Fingerprint,
    ) -> FingerprintResult<Option<FingerprintRecord>> {
        let path = self.marker_path(source, fingerprint);
        match fs::read_to_string(&path) {
            Ok(contents) if contents.is_empty() => Ok(None),
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FingerprintError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read marker {}: {}", path.display(), e),
            ))),
        }
    }

    #[must_use]
    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    /// Path of the marker file: `<root>/source=<source>/<shard>/<fingerprint>.json`
    fn marker_path(&self, source: &SourceId, fingerprint: &Fingerprint) -> PathBuf {
        self.root_directory
            .join(format!("{}{}", SOURCE_DIR_PREFIX, source))
            .join(fingerprint.shard())
            .join(format!("{}.json", fingerprint))
    }
}

impl FingerprintStore for FileFingerprintStore {
    fn exists(&self, source: &SourceId, fingerprint: &Fingerprint) -> FingerprintResult<bool> {
        let path = self.marker_path(source, fingerprint);
        match fs::metadata(&path) {
            Ok(metadata) => Ok(metadata.is_file() && metadata.len() > 0),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error("Failed to inspect marker", &path, e)),
        }
    }

    fn record(&self, source: &SourceId, fingerprint: &Fingerprint) -> FingerprintResult<()> {
        let path = self.marker_path(source, fingerprint);
        let shard = path.parent().unwrap_or(&self.root_directory);

        fs::create_dir_all(shard)
            .map_err(|e| io_error("Failed to create directory", shard, e))?;

        let record = FingerprintRecord {
            source: source.clone(),
            fingerprint: fingerprint.clone(),
            recorded_at: Utc::now(),
        };

        let mut staged = NamedTempFile::new_in(shard)
            .map_err(|e| io_error("Failed to create temporary marker in", shard, e))?;
        serde_json::to_writer(&mut staged, &record)?;
        staged
            .as_file()
            .sync_all()
            .map_err(|e| io_error("Failed to write marker", &path, e))?;

        match staged.persist_noclobber(&path) {
            Ok(_) => Ok(()),
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                if self.exists(source, fingerprint)? {
                    tracing::debug!("fingerprint {} already recorded for {}", fingerprint, source);
                    return Ok(());
                }
                tracing::warn!("replacing empty marker {}", path.display());
                e.file
                    .persist(&path)
                    .map(|_| ())
                    .map_err(|e| io_error("Failed to replace marker", &path, e.error))
            }
            Err(e) => Err(io_error("Failed to create marker", &path, e.error)),
        }
    }
}

fn io_error(action: &str, path: &Path, e: std::io::Error) -> FingerprintError {
    FingerprintError::Io(std::io::Error::new(
        e.kind(),
        format!("{} {}: {}", action, path.display(), e),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn source(name: &str) -> SourceId {
        SourceId::new(name).unwrap()
    }

    #[test]
    fn test_new_creates_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("fingerprints");

        let store = FileFingerprintStore::new(&root).unwrap();

        assert!(root.is_dir());
        assert!(store.root_directory().ends_with("fingerprints"));
    }

    #[test]
    fn test_new_rejects_file_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("file.txt");
        fs::write(&root, "not a directory").unwrap();

        let store = FileFingerprintStore::new(&root);

        assert!(matches!(
            store,
            Err(FingerprintError::InvalidRootDirectory(_))
        ));
    }

    #[test]
    fn test_record_and_exists() {
        let temp = TempDir::new().unwrap();
        let store = FileFingerprintStore::new(temp.path()).unwrap();
        let fp = Fingerprint::compute(b"MSH|payload", 12).unwrap();

        assert!(!store.exists(&source("emr"), &fp).unwrap());
        store.record(&source("emr"), &fp).unwrap();
        assert!(store.exists(&source("emr"), &fp).unwrap());
    }

    #[test]
    fn test_marker_path_layout() {
        let temp = TempDir::new().unwrap();
        let store = FileFingerprintStore::new(temp.path()).unwrap();
        let fp = Fingerprint::parse("abcdef123456").unwrap();

        let path = store.marker_path(&source("emr"), &fp);
        let path_str = path.to_string_lossy();

        assert!(path_str.contains("source=emr/ab/abcdef123456.json"));
        assert!(path.starts_with(store.root_directory()));
    }

    #[test]
    fn test_sources_are_isolated() {
        let temp = TempDir::new().unwrap();
        let store = FileFingerprintStore::new(temp.path()).unwrap();
        let fp = Fingerprint::compute(b"same payload", 12).unwrap();

        store.record(&source("emr"), &fp).unwrap();

        assert!(store.exists(&source("emr"), &fp).unwrap());
        assert!(!store.exists(&source("lab"), &fp).unwrap());
    }

    #[test]
    fn test_record_twice_keeps_original() {
        let temp = TempDir::new().unwrap();
        let store = FileFingerprintStore::new(temp.path()).unwrap();
        let fp = Fingerprint::compute(b"payload", 12).unwrap();

        store.record(&source("emr"), &fp).unwrap();
        let first = store.read_record(&source("emr"), &fp).unwrap().unwrap();

        store.record(&source("emr"), &fp).unwrap();
        let second = store.read_record(&source("emr"), &fp).unwrap().unwrap();

        assert_eq!(first, second);
        assert_eq!(first.fingerprint, fp);
        assert_eq!(first.source, source("emr"));
    }

    #[test]
    fn test_exists_reports_io_errors() {
        let temp = TempDir::new().unwrap();
        let store = FileFingerprintStore::new(temp.path()).unwrap();
        let fp = Fingerprint::compute(b"payload", 12).unwrap();
        fs::write(store.root_directory().join("source=emr"), "not a directory").unwrap();

        assert!(matches!(
            store.exists(&source("emr"), &fp),
            Err(FingerprintError::Io(_))
        ));
        assert!(matches!(
            store.record(&source("emr"), &fp),
            Err(FingerprintError::Io(_))
        ));
    }

    #[test]
    fn test_empty_marker_is_not_recorded() {
        let temp = TempDir::new().unwrap();
        let store = FileFingerprintStore::new(temp.path()).unwrap();
        let fp = Fingerprint::compute(b"interrupted", 12).unwrap();
        let path = store.marker_path(&source("emr"), &fp);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "").unwrap();

        assert!(!store.exists(&source("emr"), &fp).unwrap());
        assert!(store.read_record(&source("emr"), &fp).unwrap().is_none());

        store.record(&source("emr"), &fp).unwrap();
        assert!(store.exists(&source("emr"), &fp).unwrap());
        let record = store.read_record(&source("emr"), &fp).unwrap().unwrap();
        assert_eq!(record.fingerprint, fp);
    }

    #[test]
    fn test_record_leaves_only_the_marker() {
        let temp = TempDir::new().unwrap();
        let store = FileFingerprintStore::new(temp.path()).unwrap();
        let fp = Fingerprint::compute(b"payload", 12).unwrap();
        store.record(&source("emr"), &fp).unwrap();

        let path = store.marker_path(&source("emr"), &fp);
        let entries: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(entries, vec![path]);
    }

    #[test]
    fn test_read_record_missing() {
        let temp = TempDir::new().unwrap();
        let store = FileFingerprintStore::new(temp.path()).unwrap();
        let fp = Fingerprint::compute(b"never recorded", 12).unwrap();

        assert!(store.read_record(&source("emr"), &fp).unwrap().is_none());
    }

    #[test]
    fn test_store_reopens_with_existing_records() {
        let temp = TempDir::new().unwrap();
        let fp = Fingerprint::compute(b"payload", 12).unwrap();

        {
            let store = FileFingerprintStore::new(temp.path()).unwrap();
            store.record(&source("emr"), &fp).unwrap();
        }

        let reopened = FileFingerprintStore::new(temp.path()).unwrap();
        assert!(reopened.exists(&source("emr"), &fp).unwrap());
    }
}
