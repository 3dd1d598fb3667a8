//! File-backed identity index.
//!
//! Each local identifier gets one JSON record, addressed by the SHA-256 of the identifier so
//! that arbitrary identifier text never reaches a path:
//!
//! ```text
//! <root>/
//! └── 3f/
//!     └── 9e/
//!         └── 3f9e...c1.json   # { "local_id": "AUTH#MR#123", "global_id": "...", ... }
//! ```
//!
//! A record is written to a temporary file in its shard directory and then moved into place
//! without overwriting, so readers only ever see complete records and an existing link is never
//! replaced. An empty record file can only be left by a write that never completed; it reads as
//! absent and the next link replaces it.

use super::IdentityIndex;
use crate::error::{IndexError, IndexResult};
use crate::identifiers::LocalIdentifier;
use chrono::{DateTime, Utc};
use lake_uuid::GlobalId;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Contents of an identity record file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IdentityRecord {
    pub local_id: LocalIdentifier,
    pub global_id: GlobalId,
    pub linked_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct FileIdentityIndex {
    root_directory: PathBuf,
}

impl FileIdentityIndex {
    /// Opens an index rooted at `root_directory`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidRootDirectory`] if the path is not a directory or cannot be
    /// created.
    pub fn new(root_directory: &Path) -> IndexResult<Self> {
        if root_directory.exists() && !root_directory.is_dir() {
            return Err(IndexError::InvalidRootDirectory(format!(
                "Path is not a directory: {}",
                root_directory.display()
            )));
        }

        fs::create_dir_all(root_directory).map_err(|e| {
            IndexError::InvalidRootDirectory(format!(
                "Cannot create directory {}: {}",
                root_directory.display(),
                e
            ))
        })?;

        Ok(Self {
            root_directory: root_directory.to_path_buf(),
        })
    }

    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    /// Full record for `local_id`, if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError`] if the record cannot be read or parsed, or belongs to a different
    /// identifier (a digest collision or a hand-edited file).
    pub fn read_record(&self, local_id: &LocalIdentifier) -> IndexResult<Option<IdentityRecord>> {
        let path = self.record_path(local_id);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(IndexError::Io(e)),
        };

        if contents.is_empty() {
            tracing::warn!("ignoring empty identity record {}", path.display());
            return Ok(None);
        }

        let record: IdentityRecord = serde_json::from_str(&contents)?;
        if &record.local_id != local_id {
            return Err(IndexError::InvalidRecord(format!(
                "{} holds {}, expected {}",
                path.display(),
                record.local_id,
                local_id
            )));
        }
        Ok(Some(record))
    }

    fn record_path(&self, local_id: &LocalIdentifier) -> PathBuf {
        let digest = hex::encode(Sha256::digest(local_id.as_str().as_bytes()));
        self.root_directory
            .join(&digest[0..2])
            .join(&digest[2..4])
            .join(format!("{}.json", digest))
    }
}

impl IdentityIndex for FileIdentityIndex {
    fn lookup(&self, local_id: &LocalIdentifier) -> IndexResult<Option<GlobalId>> {
        Ok(self.read_record(local_id)?.map(|record| record.global_id))
    }

    fn link(&self, local_id: &LocalIdentifier, identity: GlobalId) -> IndexResult<GlobalId> {
        let path = self.record_path(local_id);
        let shard = path.parent().unwrap_or(&self.root_directory);
        fs::create_dir_all(shard)?;

        let record = IdentityRecord {
            local_id: local_id.clone(),
            global_id: identity,
            linked_at: Utc::now(),
        };
        let mut staged = NamedTempFile::new_in(shard)?;
        serde_json::to_writer(&mut staged, &record)?;
        staged.as_file().sync_all()?;

        match staged.persist_noclobber(&path) {
            Ok(_) => Ok(identity),
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                match self.read_record(local_id)? {
                    Some(existing) => {
                        tracing::debug!("{} already linked to {}", local_id, existing.global_id);
                        Ok(existing.global_id)
                    }
                    None => {
                        e.file.persist(&path).map_err(|e| IndexError::Io(e.error))?;
                        Ok(identity)
                    }
                }
            }
            Err(e) => Err(IndexError::Io(e.error)),
        }
    }
}
