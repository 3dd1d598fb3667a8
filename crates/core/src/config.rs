//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the ingest service.
//! Nothing in the core reads process-wide environment variables while messages are being
//! processed; the `*_from_env_value` helpers take the raw value so binaries decide where it
//! comes from and tests never touch the real environment.

use crate::constants::{
    DEFAULT_DATA_DIR, DEFAULT_SEGMENT_TERMINATORS, FINGERPRINTS_DIR_NAME, IDENTITIES_DIR_NAME,
};
use crate::{IngestError, IngestResult};
use lake_fingerprint::{DEFAULT_FINGERPRINT_LENGTH, MAX_FINGERPRINT_LENGTH, MIN_FINGERPRINT_LENGTH};
use std::path::{Path, PathBuf};

/// Ingest configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngestConfig {
    data_dir: PathBuf,
    segment_terminators: Vec<String>,
    fingerprint_length: usize,
}

impl IngestConfig {
    /// Create a new `IngestConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Configuration`] if a terminator hint is empty or the fingerprint
    /// length is outside the supported range.
    pub fn new(
        data_dir: PathBuf,
        segment_terminators: Vec<String>,
        fingerprint_length: usize,
    ) -> IngestResult<Self> {
        if segment_terminators.iter().any(|t| t.is_empty()) {
            return Err(IngestError::Configuration(
                "segment terminators cannot contain empty strings".into(),
            ));
        }

        if !(MIN_FINGERPRINT_LENGTH..=MAX_FINGERPRINT_LENGTH).contains(&fingerprint_length) {
            return Err(IngestError::Configuration(format!(
                "fingerprint length must be between {} and {}, got {}",
                MIN_FINGERPRINT_LENGTH, MAX_FINGERPRINT_LENGTH, fingerprint_length
            )));
        }

        Ok(Self {
            data_dir,
            segment_terminators,
            fingerprint_length,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn fingerprints_dir(&self) -> PathBuf {
        self.data_dir.join(FINGERPRINTS_DIR_NAME)
    }

    pub fn identities_dir(&self) -> PathBuf {
        self.data_dir.join(IDENTITIES_DIR_NAME)
    }

    /// Terminator hints used for a batch when the caller declares none.
    pub fn segment_terminators(&self) -> &[String] {
        &self.segment_terminators
    }

    pub fn fingerprint_length(&self) -> usize {
        self.fingerprint_length
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            segment_terminators: default_segment_terminators(),
            fingerprint_length: DEFAULT_FINGERPRINT_LENGTH,
        }
    }
}

fn default_segment_terminators() -> Vec<String> {
    DEFAULT_SEGMENT_TERMINATORS
        .iter()
        .map(|t| t.to_string())
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve the data root from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_DATA_DIR`].
pub fn data_dir_from_env_value(value: Option<String>) -> PathBuf {
    non_blank(value)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Parse default terminator hints from a JSON array of strings, e.g. `["\r\n", "\n"]`.
///
/// If `value` is `None` or empty/whitespace, returns the built-in defaults.
///
/// # Errors
///
/// Returns [`IngestError::Configuration`] if the value is not a JSON array of strings.
pub fn segment_terminators_from_env_value(value: Option<String>) -> IngestResult<Vec<String>> {
    match non_blank(value) {
        None => Ok(default_segment_terminators()),
        Some(raw) => serde_json::from_str::<Vec<String>>(&raw).map_err(|e| {
            IngestError::Configuration(format!(
                "segment terminators must be a JSON array of strings: {}",
                e
            ))
        }),
    }
}

/// Parse the fingerprint length (hex characters) from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_FINGERPRINT_LENGTH`]. Range
/// checking happens in [`IngestConfig::new`].
///
/// # Errors
///
/// Returns [`IngestError::Configuration`] if the value is not an unsigned integer.
pub fn fingerprint_length_from_env_value(value: Option<String>) -> IngestResult<usize> {
    non_blank(value)
        .map(|v| {
            v.parse::<usize>().map_err(|e| {
                IngestError::Configuration(format!("invalid fingerprint length '{}': {}", v, e))
            })
        })
        .transpose()
        .map(|parsed| parsed.unwrap_or(DEFAULT_FINGERPRINT_LENGTH))
}
