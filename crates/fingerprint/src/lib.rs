//! Payload fingerprints for ingest deduplication.
//!
//! A fingerprint is the SHA-256 digest of a raw inbound payload, hex encoded and truncated to
//! a fixed length. Fingerprints are scoped to the submitting source: uniqueness is enforced per
//! `(source, fingerprint)` pair, never globally.
//!
//! ## Design Principles
//!
//! - Computing a fingerprint never touches a store
//! - Checking a store never reserves anything; recording is an explicit, separate call
//! - Recording the same `(source, fingerprint)` twice is a no-op
//! - Stores are injected, never process-wide
//!
//! ## File-backed layout
//!
//! ```text
//! <root>/
//! └── source=<source>/
//!     └── ab/
//!         └── ab3f9e0c12d4.json
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use lake_fingerprint::{FileFingerprintStore, Fingerprint, FingerprintStore, SourceId};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FileFingerprintStore::new(Path::new("lake_data/fingerprints"))?;
//! let source = SourceId::new("hospital-a")?;
//! let fingerprint = Fingerprint::compute(b"MSH|^~\\&|...", 12)?;
//!
//! if !store.exists(&source, &fingerprint)? {
//!     store.record(&source, &fingerprint)?;
//! }
//! # Ok(())
//! # }
//! ```

mod constants;
mod fingerprint;
mod memory;
mod store;

pub use constants::{
    DEFAULT_FINGERPRINT_LENGTH, MAX_FINGERPRINT_LENGTH, MIN_FINGERPRINT_LENGTH, SOURCE_DIR_PREFIX,
};
pub use fingerprint::Fingerprint;
pub use lake_types::SourceId;
pub use memory::InMemoryFingerprintStore;
pub use store::{FileFingerprintStore, FingerprintRecord};

/// Errors that can occur while computing or storing fingerprints
#[derive(Debug, thiserror::Error)]
pub enum FingerprintError {
    /// Requested truncation length is outside the supported range
    #[error("Fingerprint length must be between {min} and {max} hex characters, got {0}", min = MIN_FINGERPRINT_LENGTH, max = MAX_FINGERPRINT_LENGTH)]
    InvalidLength(usize),

    /// A stored or supplied fingerprint string is not lowercase hex of a supported length
    #[error("Invalid fingerprint: {0}")]
    InvalidFingerprint(String),

    /// Root directory does not exist or is not a directory
    #[error("Invalid root directory: {0}")]
    InvalidRootDirectory(String),

    /// Record could not be serialised
    #[error("Failed to serialise fingerprint record: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A lock guarding an in-memory store was poisoned by a panicking writer
    #[error("Fingerprint store lock poisoned")]
    Poisoned,

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for fingerprint operations.
pub type FingerprintResult<T> = Result<T, FingerprintError>;

/// A per-source index of previously accepted payload fingerprints.
///
/// Implementations must be safe to share between threads; batch callers may process messages
/// in parallel.
pub trait FingerprintStore: Send + Sync {
    /// Returns whether `fingerprint` has already been recorded for `source`.
    fn exists(&self, source: &SourceId, fingerprint: &Fingerprint) -> FingerprintResult<bool>;

    /// Records `fingerprint` as accepted for `source`.
    ///
    /// Recording an existing pair succeeds without changing the original record.
    fn record(&self, source: &SourceId, fingerprint: &Fingerprint) -> FingerprintResult<()>;
}

impl<T: FingerprintStore + ?Sized> FingerprintStore for &T {
    fn exists(&self, source: &SourceId, fingerprint: &Fingerprint) -> FingerprintResult<bool> {
        (**self).exists(source, fingerprint)
    }

    fn record(&self, source: &SourceId, fingerprint: &Fingerprint) -> FingerprintResult<()> {
        (**self).record(source, fingerprint)
    }
}

impl<T: FingerprintStore + ?Sized> FingerprintStore for std::sync::Arc<T> {
    fn exists(&self, source: &SourceId, fingerprint: &Fingerprint) -> FingerprintResult<bool> {
        (**self).exists(source, fingerprint)
    }

    fn record(&self, source: &SourceId, fingerprint: &Fingerprint) -> FingerprintResult<()> {
        (**self).record(source, fingerprint)
    }
}
