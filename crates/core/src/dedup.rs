//! Duplicate submission guard.
//!
//! Checking and reserving are separate steps. The guard only ever *checks*; the caller reserves
//! a fingerprint after the payload has been fully processed, so a payload that failed half way
//! can be submitted again. The cost is that two identical payloads racing through at the same
//! time may both be accepted.

use crate::{IngestError, IngestResult};
use lake_fingerprint::{Fingerprint, FingerprintStore, SourceId};

#[derive(Debug, Clone)]
pub struct DedupGuard<S> {
    store: S,
    fingerprint_length: usize,
}

impl<S: FingerprintStore> DedupGuard<S> {
    pub fn new(store: S, fingerprint_length: usize) -> Self {
        Self {
            store,
            fingerprint_length,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fingerprint of `payload` at the configured length.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::FingerprintStore`] if the configured length is out of range.
    pub fn fingerprint(&self, payload: &[u8]) -> IngestResult<Fingerprint> {
        Ok(Fingerprint::compute(payload, self.fingerprint_length)?)
    }

    /// Accept `payload` from `source` unless the same bytes were already accepted from it.
    ///
    /// # Returns
    ///
    /// The payload's fingerprint, to be passed to [`DedupGuard::reserve`] once processing
    /// succeeds.
    ///
    /// # Errors
    ///
    /// - [`IngestError::DuplicateSubmission`] if `(source, fingerprint)` is already recorded
    /// - [`IngestError::FingerprintStore`] if the store cannot be read
    pub fn check_and_accept(&self, source: &SourceId, payload: &[u8]) -> IngestResult<Fingerprint> {
        let fingerprint = self.fingerprint(payload)?;

        if self.store.exists(source, &fingerprint)? {
            tracing::warn!(
                "duplicate submission from {}: fingerprint {}",
                source,
                fingerprint
            );
            return Err(IngestError::DuplicateSubmission {
                source_id: source.clone(),
                fingerprint,
            });
        }

        Ok(fingerprint)
    }

    /// Record `fingerprint` as accepted from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::FingerprintStore`] if the store cannot be written.
    pub fn reserve(&self, source: &SourceId, fingerprint: &Fingerprint) -> IngestResult<()> {
        self.store.record(source, fingerprint)?;
        tracing::debug!("reserved fingerprint {} for {}", fingerprint, source);
        Ok(())
    }
}
