//! In-memory fingerprint store, used by tests and short-lived batch runs.

use crate::{Fingerprint, FingerprintError, FingerprintResult, FingerprintStore, SourceId};
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct InMemoryFingerprintStore {
    seen: Mutex<HashSet<(SourceId, Fingerprint)>>,
}

impl InMemoryFingerprintStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded `(source, fingerprint)` pairs.
    pub fn len(&self) -> usize {
        self.seen.lock().map(|seen| seen.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FingerprintStore for InMemoryFingerprintStore {
    fn exists(&self, source: &SourceId, fingerprint: &Fingerprint) -> FingerprintResult<bool> {
        let seen = self.seen.lock().map_err(|_| FingerprintError::Poisoned)?;
        Ok(seen.contains(&(source.clone(), fingerprint.clone())))
    }

    fn record(&self, source: &SourceId, fingerprint: &Fingerprint) -> FingerprintResult<()> {
        let mut seen = self.seen.lock().map_err(|_| FingerprintError::Poisoned)?;
        seen.insert((source.clone(), fingerprint.clone()));
        Ok(())
    }
}
