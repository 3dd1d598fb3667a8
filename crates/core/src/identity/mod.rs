//! Global patient identity resolution.
//!
//! Every local identifier seen in a message is mapped to one global identity. The first local
//! identifier (in extraction order) that already has an identity decides the outcome; if none
//! has, a new identity is generated. Every input identifier not yet indexed is then linked to
//! the winner, so the next message carrying any of them resolves the same way.
//!
//! ## Backends
//!
//! - [`InMemoryIdentityIndex`]: mutex-guarded map, for tests and one-shot runs
//! - [`FileIdentityIndex`]: one JSON record per local identifier under a sharded directory tree
//!
//! ## Concurrency
//!
//! Resolution is read-then-write. Two concurrent resolutions of overlapping identifiers can race.
//! Both backends make `link` a conditional put: an existing link is never overwritten and the
//! identity actually stored is returned. A resolution that loses the race on its first link
//! adopts the stored identity instead of minting a second one.

mod file;
mod memory;

pub use file::{FileIdentityIndex, IdentityRecord};
pub use memory::InMemoryIdentityIndex;

use crate::error::IndexResult;
use crate::identifiers::LocalIdentifier;
use crate::{IngestError, IngestResult};
use lake_uuid::GlobalId;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// Storage for `local identifier -> global identity` links.
pub trait IdentityIndex: Send + Sync {
    /// Identity previously linked to `local_id`, if any.
    fn lookup(&self, local_id: &LocalIdentifier) -> IndexResult<Option<GlobalId>>;

    /// Link `local_id` to `identity` unless it is already linked.
    ///
    /// # Returns
    ///
    /// The identity stored for `local_id` after the call: `identity` when this call created the
    /// link, otherwise the one an earlier writer stored.
    fn link(&self, local_id: &LocalIdentifier, identity: GlobalId) -> IndexResult<GlobalId>;
}

impl<T: IdentityIndex + ?Sized> IdentityIndex for &T {
    fn lookup(&self, local_id: &LocalIdentifier) -> IndexResult<Option<GlobalId>> {
        (**self).lookup(local_id)
    }

    fn link(&self, local_id: &LocalIdentifier, identity: GlobalId) -> IndexResult<GlobalId> {
        (**self).link(local_id, identity)
    }
}

impl<T: IdentityIndex + ?Sized> IdentityIndex for Arc<T> {
    fn lookup(&self, local_id: &LocalIdentifier) -> IndexResult<Option<GlobalId>> {
        (**self).lookup(local_id)
    }

    fn link(&self, local_id: &LocalIdentifier, identity: GlobalId) -> IndexResult<GlobalId> {
        (**self).link(local_id, identity)
    }
}

/// Outcome of resolving one message's identifiers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GlobalIdentity {
    pub id: GlobalId,
    /// `true` when no input identifier was known and a new identity was generated.
    pub created: bool,
    /// Identifiers linked to `id` by this resolution.
    pub newly_linked: Vec<LocalIdentifier>,
}

/// Resolves local identifiers to a global identity over an injected index.
#[derive(Debug, Clone)]
pub struct IdentityResolver<I> {
    index: I,
}

impl<I: IdentityIndex> IdentityResolver<I> {
    pub fn new(index: I) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    /// Resolve `local_ids` to a global identity, linking any that are not yet indexed.
    ///
    /// Duplicate identifiers in the input are looked up and linked once. An empty input yields
    /// a fresh identity with no links. Running the same resolution twice returns the same
    /// identity and writes nothing the second time.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::IdentityLinkFailure`] if a lookup or link fails. Linking stops at
    /// the first failure; since links are idempotent the whole resolution can be retried.
    pub fn resolve(&self, local_ids: &[LocalIdentifier]) -> IngestResult<GlobalIdentity> {
        let mut seen = HashSet::new();
        let mut winner: Option<GlobalId> = None;
        let mut unlinked = Vec::new();

        for local_id in local_ids.iter().filter(|id| seen.insert(*id)) {
            let existing = self
                .index
                .lookup(local_id)
                .map_err(|source| link_failure(local_id, source))?;

            match (existing, winner) {
                (None, _) => unlinked.push(local_id.clone()),
                (Some(found), None) => winner = Some(found),
                (Some(found), Some(current)) if found != current => {
                    tracing::warn!(
                        "{} is linked to {} but message resolved to {}; keeping {}",
                        local_id,
                        found,
                        current,
                        current
                    );
                }
                (Some(_), Some(_)) => {}
            }
        }

        let (mut id, mut created) = match winner {
            Some(id) => (id, false),
            None => (GlobalId::new(), true),
        };

        let mut newly_linked = Vec::with_capacity(unlinked.len());
        for local_id in unlinked {
            let stored = self
                .index
                .link(&local_id, id)
                .map_err(|source| link_failure(&local_id, source))?;

            if stored == id {
                tracing::debug!("linked {} to {}", local_id, id);
                newly_linked.push(local_id);
            } else if created && newly_linked.is_empty() {
                // Nothing points at the fresh identity yet, so take the one that won the race.
                tracing::debug!("{} linked concurrently to {}; adopting it", local_id, stored);
                id = stored;
                created = false;
            } else {
                tracing::warn!(
                    "{} was linked concurrently to {} but message resolved to {}; keeping {}",
                    local_id,
                    stored,
                    id,
                    id
                );
            }
        }

        if created {
            tracing::info!("created global identity {}", id);
        }

        Ok(GlobalIdentity {
            id,
            created,
            newly_linked,
        })
    }
}

fn link_failure(local_id: &LocalIdentifier, source: crate::error::IndexError) -> IngestError {
    tracing::error!("identity index failure for {}: {}", local_id, source);
    IngestError::IdentityLinkFailure {
        local_id: local_id.to_string(),
        source,
    }
}
