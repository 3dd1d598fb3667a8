use super::IdentityIndex;
use crate::error::{IndexError, IndexResult};
use crate::identifiers::LocalIdentifier;
use lake_uuid::GlobalId;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct InMemoryIdentityIndex {
    links: Mutex<HashMap<LocalIdentifier, GlobalId>>,
}

impl InMemoryIdentityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.links.lock().map(|links| links.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IdentityIndex for InMemoryIdentityIndex {
    fn lookup(&self, local_id: &LocalIdentifier) -> IndexResult<Option<GlobalId>> {
        let links = self.links.lock().map_err(|_| IndexError::Poisoned)?;
        Ok(links.get(local_id).copied())
    }

    fn link(&self, local_id: &LocalIdentifier, identity: GlobalId) -> IndexResult<GlobalId> {
        let mut links = self.links.lock().map_err(|_| IndexError::Poisoned)?;
        let stored = *links.entry(local_id.clone()).or_insert(identity);
        if stored != identity {
            tracing::debug!("{} already linked to {}", local_id, stored);
        }
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_then_lookup() {
        let index = InMemoryIdentityIndex::new();
        let local_id = LocalIdentifier::from_parts("AUTH", "MR", "123");
        let identity = GlobalId::new();

        assert_eq!(index.lookup(&local_id).unwrap(), None);
        index.link(&local_id, identity).unwrap();
        assert_eq!(index.lookup(&local_id).unwrap(), Some(identity));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_link_does_not_overwrite() {
        let index = InMemoryIdentityIndex::new();
        let local_id = LocalIdentifier::from_parts("AUTH", "MR", "123");
        let first = GlobalId::new();

        assert_eq!(index.link(&local_id, first).unwrap(), first);
        assert_eq!(index.link(&local_id, GlobalId::new()).unwrap(), first);

        assert_eq!(index.lookup(&local_id).unwrap(), Some(first));
    }
}
