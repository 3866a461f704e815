//! Status persistence contract
//!
//! The engine never talks to storage directly. A [`StatusStore`] is handed to
//! the session, which writes through it after every mutation.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use notam_core::{IdentityKey, UserStatus};
use tokio::sync::RwLock;

use crate::error::StoreError;

/// Which statuses a caller needs
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BriefingScope {
    #[default]
    All,
    /// Only keys of the current briefing
    Keys(HashSet<IdentityKey>),
}

impl BriefingScope {
    pub fn contains(&self, key: &IdentityKey) -> bool {
        match self {
            BriefingScope::All => true,
            BriefingScope::Keys(keys) => keys.contains(key),
        }
    }
}

impl From<HashSet<IdentityKey>> for BriefingScope {
    fn from(keys: HashSet<IdentityKey>) -> Self {
        BriefingScope::Keys(keys)
    }
}

#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Persist the status of one notice, replacing any previous one
    async fn save(&self, key: &IdentityKey, status: &UserStatus) -> Result<(), StoreError>;

    async fn load_statuses(
        &self,
        scope: &BriefingScope,
    ) -> Result<HashMap<IdentityKey, UserStatus>, StoreError>;

    /// Add a key to the cross-briefing ignore list
    async fn add_ignored(&self, key: &IdentityKey, reason: Option<&str>) -> Result<(), StoreError>;

    async fn load_ignored(&self) -> Result<HashSet<IdentityKey>, StoreError>;
}

/// In-process store, for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStatusStore {
    statuses: RwLock<HashMap<IdentityKey, UserStatus>>,
    ignored: RwLock<HashMap<IdentityKey, Option<String>>>,
}

impl MemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statuses(statuses: HashMap<IdentityKey, UserStatus>) -> Self {
        Self {
            statuses: RwLock::new(statuses),
            ignored: RwLock::default(),
        }
    }

    pub async fn ignore_reason(&self, key: &IdentityKey) -> Option<String> {
        self.ignored.read().await.get(key).cloned().flatten()
    }
}

#[async_trait]
impl StatusStore for MemoryStatusStore {
    async fn save(&self, key: &IdentityKey, status: &UserStatus) -> Result<(), StoreError> {
        self.statuses.write().await.insert(key.clone(), status.clone());
        Ok(())
    }

    async fn load_statuses(
        &self,
        scope: &BriefingScope,
    ) -> Result<HashMap<IdentityKey, UserStatus>, StoreError> {
        Ok(self
            .statuses
            .read()
            .await
            .iter()
            .filter(|(key, _)| scope.contains(key))
            .map(|(key, status)| (key.clone(), status.clone()))
            .collect())
    }

    async fn add_ignored(&self, key: &IdentityKey, reason: Option<&str>) -> Result<(), StoreError> {
        self.ignored
            .write()
            .await
            .insert(key.clone(), reason.map(str::to_string));
        Ok(())
    }

    async fn load_ignored(&self) -> Result<HashSet<IdentityKey>, StoreError> {
        Ok(self.ignored.read().await.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notam_core::ReviewState;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStatusStore::new();
        let a = IdentityKey::from_raw("a");
        let b = IdentityKey::from_raw("b");

        store.save(&a, &UserStatus::new(ReviewState::Read)).await.unwrap();
        store
            .save(&b, &UserStatus::new(ReviewState::Important).with_note("check"))
            .await
            .unwrap();

        let all = store.load_statuses(&BriefingScope::All).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[&b].note.as_deref(), Some("check"));

        let scoped = store
            .load_statuses(&BriefingScope::from(HashSet::from([a.clone()])))
            .await
            .unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[&a].state, ReviewState::Read);
    }

    #[tokio::test]
    async fn test_memory_store_ignore_list() {
        let store = MemoryStatusStore::new();
        let a = IdentityKey::from_raw("a");

        store.add_ignored(&a, Some("permanent crane")).await.unwrap();
        store.add_ignored(&IdentityKey::from_raw("b"), None).await.unwrap();

        let ignored = store.load_ignored().await.unwrap();
        assert_eq!(ignored.len(), 2);
        assert!(ignored.contains(&a));
        assert_eq!(store.ignore_reason(&a).await.as_deref(), Some("permanent crane"));
    }
}
