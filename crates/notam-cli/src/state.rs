//! JSON file backed status store

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use notam_core::{IdentityKey, UserStatus};
use notam_engine::{BriefingScope, StatusStore, StoreError};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    statuses: BTreeMap<IdentityKey, UserStatus>,
    /// Globally ignored keys with an optional reason
    #[serde(default)]
    ignored: BTreeMap<IdentityKey, Option<String>>,
}

/// Review state kept in a single JSON file, rewritten on every change
pub struct JsonStateStore {
    path: PathBuf,
    state: Mutex<StateFile>,
}

impl JsonStateStore {
    /// Open the state file, starting empty when it does not exist yet
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let state = if tokio::fs::try_exists(path).await? {
            let content = tokio::fs::read_to_string(path).await?;
            serde_json::from_str(&content)?
        } else {
            StateFile::default()
        };

        Ok(Self {
            path: path.to_path_buf(),
            state: Mutex::new(state),
        })
    }

    async fn write(&self, state: &StateFile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(state)?;
        tokio::fs::write(&self.path, content).await?;
        debug!("Wrote review state to {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl StatusStore for JsonStateStore {
    async fn save(&self, key: &IdentityKey, status: &UserStatus) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.statuses.insert(key.clone(), status.clone());
        self.write(&state).await
    }

    async fn load_statuses(
        &self,
        scope: &BriefingScope,
    ) -> Result<HashMap<IdentityKey, UserStatus>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .statuses
            .iter()
            .filter(|(key, _)| scope.contains(key))
            .map(|(key, status)| (key.clone(), status.clone()))
            .collect())
    }

    async fn add_ignored(&self, key: &IdentityKey, reason: Option<&str>) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.ignored.insert(key.clone(), reason.map(str::to_string));
        self.write(&state).await
    }

    async fn load_ignored(&self) -> Result<HashSet<IdentityKey>, StoreError> {
        Ok(self.state.lock().await.ignored.keys().cloned().collect())
    }
}
