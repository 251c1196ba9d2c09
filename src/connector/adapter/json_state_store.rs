use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::application::StateStore;
use crate::domain::{ChatState, DomainError};

const STATE_FILE: &str = "conversations.json";

/// Stores the whole [`ChatState`] as one JSON document under a fixed name in
/// the data directory.
pub struct JsonFileStateStore {
    path: PathBuf,
    max_chats: usize,
}

impl JsonFileStateStore {
    pub fn new(data_dir: impl AsRef<Path>, max_chats: usize) -> Self {
        Self {
            path: data_dir.as_ref().join(STATE_FILE),
            max_chats: max_chats.max(1),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StateStore for JsonFileStateStore {
    async fn load(&self) -> ChatState {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No saved conversations at {}", self.path.display());
                return ChatState::default();
            }
            Err(e) => {
                warn!("Failed to read {}: {}", self.path.display(), e);
                return ChatState::default();
            }
        };

        match serde_json::from_slice::<ChatState>(&bytes) {
            Ok(mut state) => {
                state.repair_active();
                state
            }
            Err(e) => {
                warn!(
                    "Discarding unreadable conversation data at {}: {}",
                    self.path.display(),
                    e
                );
                ChatState::default()
            }
        }
    }

    async fn save(&self, state: &ChatState) -> Result<(), DomainError> {
        let mut state = state.clone();
        let evicted = state.truncate_to(self.max_chats);
        if evicted > 0 {
            debug!("Dropped {} conversations before saving", evicted);
        }

        let json = serde_json::to_vec_pretty(&state)
            .map_err(|e| DomainError::storage(format!("Failed to serialize conversations: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write to a sibling file, then rename over the old record.
        let temp_path = self.path.with_extension("json.tmp");
        if let Err(e) = tokio::fs::write(&temp_path, &json).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(DomainError::storage(format!(
                "Failed to write {}: {}",
                temp_path.display(),
                e
            )));
        }
        tokio::fs::rename(&temp_path, &self.path).await.map_err(|e| {
            DomainError::storage(format!("Failed to replace {}: {}", self.path.display(), e))
        })?;

        debug!("Saved {} conversations to {}", state.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStateStore::new(dir.path(), 15);

        let state = store.load().await;
        assert!(state.is_empty());
        assert!(state.active_conversation_id.is_none());
    }

    #[tokio::test]
    async fn test_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStateStore::new(dir.path(), 15);

        store.save(&ChatState::default()).await.unwrap();

        assert!(store.path().exists());
        assert!(!dir.path().join("conversations.json.tmp").exists());
    }
}
