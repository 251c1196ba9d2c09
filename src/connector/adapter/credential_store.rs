use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::application::CredentialStore;
use crate::domain::{Credential, DomainError};

const CREDENTIAL_FILE: &str = "credential.json";

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCredential {
    api_key: Credential,
}

/// Keeps the user-entered key override in its own file next to the
/// conversation data.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(CREDENTIAL_FILE),
        }
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load_override(&self) -> Option<Credential> {
        let bytes = tokio::fs::read(&self.path).await.ok()?;
        match serde_json::from_slice::<StoredCredential>(&bytes) {
            Ok(stored) => Credential::new(stored.api_key.expose()),
            Err(e) => {
                warn!("Ignoring unreadable key file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    async fn save_override(&self, credential: &Credential) -> Result<(), DomainError> {
        let json = serde_json::to_vec(&StoredCredential {
            api_key: credential.clone(),
        })
        .map_err(|e| DomainError::storage(format!("Failed to serialize key: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, &json).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;
        debug!("Stored key override at {}", self.path.display());
        Ok(())
    }

    async fn clear_override(&self) -> Result<(), DomainError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Default)]
pub struct InMemoryCredentialStore {
    credential: RwLock<Option<Credential>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(credential: Credential) -> Self {
        Self {
            credential: RwLock::new(Some(credential)),
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn load_override(&self) -> Option<Credential> {
        self.credential.read().await.clone()
    }

    async fn save_override(&self, credential: &Credential) -> Result<(), DomainError> {
        *self.credential.write().await = Some(credential.clone());
        Ok(())
    }

    async fn clear_override(&self) -> Result<(), DomainError> {
        *self.credential.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_override_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());
        assert!(store.load_override().await.is_none());

        store
            .save_override(&Credential::new("sk-user").unwrap())
            .await
            .unwrap();
        assert_eq!(store.load_override().await.unwrap().expose(), "sk-user");

        store.clear_override().await.unwrap();
        assert!(store.load_override().await.is_none());
        store.clear_override().await.unwrap();
    }

    #[tokio::test]
    async fn test_garbage_key_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CREDENTIAL_FILE), b"not json").unwrap();

        let store = FileCredentialStore::new(dir.path());
        assert!(store.load_override().await.is_none());
    }
}
