use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{debug, warn};

use crate::application::{EventBus, StateStore};
use crate::domain::{ConversationRepository, Credential, SessionSettings, StatusNotice};

/// State shared by the use cases of one running session.
pub struct SessionContext {
    repository: Mutex<ConversationRepository>,
    store: Arc<dyn StateStore>,
    /// Serializes snapshot-and-save so an older snapshot never lands after a
    /// newer one.
    persist_lock: Mutex<()>,
    credential: RwLock<Option<Credential>>,
    events: EventBus,
    settings: SessionSettings,
}

impl SessionContext {
    pub fn new(
        repository: ConversationRepository,
        store: Arc<dyn StateStore>,
        credential: Option<Credential>,
        events: EventBus,
        settings: SessionSettings,
    ) -> Self {
        Self {
            repository: Mutex::new(repository),
            store,
            persist_lock: Mutex::new(()),
            credential: RwLock::new(credential),
            events,
            settings,
        }
    }

    /// Locks the repository. Never hold the guard across a network call.
    pub async fn repository(&self) -> MutexGuard<'_, ConversationRepository> {
        self.repository.lock().await
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub async fn credential(&self) -> Option<Credential> {
        self.credential.read().await.clone()
    }

    pub async fn set_credential(&self, credential: Option<Credential>) {
        *self.credential.write().await = credential;
    }

    /// Writes the current repository state. Failures are logged and surfaced
    /// as a notice; the in-memory state stays authoritative either way.
    pub async fn persist(&self) -> bool {
        let _ordering = self.persist_lock.lock().await;
        let snapshot = self.repository.lock().await.snapshot();

        match self.store.save(&snapshot).await {
            Ok(()) => {
                debug!("Persisted {} conversations", snapshot.len());
                true
            }
            Err(e) => {
                warn!("Failed to persist conversations: {}", e);
                self.events
                    .notify(StatusNotice::error("Failed to save conversations"));
                false
            }
        }
    }
}
