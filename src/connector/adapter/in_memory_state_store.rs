use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::application::StateStore;
use crate::domain::{ChatState, DomainError};

/// Non-durable [`StateStore`] for `--memory-storage` runs and tests. Applies
/// the same retention limit on save as the file store.
pub struct InMemoryStateStore {
    state: RwLock<ChatState>,
    max_chats: usize,
    fail_saves: AtomicBool,
}

impl InMemoryStateStore {
    pub fn new(max_chats: usize) -> Self {
        Self {
            state: RwLock::new(ChatState::default()),
            max_chats: max_chats.max(1),
            fail_saves: AtomicBool::new(false),
        }
    }

    /// Makes every following `save` fail until switched back.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub async fn stored(&self) -> ChatState {
        self.state.read().await.clone()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn load(&self) -> ChatState {
        self.state.read().await.clone()
    }

    async fn save(&self, state: &ChatState) -> Result<(), DomainError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(DomainError::storage("storage unavailable"));
        }
        let mut state = state.clone();
        let evicted = state.truncate_to(self.max_chats);
        if evicted > 0 {
            debug!("Dropped {} conversations before saving", evicted);
        }
        *self.state.write().await = state;
        Ok(())
    }
}
