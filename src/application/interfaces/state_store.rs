use async_trait::async_trait;

use crate::domain::{ChatState, DomainError};

/// Durable, device-local storage of the whole conversation collection.
///
/// `load` never fails: missing or unreadable data comes back as an empty
/// state (and is logged by the implementation). `save` must not leave a
/// partially written record behind when it fails.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self) -> ChatState;

    async fn save(&self, state: &ChatState) -> Result<(), DomainError>;
}
