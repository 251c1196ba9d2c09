use async_trait::async_trait;

use crate::domain::{Credential, DomainError};

/// Persistence for the user-supplied key override, kept apart from the
/// conversation state.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load_override(&self) -> Option<Credential>;

    async fn save_override(&self, credential: &Credential) -> Result<(), DomainError>;

    async fn clear_override(&self) -> Result<(), DomainError>;
}
