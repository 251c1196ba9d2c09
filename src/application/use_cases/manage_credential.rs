use std::sync::Arc;

use tracing::{info, warn};

use crate::application::{CredentialStore, SessionContext};
use crate::domain::{Credential, DomainError, StatusNotice};

/// Credential re-entry: store a user override or fall back to the packaged
/// default.
pub struct ManageCredentialUseCase {
    context: Arc<SessionContext>,
    store: Arc<dyn CredentialStore>,
    packaged: Option<Credential>,
}

impl ManageCredentialUseCase {
    pub fn new(
        context: Arc<SessionContext>,
        store: Arc<dyn CredentialStore>,
        packaged: Option<Credential>,
    ) -> Self {
        Self {
            context,
            store,
            packaged,
        }
    }

    /// The key is active for this session even if persisting it fails.
    pub async fn set(&self, token: &str) -> Result<(), DomainError> {
        let Some(credential) = Credential::new(token) else {
            self.context
                .events()
                .notify(StatusNotice::error("The API key is empty"));
            return Err(DomainError::MissingCredential);
        };

        if let Err(e) = self.store.save_override(&credential).await {
            warn!("Failed to store API key override: {}", e);
            self.context
                .events()
                .notify(StatusNotice::warning("API key set for this session only"));
        }

        self.context.set_credential(Some(credential)).await;
        info!("API key override set");
        self.context
            .events()
            .notify(StatusNotice::success("API key saved"));
        Ok(())
    }

    /// Removes the override. Returns whether a (packaged) key is still
    /// available.
    pub async fn clear(&self) -> Result<bool, DomainError> {
        self.store.clear_override().await?;
        self.context.set_credential(self.packaged.clone()).await;
        info!("API key override cleared");
        Ok(self.packaged.is_some())
    }

    pub async fn is_configured(&self) -> bool {
        self.context.credential().await.is_some()
    }
}
