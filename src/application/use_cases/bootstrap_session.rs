use std::sync::Arc;

use tracing::{info, warn};

use crate::application::{CredentialStore, EventBus, SessionContext, SessionEvent, StateStore};
use crate::domain::{
    resolve_credential, ConversationRepository, Credential, DomainError, SessionSettings,
    StatusNotice,
};

/// Start-up sequencing: credential, persisted state, default conversation,
/// active selection, readiness signal.
pub struct BootstrapSessionUseCase {
    store: Arc<dyn StateStore>,
    credentials: Arc<dyn CredentialStore>,
    packaged_credential: Option<Credential>,
    settings: SessionSettings,
}

impl BootstrapSessionUseCase {
    pub fn new(
        store: Arc<dyn StateStore>,
        credentials: Arc<dyn CredentialStore>,
        packaged_credential: Option<Credential>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            store,
            credentials,
            packaged_credential,
            settings,
        }
    }

    pub async fn execute(&self, events: EventBus) -> Result<Arc<SessionContext>, DomainError> {
        let user_override = self.credentials.load_override().await;
        let credential = match resolve_credential(user_override, self.packaged_credential.clone())
        {
            Some((credential, source)) => {
                info!("Using API key from {:?}", source);
                Some(credential)
            }
            None => {
                warn!("No API key configured; sending is disabled until one is set");
                None
            }
        };

        let state = self.store.load().await;
        info!("Loaded {} conversations", state.len());

        let mut repository = ConversationRepository::from_state(state, self.settings.max_chats);
        let mut dirty = false;

        let evicted = repository.enforce_retention();
        if evicted > 0 {
            info!("Dropped {} conversations over the retention limit", evicted);
            dirty = true;
        }

        if repository.is_empty() {
            repository.create_conversation()?;
            dirty = true;
        }

        let active_id = repository
            .active_id()
            .map(String::from)
            .ok_or_else(|| DomainError::internal("No active conversation after bootstrap"))?;

        let has_credential = credential.is_some();
        let context = Arc::new(SessionContext::new(
            repository,
            self.store.clone(),
            credential,
            events,
            self.settings.clone(),
        ));

        if dirty {
            context.persist().await;
        }

        if !has_credential {
            context.events().emit(SessionEvent::CredentialRequired);
            context
                .events()
                .notify(StatusNotice::warning("No API key configured"));
        }

        info!("Session ready, active conversation {}", active_id);
        context.events().emit(SessionEvent::Ready { active_id });

        Ok(context)
    }
}
