use std::sync::Arc;

use tokio::sync::broadcast;

use crate::application::{
    BootstrapSessionUseCase, CompletionClient, ConnectivityProbe, CredentialStore, EventBus,
    ManageConversationsUseCase, ManageCredentialUseCase, SendMessageUseCase, SendOutcome,
    SessionContext, SessionEvent, StateStore,
};
use crate::domain::{Conversation, ConversationSummary, DomainError, Settings};

/// Adapters a session runs on.
#[derive(Clone)]
pub struct SessionServices {
    pub store: Arc<dyn StateStore>,
    pub completion: Arc<dyn CompletionClient>,
    pub credentials: Arc<dyn CredentialStore>,
    pub connectivity: Arc<dyn ConnectivityProbe>,
}

/// One running chat session: the entry point a front end talks to.
pub struct ChatSession {
    context: Arc<SessionContext>,
    conversations: ManageConversationsUseCase,
    sender: SendMessageUseCase,
    credential: ManageCredentialUseCase,
}

impl ChatSession {
    /// Bootstraps from storage. Subscribe to `events` beforehand to observe
    /// the `Ready` signal.
    pub async fn start(
        services: SessionServices,
        settings: &Settings,
        events: EventBus,
    ) -> Result<Self, DomainError> {
        let packaged = settings.packaged_credential();
        let bootstrap = BootstrapSessionUseCase::new(
            services.store.clone(),
            services.credentials.clone(),
            packaged.clone(),
            settings.session.clone(),
        );
        let context = bootstrap.execute(events).await?;

        Ok(Self {
            conversations: ManageConversationsUseCase::new(context.clone()),
            sender: SendMessageUseCase::new(
                context.clone(),
                services.completion,
                services.connectivity,
                settings.completion.system_prompt.clone(),
            ),
            credential: ManageCredentialUseCase::new(
                context.clone(),
                services.credentials,
                packaged,
            ),
            context,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.context.events().subscribe()
    }

    pub async fn send(&self, text: &str) -> Result<SendOutcome, DomainError> {
        self.sender.execute(text).await
    }

    pub fn is_sending(&self) -> bool {
        self.sender.is_sending()
    }

    pub async fn create_conversation(&self) -> Result<Conversation, DomainError> {
        self.conversations.create().await
    }

    pub async fn delete_conversation(&self, id: &str) -> Result<(), DomainError> {
        self.conversations.delete(id).await
    }

    pub async fn rename_conversation(&self, id: &str, title: &str) -> Result<bool, DomainError> {
        self.conversations.rename(id, title).await
    }

    pub async fn select_conversation(&self, id: &str) -> Result<Conversation, DomainError> {
        self.conversations.select(id).await
    }

    /// Summaries, most recently updated first.
    pub async fn conversations(&self) -> Vec<ConversationSummary> {
        self.conversations.list().await
    }

    pub async fn active_conversation(&self) -> Option<Conversation> {
        self.conversations.active().await
    }

    pub async fn conversation(&self, id: &str) -> Option<Conversation> {
        self.conversations.get(id).await
    }

    pub async fn set_credential(&self, token: &str) -> Result<(), DomainError> {
        self.credential.set(token).await
    }

    pub async fn clear_credential(&self) -> Result<bool, DomainError> {
        self.credential.clear().await
    }

    pub async fn has_credential(&self) -> bool {
        self.credential.is_configured().await
    }

    pub fn max_message_length(&self) -> usize {
        self.context.settings().max_message_length
    }
}
