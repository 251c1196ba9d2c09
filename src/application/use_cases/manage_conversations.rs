use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::application::{SessionContext, SessionEvent};
use crate::domain::{Conversation, ConversationSummary, DomainError, StatusNotice};

/// Create, delete, rename and select conversations.
pub struct ManageConversationsUseCase {
    context: Arc<SessionContext>,
}

impl ManageConversationsUseCase {
    pub fn new(context: Arc<SessionContext>) -> Self {
        Self { context }
    }

    pub async fn create(&self) -> Result<Conversation, DomainError> {
        let events = self.context.events();
        let (conversation, evicted, max_chats) = {
            let mut repository = self.context.repository().await;
            let conversation = repository.create_conversation()?;
            let evicted = repository.enforce_retention();
            (conversation, evicted, repository.max_chats())
        };

        info!("Created conversation {}", conversation.id());
        self.context.persist().await;

        events.emit(SessionEvent::ConversationsChanged);
        events.emit(SessionEvent::ActiveConversationChanged {
            id: conversation.id().to_string(),
        });
        if evicted > 0 {
            events.notify(StatusNotice::info(format!(
                "Removed {} old conversation(s), keeping the latest {}",
                evicted, max_chats
            )));
        }
        events.notify(StatusNotice::success("New chat created!"));

        Ok(conversation)
    }

    pub async fn delete(&self, id: &str) -> Result<(), DomainError> {
        let events = self.context.events();
        let result = {
            let mut repository = self.context.repository().await;
            let deleted = repository.delete_conversation(id);
            let active_id = repository.active_id().map(String::from);
            deleted.map(|_| active_id)
        };

        match result {
            Ok(active_id) => {
                info!("Deleted conversation {}", id);
                self.context.persist().await;
                events.emit(SessionEvent::ConversationsChanged);
                if let Some(active_id) = active_id {
                    events.emit(SessionEvent::ActiveConversationChanged { id: active_id });
                }
                events.notify(StatusNotice::success("Chat deleted!"));
                Ok(())
            }
            Err(e) => {
                warn!("Could not delete conversation {}: {}", id, e);
                Err(self.report(e))
            }
        }
    }

    /// Returns `Ok(false)` without touching storage when the title is
    /// unchanged.
    pub async fn rename(&self, id: &str, title: &str) -> Result<bool, DomainError> {
        let changed = self
            .context
            .repository()
            .await
            .rename_conversation(id, title)
            .map_err(|e| self.report(e))?;
        if changed {
            self.context.persist().await;
            self.context.events().emit(SessionEvent::ConversationsChanged);
        }
        Ok(changed)
    }

    pub async fn select(&self, id: &str) -> Result<Conversation, DomainError> {
        let conversation = {
            let mut repository = self.context.repository().await;
            repository.select(id).map_err(|e| self.report(e))?;
            repository.active().cloned()
        };
        let conversation = conversation
            .ok_or_else(|| DomainError::not_found(format!("Conversation not found: {}", id)))?;

        self.context.persist().await;
        let events = self.context.events();
        events.emit(SessionEvent::ActiveConversationChanged { id: id.to_string() });
        events.notify(StatusNotice::success("Chat loaded"));

        Ok(conversation)
    }

    pub async fn list(&self) -> Vec<ConversationSummary> {
        let now = Utc::now().timestamp_millis();
        self.context.repository().await.summaries(now)
    }

    pub async fn active(&self) -> Option<Conversation> {
        self.context.repository().await.active().cloned()
    }

    pub async fn get(&self, id: &str) -> Option<Conversation> {
        self.context.repository().await.get(id).cloned()
    }

    fn report(&self, error: DomainError) -> DomainError {
        let text = match error {
            DomainError::LastConversation => "You can't delete the only chat!".to_string(),
            _ => error.to_string(),
        };
        self.context.events().notify(StatusNotice::error(text));
        error
    }
}
