use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::{CompletionClient, ConnectivityProbe, SessionContext, SessionEvent};
use crate::domain::{
    ConversationRepository, DomainError, FailureKind, Message, MessageDraft, Role, StatusNotice,
};

/// Result of a send that got past validation.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    Replied {
        conversation_id: String,
        user_message: Message,
        reply: Message,
    },
    /// The request failed; `error_message` is the assistant-role explanation
    /// that was recorded in history.
    Failed {
        conversation_id: String,
        user_message: Message,
        error_message: Message,
        kind: FailureKind,
    },
}

impl SendOutcome {
    pub fn conversation_id(&self) -> &str {
        match self {
            SendOutcome::Replied { conversation_id, .. }
            | SendOutcome::Failed { conversation_id, .. } => conversation_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SendOutcome::Replied { .. })
    }
}

/// Coordinates one user-initiated send: `Idle -> Sending -> Idle`.
///
/// At most one send is in flight; a concurrent call is rejected with
/// [`DomainError::SendInProgress`] before it touches any state. Requests are
/// never retried.
pub struct SendMessageUseCase {
    context: Arc<SessionContext>,
    completion: Arc<dyn CompletionClient>,
    connectivity: Arc<dyn ConnectivityProbe>,
    system_prompt: String,
    sending: AtomicBool,
}

impl SendMessageUseCase {
    pub fn new(
        context: Arc<SessionContext>,
        completion: Arc<dyn CompletionClient>,
        connectivity: Arc<dyn ConnectivityProbe>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            context,
            completion,
            connectivity,
            system_prompt: system_prompt.into(),
            sending: AtomicBool::new(false),
        }
    }

    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    /// `Ok` means the user message was recorded together with either the
    /// reply or an error explanation. `Err` usually means the send was
    /// rejected before anything was recorded. The exception is `NotFound`
    /// after the request went out: the conversation was deleted mid-flight,
    /// so the user message was recorded and saved but nothing follows it.
    pub async fn execute(&self, input: &str) -> Result<SendOutcome, DomainError> {
        let events = self.context.events();

        let Some(_in_flight) = InFlightGuard::acquire(&self.sending) else {
            events.notify(StatusNotice::warning(
                "Please wait, a message is already being sent...",
            ));
            return Err(DomainError::SendInProgress);
        };

        let Some(credential) = self.context.credential().await else {
            events.emit(SessionEvent::CredentialRequired);
            events.notify(StatusNotice::error("Error: no API key configured"));
            return Err(DomainError::MissingCredential);
        };

        let max_length = self.context.settings().max_message_length;
        let draft = MessageDraft::new(input, max_length).map_err(|e| {
            let text = match e {
                DomainError::MessageTooLong { max, .. } => {
                    format!("Message is too long (max {} characters)", max)
                }
                _ => "Please enter a message".to_string(),
            };
            events.notify(StatusNotice::error(text));
            e
        })?;

        if !self.connectivity.is_online().await {
            events.notify(StatusNotice::error("No internet connection"));
            return Err(DomainError::connectivity("offline"));
        }

        let (conversation_id, user_message, history) = self.record_user_message(draft).await?;
        self.context.persist().await;

        events.emit(SessionEvent::TypingStarted {
            conversation_id: conversation_id.clone(),
        });
        events.notify(StatusNotice::info("Thinking..."));

        debug!(
            "Requesting completion for {} with {} messages of history",
            conversation_id,
            history.len()
        );
        let result = self
            .completion
            .complete(&history, &self.system_prompt, &credential)
            .await;

        events.emit(SessionEvent::TypingStopped {
            conversation_id: conversation_id.clone(),
        });

        match result {
            Ok(text) => {
                let reply = self
                    .record(&conversation_id, |repo| {
                        repo.append_message(&conversation_id, Role::Assistant, text)
                    })
                    .await?;
                self.context.persist().await;
                info!("Received reply for {}", conversation_id);
                events.notify(StatusNotice::success("Reply received!"));

                Ok(SendOutcome::Replied {
                    conversation_id,
                    user_message,
                    reply,
                })
            }
            Err(error) => {
                let kind = FailureKind::classify(&error);
                warn!("Completion failed for {} ({:?}): {}", conversation_id, kind, error);

                let error_message = self
                    .record(&conversation_id, |repo| {
                        repo.append_error_message(&conversation_id, kind.history_text())
                    })
                    .await?;
                self.context.persist().await;

                if kind.requires_credential() {
                    events.emit(SessionEvent::CredentialRequired);
                }
                events.notify(StatusNotice::error(kind.user_message()));

                Ok(SendOutcome::Failed {
                    conversation_id,
                    user_message,
                    error_message,
                    kind,
                })
            }
        }
    }

    /// Appends the user message to the active conversation and returns the
    /// history to send (synthesized error explanations excluded).
    async fn record_user_message(
        &self,
        draft: MessageDraft,
    ) -> Result<(String, Message, Vec<Message>), DomainError> {
        let (conversation_id, message, history) = {
            let mut repository = self.context.repository().await;
            let conversation_id = repository
                .active_id()
                .map(String::from)
                .ok_or_else(|| DomainError::not_found("No active conversation"))?;
            let message =
                repository.append_message(&conversation_id, Role::User, draft.into_string())?;
            let history: Vec<Message> = repository
                .get(&conversation_id)
                .map(|c| c.messages().iter().filter(|m| !m.is_error()).cloned().collect())
                .unwrap_or_default();
            (conversation_id, message, history)
        };

        let events = self.context.events();
        events.emit(SessionEvent::MessageAppended {
            conversation_id: conversation_id.clone(),
            message: message.clone(),
        });
        events.emit(SessionEvent::ConversationsChanged);

        Ok((conversation_id, message, history))
    }

    /// Runs an append against the repository and announces the new message.
    /// A conversation deleted while the request was in flight yields
    /// `NotFound`.
    async fn record(
        &self,
        conversation_id: &str,
        append: impl FnOnce(&mut ConversationRepository) -> Result<Message, DomainError>,
    ) -> Result<Message, DomainError> {
        let result = {
            let mut repository = self.context.repository().await;
            append(&mut *repository)
        };
        let events = self.context.events();

        match result {
            Ok(message) => {
                events.emit(SessionEvent::MessageAppended {
                    conversation_id: conversation_id.to_string(),
                    message: message.clone(),
                });
                events.emit(SessionEvent::ConversationsChanged);
                Ok(message)
            }
            Err(e) => {
                warn!("Conversation {} vanished during send: {}", conversation_id, e);
                events.notify(StatusNotice::error("The conversation was deleted"));
                Err(e)
            }
        }
    }
}

/// Holds the single-flight flag; dropping it (normal return, early return,
/// panic or cancellation) puts the orchestrator back to idle.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_flight_guard_is_exclusive_and_releases() {
        let flag = AtomicBool::new(false);
        {
            let guard = InFlightGuard::acquire(&flag);
            assert!(guard.is_some());
            assert!(InFlightGuard::acquire(&flag).is_none());
        }
        assert!(!flag.load(Ordering::Acquire));
        assert!(InFlightGuard::acquire(&flag).is_some());
    }
}
