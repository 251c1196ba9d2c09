use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::{Message, StatusNotice};

const DEFAULT_CAPACITY: usize = 256;

/// Everything a presentation layer needs to observe to render the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Bootstrap finished; `active_id` is the conversation to show.
    Ready { active_id: String },
    StatusChanged(StatusNotice),
    MessageAppended {
        conversation_id: String,
        message: Message,
    },
    TypingStarted { conversation_id: String },
    TypingStopped { conversation_id: String },
    /// The list (titles, order, membership) changed.
    ConversationsChanged,
    ActiveConversationChanged { id: String },
    /// The key is missing or was rejected; the UI should ask for a new one.
    CredentialRequired,
}

/// Fan-out of [`SessionEvent`]s. Emitting never blocks; subscribers that
/// fall behind lose the oldest events.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: SessionEvent) {
        if self.sender.send(event).is_err() {
            debug!("No event subscribers");
        }
    }

    pub fn notify(&self, notice: StatusNotice) {
        self.emit(SessionEvent::StatusChanged(notice));
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
