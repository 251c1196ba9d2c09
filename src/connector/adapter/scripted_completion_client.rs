use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use tracing::debug;

use crate::application::CompletionClient;
use crate::domain::{Credential, DomainError, Message};

/// One canned answer of a [`ScriptedCompletionClient`].
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedReply {
    Text(String),
    /// Non-success HTTP status with the given error text.
    Status(u16, String),
    Offline,
    Malformed,
}

impl ScriptedReply {
    fn into_result(self) -> Result<String, DomainError> {
        match self {
            ScriptedReply::Text(text) => Ok(text),
            ScriptedReply::Status(status, message) => Err(DomainError::api(status, message)),
            ScriptedReply::Offline => Err(DomainError::connectivity("network unreachable")),
            ScriptedReply::Malformed => {
                Err(DomainError::malformed("missing choices[0].message.content"))
            }
        }
    }
}

/// Offline [`CompletionClient`] for `--mock-completions` and tests.
///
/// Answers from a queue first; once the queue is empty it echoes the last
/// user message. An optional gate holds every call until
/// [`Self::release`] is called.
#[derive(Default)]
pub struct ScriptedCompletionClient {
    replies: Mutex<VecDeque<ScriptedReply>>,
    calls: AtomicUsize,
    last_history: Mutex<Vec<Message>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedCompletionClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Calls block until released, one permit per call.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Notify::new()));
        self
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn push(&self, reply: ScriptedReply) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// History passed to the most recent call.
    pub fn last_history(&self) -> Vec<Message> {
        self.last_history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }

    fn next_reply(&self, history: &[Message]) -> ScriptedReply {
        let queued = self.replies.lock().ok().and_then(|mut r| r.pop_front());
        queued.unwrap_or_else(|| {
            let last = history
                .iter()
                .rev()
                .find(|m| m.is_user())
                .map(|m| m.content())
                .unwrap_or_default();
            ScriptedReply::Text(format!("Echo: {last}"))
        })
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletionClient {
    async fn complete(
        &self,
        history: &[Message],
        _system_prompt: &str,
        _credential: &Credential,
    ) -> Result<String, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_history.lock() {
            *last = history.to_vec();
        }

        if let Some(gate) = &self.gate {
            debug!("Scripted completion waiting for release");
            gate.notified().await;
        }

        self.next_reply(history).into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    fn key() -> Credential {
        Credential::new("k").unwrap()
    }

    #[tokio::test]
    async fn test_queue_then_echo() {
        let client = ScriptedCompletionClient::with_replies([
            ScriptedReply::Text("Hi!".into()),
            ScriptedReply::Status(429, "Too many requests".into()),
        ]);
        let history = vec![Message::new(Role::User, "Hello", 1)];

        assert_eq!(client.complete(&history, "", &key()).await.unwrap(), "Hi!");
        let err = client.complete(&history, "", &key()).await.unwrap_err();
        assert_eq!(err.api_status(), Some(429));
        assert_eq!(
            client.complete(&history, "", &key()).await.unwrap(),
            "Echo: Hello"
        );
        assert_eq!(client.call_count(), 3);
    }
}
