use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a conversation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default = "new_message_id")]
    id: String,
    role: Role,
    content: String,
    /// Unix timestamp in milliseconds.
    #[serde(default)]
    timestamp: i64,
    /// Set on assistant messages synthesized from a failed request.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    is_error: bool,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id: new_message_id(),
            role,
            content: content.into(),
            timestamp,
            is_error: false,
        }
    }

    pub fn error_notice(content: impl Into<String>, timestamp: i64) -> Self {
        Self {
            is_error: true,
            ..Self::new(Role::Assistant, content, timestamp)
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

fn new_message_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_notice_is_assistant() {
        let msg = Message::error_notice("boom", 10);
        assert_eq!(msg.role(), Role::Assistant);
        assert!(msg.is_error());
        assert_eq!(msg.timestamp(), 10);
    }

    #[test]
    fn test_legacy_message_without_id_deserializes() {
        let msg: Message = serde_json::from_str(r#"{"role":"user","content":"hi"}"#).unwrap();
        assert_eq!(msg.role(), Role::User);
        assert_eq!(msg.content(), "hi");
        assert!(!msg.id().is_empty());
        assert!(!msg.is_error());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
