use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Message, Role};

pub const DEFAULT_TITLE: &str = "New chat";
pub const MAX_TITLE_CHARS: usize = 50;
/// Visible characters kept when a title is derived from the first message.
pub const DERIVED_TITLE_CHARS: usize = 20;
const PREVIEW_CHARS: usize = 30;
const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    id: String,
    #[serde(default = "default_title")]
    title: String,
    #[serde(default)]
    messages: Vec<Message>,
    /// Unix timestamp in milliseconds.
    #[serde(default)]
    created_at: i64,
    /// Unix timestamp in milliseconds.
    #[serde(default)]
    updated_at: i64,
    /// An explicit rename stops title derivation from the first message.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    renamed: bool,
}

impl Conversation {
    pub fn new(id: impl Into<String>, now: i64) -> Self {
        Self {
            id: id.into(),
            title: default_title(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
            renamed: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn updated_at(&self) -> i64 {
        self.updated_at
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub(crate) fn push(&mut self, message: Message) {
        let first_user_message = self.messages.is_empty() && message.role() == Role::User;
        if first_user_message && !self.renamed {
            self.title = derive_title(message.content());
        }
        self.updated_at = self.updated_at.max(message.timestamp());
        self.messages.push(message);
    }

    /// Returns `false` when the clamped title equals the current one.
    pub(crate) fn rename(&mut self, title: &str, now: i64) -> bool {
        let clamped = clamp_title(title);
        if clamped == self.title {
            return false;
        }
        self.title = clamped;
        self.renamed = true;
        self.updated_at = now;
        true
    }

    pub fn summary(&self, now: i64, is_active: bool) -> ConversationSummary {
        ConversationSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            message_count: self.messages.len(),
            updated_at: self.updated_at,
            age_label: relative_age(self.updated_at, now),
            preview: self.preview(),
            is_active,
        }
    }

    fn preview(&self) -> String {
        match self.messages.last() {
            None => "No messages yet".to_string(),
            Some(last) => {
                let speaker = match last.role() {
                    Role::User => "You",
                    Role::Assistant => "Assistant",
                };
                let head: String = last.content().chars().take(PREVIEW_CHARS).collect();
                format!("{speaker}: {head}{ELLIPSIS}")
            }
        }
    }
}

/// Row shown in a conversation list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    pub message_count: usize,
    pub updated_at: i64,
    pub age_label: String,
    pub preview: String,
    pub is_active: bool,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

pub fn derive_title(first_message: &str) -> String {
    let single_line = first_message.trim().replace(['\r', '\n'], " ");
    if single_line.chars().count() > DERIVED_TITLE_CHARS {
        let head: String = single_line.chars().take(DERIVED_TITLE_CHARS).collect();
        format!("{head}{ELLIPSIS}")
    } else {
        single_line
    }
}

pub fn clamp_title(title: &str) -> String {
    title.chars().take(MAX_TITLE_CHARS).collect()
}

/// Human-friendly age of a timestamp relative to `now` (both in ms).
pub fn relative_age(timestamp: i64, now: i64) -> String {
    let minutes = now.saturating_sub(timestamp).max(0) / 60_000;
    let hours = minutes / 60;
    let days = hours / 24;

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{minutes} min ago")
    } else if hours < 24 {
        format!("{hours} h ago")
    } else if days == 1 {
        "Yesterday".to_string()
    } else if days < 7 {
        format!("{days} days ago")
    } else {
        DateTime::<Utc>::from_timestamp_millis(timestamp)
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}
