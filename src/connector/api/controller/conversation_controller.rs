use anyhow::Result;
use chrono::{DateTime, Local, Utc};

use crate::domain::{Conversation, ConversationSummary, DomainError, Message, Role};

use super::super::Container;

pub struct ConversationController<'a> {
    container: &'a Container,
}

impl<'a> ConversationController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn list(&self) -> Result<String> {
        let summaries = self.container.session().conversations().await;
        Ok(format_summaries(&summaries))
    }

    pub async fn show(&self, id: Option<String>) -> Result<String> {
        let session = self.container.session();
        let conversation = match id {
            Some(id) => session.conversation(&id).await,
            None => session.active_conversation().await,
        };
        let conversation =
            conversation.ok_or_else(|| DomainError::not_found("Conversation not found"))?;
        Ok(format_transcript(&conversation))
    }

    pub async fn create(&self) -> Result<String> {
        let conversation = self.container.session().create_conversation().await?;
        Ok(format!("Created conversation {}", conversation.id()))
    }

    pub async fn select(&self, id: String) -> Result<String> {
        let conversation = self.container.session().select_conversation(&id).await?;
        Ok(format_transcript(&conversation))
    }

    pub async fn rename(&self, id: String, title: Vec<String>) -> Result<String> {
        let title = title.join(" ");
        let changed = self
            .container
            .session()
            .rename_conversation(&id, &title)
            .await?;
        if changed {
            Ok(format!("Renamed {}", id))
        } else {
            Ok("Title unchanged.".to_string())
        }
    }

    pub async fn delete(&self, id: String) -> Result<String> {
        self.container.session().delete_conversation(&id).await?;
        Ok("Conversation deleted.".to_string())
    }
}

pub fn format_summaries(summaries: &[ConversationSummary]) -> String {
    if summaries.is_empty() {
        return "No conversations.".to_string();
    }

    let mut output = String::new();
    for summary in summaries {
        let marker = if summary.is_active { '*' } else { ' ' };
        output.push_str(&format!("{} {} ({})\n", marker, summary.title, summary.id));
        output.push_str(&format!(
            "    {} messages, {}\n",
            summary.message_count, summary.age_label
        ));
        output.push_str(&format!("    {}\n", summary.preview));
    }
    output.trim_end().to_string()
}

pub fn format_transcript(conversation: &Conversation) -> String {
    let mut output = format!("== {} ({}) ==\n", conversation.title(), conversation.id());
    if conversation.is_empty() {
        output.push_str("No messages yet.");
        return output;
    }
    let lines: Vec<String> = conversation.messages().iter().map(format_message).collect();
    output.push_str(&lines.join("\n"));
    output
}

pub fn format_message(message: &Message) -> String {
    let time = DateTime::<Utc>::from_timestamp_millis(message.timestamp())
        .map(|t| t.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_default();
    let speaker = match (message.role(), message.is_error()) {
        (Role::User, _) => "You",
        (Role::Assistant, false) => "Assistant",
        (Role::Assistant, true) => "Assistant (error)",
    };
    format!("[{}] {}: {}", time, speaker, message.content())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str, active: bool) -> ConversationSummary {
        ConversationSummary {
            id: id.to_string(),
            title: "New chat".to_string(),
            message_count: 0,
            updated_at: 0,
            age_label: "Just now".to_string(),
            preview: "No messages yet".to_string(),
            is_active: active,
        }
    }

    #[test]
    fn test_active_conversation_is_marked() {
        let output = format_summaries(&[summary("chat_b", true), summary("chat_a", false)]);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "* New chat (chat_b)");
        assert_eq!(lines[3], "  New chat (chat_a)");
    }

    #[test]
    fn test_error_messages_are_labelled() {
        let message = Message::error_notice("Sorry", 0);
        assert!(format_message(&message).ends_with("Assistant (error): Sorry"));
    }
}
