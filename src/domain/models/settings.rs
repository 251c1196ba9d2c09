use serde::{Deserialize, Serialize};

use super::Credential;

pub const DEFAULT_ENDPOINT: &str = "https://api.mistral.ai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "mistral-small";
pub const DEFAULT_MAX_CHATS: usize = 15;
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 1000;
pub const DEFAULT_CONTEXT_WINDOW: usize = 8;

const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a friendly, patient study helper for young schoolchildren.

Rules:
1. Always write grammatically correct, simple sentences.
2. Explain difficult topics in plain language, step by step.
3. Do not hand out finished homework answers; explain how to get there.
4. Encourage curiosity and questions.
5. Use one or two emoji per reply.";

/// Parameters of the outbound completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    /// Number of most recent messages sent as context.
    pub context_window: usize,
    pub timeout_secs: u64,
    pub system_prompt: String,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 800,
            temperature: 0.3,
            top_p: 0.9,
            context_window: DEFAULT_CONTEXT_WINDOW,
            timeout_secs: 60,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub max_chats: usize,
    pub max_message_length: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_chats: DEFAULT_MAX_CHATS,
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub completion: CompletionSettings,
    pub session: SessionSettings,
    /// Key shipped with the installation; a user override takes precedence.
    pub packaged_api_key: Option<String>,
}

impl Settings {
    pub fn packaged_credential(&self) -> Option<Credential> {
        self.packaged_api_key.clone().and_then(Credential::new)
    }

    /// Applies `CHATDESK_ENDPOINT` and `CHATDESK_MODEL` when set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(endpoint) = std::env::var("CHATDESK_ENDPOINT") {
            self.completion.endpoint = endpoint;
        }
        if let Ok(model) = std::env::var("CHATDESK_MODEL") {
            self.completion.model = model;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"session": {"max_chats": 3}, "completion": {"model": "m"}}"#)
                .unwrap();

        assert_eq!(settings.session.max_chats, 3);
        assert_eq!(settings.session.max_message_length, DEFAULT_MAX_MESSAGE_LENGTH);
        assert_eq!(settings.completion.model, "m");
        assert_eq!(settings.completion.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.completion.context_window, DEFAULT_CONTEXT_WINDOW);
        assert!(settings.packaged_credential().is_none());
    }

    #[test]
    fn test_blank_packaged_key_is_absent() {
        let settings = Settings {
            packaged_api_key: Some("  ".to_string()),
            ..Settings::default()
        };
        assert!(settings.packaged_credential().is_none());
    }
}
