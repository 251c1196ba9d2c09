use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::application::CompletionClient;
use crate::domain::{CompletionSettings, Credential, DomainError, Message};

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    stream: bool,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// HTTP client for an OpenAI-style `chat/completions` endpoint.
///
/// Each call sends the system prompt followed by the last
/// `context_window` messages of history, authenticated with a bearer token.
/// One request per call; nothing is retried.
pub struct ChatCompletionsClient {
    client: reqwest::Client,
    settings: CompletionSettings,
}

impl ChatCompletionsClient {
    pub fn new(settings: CompletionSettings) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(settings.timeout_secs))
                .build()
                .unwrap_or_default(),
            settings,
        }
    }

    fn build_request<'a>(&'a self, history: &'a [Message], system_prompt: &'a str) -> ApiRequest<'a> {
        let start = history.len().saturating_sub(self.settings.context_window);
        let mut messages = Vec::with_capacity(history.len() - start + 1);
        messages.push(ApiMessage {
            role: "system",
            content: system_prompt,
        });
        messages.extend(history[start..].iter().map(|m| ApiMessage {
            role: m.role().as_str(),
            content: m.content(),
        }));

        ApiRequest {
            model: &self.settings.model,
            messages,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            top_p: self.settings.top_p,
            stream: false,
        }
    }
}

#[async_trait]
impl CompletionClient for ChatCompletionsClient {
    async fn complete(
        &self,
        history: &[Message],
        system_prompt: &str,
        credential: &Credential,
    ) -> Result<String, DomainError> {
        let request = self.build_request(history, system_prompt);
        debug!(
            "POST {} ({} messages, model {})",
            self.settings.endpoint,
            request.messages.len(),
            self.settings.model
        );

        let response = self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(credential.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::connectivity(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DomainError::connectivity(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            let message = error_message(status.as_u16(), &body);
            warn!("Completion endpoint returned {}: {}", status, message);
            return Err(DomainError::api(status.as_u16(), message));
        }

        let api_response: ApiResponse = serde_json::from_str(&body)
            .map_err(|e| DomainError::malformed(format!("invalid JSON: {e}")))?;

        api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or_else(|| DomainError::malformed("missing choices[0].message.content"))
    }
}

/// Best human-readable description of a failed response: the structured
/// error message or code, then the raw body, then the bare status.
fn error_message(status: u16, body: &str) -> String {
    let fallback = format!("HTTP error! status: {status}");

    match serde_json::from_str::<Value>(body) {
        Ok(json) => {
            let error = json.get("error");
            error
                .and_then(|e| e.get("message"))
                .and_then(non_empty)
                .or_else(|| error.and_then(|e| e.get("code")).and_then(non_empty))
                .or_else(|| error.and_then(non_empty))
                .or_else(|| json.get("message").and_then(non_empty))
                .or_else(|| json.get("detail").and_then(non_empty))
                .unwrap_or(fallback)
        }
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => fallback,
    }
}

fn non_empty(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    fn client(window: usize) -> ChatCompletionsClient {
        ChatCompletionsClient::new(CompletionSettings {
            context_window: window,
            ..CompletionSettings::default()
        })
    }

    #[test]
    fn test_request_keeps_system_prompt_and_recent_window() {
        let history: Vec<Message> = (0..10)
            .map(|i| {
                let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
                Message::new(role, format!("m{i}"), i)
            })
            .collect();
        let client = client(8);

        let request = client.build_request(&history, "be nice");

        assert_eq!(request.messages.len(), 9);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[0].content, "be nice");
        assert_eq!(request.messages[1].content, "m2");
        assert_eq!(request.messages[8].content, "m9");
        assert!(!request.stream);
    }

    #[test]
    fn test_short_history_is_sent_whole() {
        let history = vec![Message::new(Role::User, "Hello", 1)];
        let client = client(8);
        let request = client.build_request(&history, "sys");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[1].role, "user");
    }

    #[test]
    fn test_error_message_precedence() {
        assert_eq!(
            error_message(401, r#"{"error":{"message":"Invalid key","code":"auth"}}"#),
            "Invalid key"
        );
        assert_eq!(error_message(429, r#"{"error":{"code":"rate_limited"}}"#), "rate_limited");
        assert_eq!(error_message(401, r#"{"message":"Unauthorized"}"#), "Unauthorized");
        assert_eq!(error_message(502, "Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message(500, ""), "HTTP error! status: 500");
        assert_eq!(error_message(500, "{}"), "HTTP error! status: 500");
    }
}
