use crate::domain::DomainError;

/// Coarse class of a failed send, used only to pick the user-facing text
/// (and, for `Auth`, to ask for a new key).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Auth,
    RateLimit,
    Quota,
    Connectivity,
    MalformedResponse,
    Unknown,
}

impl FailureKind {
    pub fn classify(error: &DomainError) -> Self {
        match error {
            DomainError::MissingCredential => FailureKind::Auth,
            DomainError::Connectivity(_) => FailureKind::Connectivity,
            DomainError::MalformedResponse(_) => FailureKind::MalformedResponse,
            DomainError::Api(api) => Self::classify_api(api.status, &api.message),
            _ => FailureKind::Unknown,
        }
    }

    fn classify_api(status: u16, message: &str) -> Self {
        let message = message.to_lowercase();
        match status {
            401 | 403 => FailureKind::Auth,
            402 => FailureKind::Quota,
            429 if message.contains("quota") => FailureKind::Quota,
            429 => FailureKind::RateLimit,
            _ if message.contains("authentication") || message.contains("unauthorized") => {
                FailureKind::Auth
            }
            _ if message.contains("quota") || message.contains("limit") => FailureKind::Quota,
            _ if message.contains("network") => FailureKind::Connectivity,
            _ => FailureKind::Unknown,
        }
    }

    pub fn requires_credential(&self) -> bool {
        matches!(self, FailureKind::Auth)
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            FailureKind::Auth => "API authorization failed. Check your API key.",
            FailureKind::RateLimit => "Too many requests. Please try again later.",
            FailureKind::Quota => "API usage limit exceeded. Please try again later.",
            FailureKind::Connectivity => "Network problem. Check your internet connection.",
            FailureKind::MalformedResponse | FailureKind::Unknown => {
                "Something went wrong while sending the message."
            }
        }
    }

    /// Text of the assistant message recorded in history for this failure.
    pub fn history_text(&self) -> String {
        format!(
            "Sorry, an error occurred: {} Please try sending your message again.",
            self.user_message()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(FailureKind::classify(&DomainError::api(401, "nope")), FailureKind::Auth);
        assert_eq!(FailureKind::classify(&DomainError::api(403, "x")), FailureKind::Auth);
        assert_eq!(FailureKind::classify(&DomainError::api(429, "slow")), FailureKind::RateLimit);
        assert_eq!(
            FailureKind::classify(&DomainError::api(429, "Monthly quota exceeded")),
            FailureKind::Quota
        );
        assert_eq!(FailureKind::classify(&DomainError::api(500, "oops")), FailureKind::Unknown);
    }

    #[test]
    fn test_message_keywords() {
        assert_eq!(
            FailureKind::classify(&DomainError::api(400, "Authentication required")),
            FailureKind::Auth
        );
        assert_eq!(
            FailureKind::classify(&DomainError::api(400, "token limit reached")),
            FailureKind::Quota
        );
    }

    #[test]
    fn test_non_api_errors() {
        assert_eq!(
            FailureKind::classify(&DomainError::connectivity("refused")),
            FailureKind::Connectivity
        );
        assert_eq!(
            FailureKind::classify(&DomainError::malformed("no choices")),
            FailureKind::MalformedResponse
        );
        assert_eq!(
            FailureKind::classify(&DomainError::internal("?")),
            FailureKind::Unknown
        );
    }

    #[test]
    fn test_history_text_embeds_explanation() {
        let text = FailureKind::Auth.history_text();
        assert!(text.contains("authorization failed"));
        assert!(FailureKind::Auth.requires_credential());
        assert!(!FailureKind::RateLimit.requires_credential());
    }
}
