use async_trait::async_trait;

use crate::domain::{Credential, DomainError, Message};

/// A text-completion endpoint treated as a black box: ordered history in,
/// one assistant reply (or an error) out.
///
/// Implementations perform exactly one request per call and never retry.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        history: &[Message],
        system_prompt: &str,
        credential: &Credential,
    ) -> Result<String, DomainError>;
}
