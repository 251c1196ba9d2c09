use std::fmt;

use thiserror::Error;

/// Error returned by the completion endpoint (or synthesized from the HTTP
/// status when the body carries nothing useful).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.message)
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("Message is too long: {length} characters (max {max})")]
    MessageTooLong { length: usize, max: usize },

    #[error("A message is already being sent")]
    SendInProgress,

    #[error("No API key configured")]
    MissingCredential,

    #[error("Connectivity error: {0}")]
    Connectivity(String),

    #[error("API error: {0}")]
    Api(ApiError),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Cannot delete the last remaining conversation")]
    LastConversation,

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api(ApiError::new(status, message))
    }

    pub fn connectivity(msg: impl Into<String>) -> Self {
        Self::Connectivity(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::StorageError(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyMessage | Self::MessageTooLong { .. })
    }

    pub fn is_storage_error(&self) -> bool {
        matches!(self, Self::StorageError(_) | Self::IoError(_))
    }

    pub fn api_status(&self) -> Option<u16> {
        match self {
            Self::Api(err) => Some(err.status),
            _ => None,
        }
    }
}
