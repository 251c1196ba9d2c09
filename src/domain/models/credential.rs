use std::fmt;

use serde::{Deserialize, Serialize};

/// Bearer token for the completion endpoint. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Returns `None` for blank input.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Where the active credential came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    UserOverride,
    Packaged,
}

/// Explicit override first, packaged default second.
pub fn resolve_credential(
    user_override: Option<Credential>,
    packaged: Option<Credential>,
) -> Option<(Credential, CredentialSource)> {
    user_override
        .map(|c| (c, CredentialSource::UserOverride))
        .or_else(|| packaged.map(|c| (c, CredentialSource::Packaged)))
}
