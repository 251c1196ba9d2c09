use crate::domain::DomainError;

/// Fraction of the maximum length at which the input counter warns.
const NEAR_LIMIT_RATIO: f64 = 0.9;

/// User input that passed validation: trimmed, non-empty and within the
/// length limit (counted in characters).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    text: String,
}

impl MessageDraft {
    pub fn new(raw: &str, max_length: usize) -> Result<Self, DomainError> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(DomainError::EmptyMessage);
        }

        let length = text.chars().count();
        if length > max_length {
            return Err(DomainError::MessageTooLong {
                length,
                max: max_length,
            });
        }

        Ok(Self {
            text: text.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

/// Character counter shown under the input box, e.g. `"42/1000"`.
pub fn counter_label(input: &str, max_length: usize) -> String {
    format!("{}/{}", input.chars().count(), max_length)
}

pub fn is_near_limit(input: &str, max_length: usize) -> bool {
    input.chars().count() as f64 > max_length as f64 * NEAR_LIMIT_RATIO
}

/// Clamps pasted text to `max_length` characters. The flag reports whether
/// anything was cut.
pub fn clamp_pasted(text: &str, max_length: usize) -> (String, bool) {
    if text.chars().count() <= max_length {
        (text.to_string(), false)
    } else {
        (text.chars().take(max_length).collect(), true)
    }
}
