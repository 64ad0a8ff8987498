use serde::{Deserialize, Serialize};

use crate::error::PromptPrefixError;

pub const DEFAULT_PREFIX: &str = "Crie um poema de uma estrofe de ";

/// Filter configuration. Missing keys fall back to their defaults, so `{}`
/// is a valid valves document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Valves {
    /// Text placed in front of the last user message.
    pub prefix: String,
}

impl Default for Valves {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl Valves {
    pub fn from_json(raw: &str) -> Result<Self, PromptPrefixError> {
        serde_json::from_str(raw).map_err(|e| PromptPrefixError::InvalidValves(e.to_string()))
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Join the trimmed prefix and `text` with a single space.
    pub fn prefixed(&self, text: &str) -> String {
        format!("{} {}", self.prefix.trim(), text)
    }
}
