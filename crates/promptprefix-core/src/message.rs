use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PromptPrefixError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
    Developer,
    /// Any role this crate has no special handling for. Kept verbatim.
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
            Role::Developer => "developer",
            Role::Other(s) => s.as_str(),
        }
    }

    pub fn parse_str(s: &str) -> Self {
        match s {
            "system" => Role::System,
            "user" => Role::User,
            "assistant" => Role::Assistant,
            "tool" => Role::Tool,
            "developer" => Role::Developer,
            other => Role::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Role::parse_str(&s)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

/// One unit of structured message content.
///
/// Only `text` parts are interpreted. Every other part type (images, audio,
/// files) is carried through as the raw JSON object it arrived as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub enum ContentPart {
    Text {
        text: String,
        /// Keys other than `type` and `text`, e.g. `cache_control`.
        extra: Map<String, Value>,
    },
    Other(Map<String, Value>),
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text {
            text: text.into(),
            extra: Map::new(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text { text, .. } => Some(text.as_str()),
            ContentPart::Other(_) => None,
        }
    }
}

impl TryFrom<Map<String, Value>> for ContentPart {
    type Error = String;

    fn try_from(mut map: Map<String, Value>) -> Result<Self, Self::Error> {
        match map.get("type").and_then(Value::as_str) {
            Some("text") => {
                let text = match map.remove("text") {
                    Some(Value::String(s)) => s,
                    Some(_) => return Err("text part has a non-string `text` field".into()),
                    None => return Err("text part is missing its `text` field".into()),
                };
                map.remove("type");
                Ok(ContentPart::Text { text, extra: map })
            }
            Some(_) => Ok(ContentPart::Other(map)),
            None => Err("content part is missing a string `type` field".into()),
        }
    }
}

impl From<ContentPart> for Map<String, Value> {
    fn from(part: ContentPart) -> Self {
        match part {
            ContentPart::Text { text, extra } => {
                let mut map = Map::new();
                map.insert("type".into(), Value::String("text".into()));
                map.insert("text".into(), Value::String(text));
                map.extend(extra);
                map
            }
            ContentPart::Other(map) => map,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// The plain text, or the text of the first `text` part.
    pub fn first_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(s) => Some(s.as_str()),
            MessageContent::Parts(parts) => parts.iter().find_map(ContentPart::as_text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    pub fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: MessageContent::Text(content.into()),
            extra: Map::new(),
        }
    }

    pub fn parts(role: Role, parts: Vec<ContentPart>) -> Self {
        Self {
            role,
            content: MessageContent::Parts(parts),
            extra: Map::new(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// An inbound request: the conversation plus whatever else the caller sent
/// alongside it (`model`, `stream`, ...), preserved as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    pub messages: Vec<Message>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RequestBody {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            extra: Map::new(),
        }
    }

    pub fn from_value(value: Value) -> Result<Self, PromptPrefixError> {
        serde_json::from_value(value).map_err(|e| PromptPrefixError::InvalidBody(e.to_string()))
    }
}

/// Identity of the caller on whose behalf a hook runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
