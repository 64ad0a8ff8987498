use serde_json::value::RawValue;
use serde_json::Value;
use tracing::debug;

use crate::error::PromptPrefixError;
use crate::message::{Message, MessageContent, RequestBody, UserInfo};
use crate::valves::Valves;

pub const FILTER_NAME: &str = "Prefix of X";

/// A pair of hooks wrapped around a downstream chat consumer.
///
/// `inlet` sees the request before it is forwarded; `outlet` sees the
/// response on its way back. Implementations hold no per-call state.
pub trait Filter: Send + Sync {
    /// Human-readable filter name for logging and listings.
    fn name(&self) -> &str;

    /// Rewrite an inbound request before it reaches the consumer.
    fn inlet(&self, body: RequestBody, user: Option<&UserInfo>) -> RequestBody;

    /// Inspect or rewrite a response on its way back to the caller.
    fn outlet(&self, body: Value, user: Option<&UserInfo>) -> Value;
}

/// Text of the most recent user message.
///
/// Only the last `user` message is considered: plain content is returned
/// as-is, structured content yields its first `text` part. Returns `None`
/// when there is no user message or that message has no text part.
pub fn find_last_user_text(messages: &[Message]) -> Option<&str> {
    messages
        .iter()
        .rev()
        .find(|m| m.is_user())
        .and_then(|m| m.content.first_text())
}

/// Prepends the configured prefix to the last user message.
#[derive(Debug, Clone, Default)]
pub struct PrefixFilter {
    valves: Valves,
}

impl PrefixFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_valves(valves: Valves) -> Self {
        Self { valves }
    }

    pub fn valves(&self) -> &Valves {
        &self.valves
    }

    /// `inlet` over raw JSON. The body is validated before the rewrite.
    ///
    /// Only the content of the rewritten message is replaced; every other
    /// key, number and key order in `body` comes back as it went in.
    pub fn inlet_json(
        &self,
        mut body: Value,
        user: Option<&UserInfo>,
    ) -> Result<Value, PromptPrefixError> {
        let typed = RequestBody::from_value(body.clone())?;
        let rewritten = self.inlet(typed, user);

        let last_user = rewritten
            .messages
            .iter()
            .enumerate()
            .rev()
            .find(|(_, m)| m.is_user());
        if let Some((idx, MessageContent::Text(text))) = last_user.map(|(i, m)| (i, &m.content)) {
            if let Some(slot) = body
                .get_mut("messages")
                .and_then(|m| m.get_mut(idx))
                .and_then(|m| m.get_mut("content"))
            {
                *slot = Value::String(text.clone());
            }
        }
        Ok(body)
    }

    /// `outlet` over unparsed JSON text, returned byte for byte.
    pub fn outlet_raw<'a>(&self, body: &'a RawValue, _user: Option<&UserInfo>) -> &'a RawValue {
        body
    }
}

impl Filter for PrefixFilter {
    fn name(&self) -> &str {
        FILTER_NAME
    }

    fn inlet(&self, mut body: RequestBody, user: Option<&UserInfo>) -> RequestBody {
        let user_id = user.and_then(|u| u.id.as_deref()).unwrap_or("-");

        let updated = match find_last_user_text(&body.messages) {
            Some(text) => self.valves.prefixed(text),
            None => {
                debug!(
                    messages = body.messages.len(),
                    user = user_id,
                    "no user text to prefix, passing body through"
                );
                return body;
            }
        };

        if let Some(message) = body.messages.iter_mut().rev().find(|m| m.is_user()) {
            message.content = MessageContent::Text(updated);
        }

        debug!(
            messages = body.messages.len(),
            user = user_id,
            "prefixed last user message"
        );
        body
    }

    fn outlet(&self, body: Value, _user: Option<&UserInfo>) -> Value {
        body
    }
}
