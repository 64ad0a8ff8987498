use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptPrefixError {
    #[error("invalid body: {0}")]
    InvalidBody(String),

    #[error("invalid valves: {0}")]
    InvalidValves(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
