pub mod error;
pub mod filter;
pub mod message;
pub mod valves;

pub use error::PromptPrefixError;
pub use filter::{find_last_user_text, Filter, PrefixFilter, FILTER_NAME};
pub use message::{ContentPart, Message, MessageContent, RequestBody, Role, UserInfo};
pub use valves::{Valves, DEFAULT_PREFIX};
