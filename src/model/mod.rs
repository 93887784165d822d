//! Provider-agnostic conversation model (spec §3).

pub mod conversation;
pub mod message;
pub mod query;

pub use conversation::Conversation;
pub use message::{synthetic_message_id, ImageRef, Message, Role};
pub use query::{MatchMode, SearchQuery, SearchQueryBuilder, SearchResult, SortBy, SortOrder};
