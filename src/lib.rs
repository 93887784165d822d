//! # echomine
//!
//! Stream, search, and render exported AI chat transcripts to Markdown.
//!
//! `echomine` ingests the export formats produced by OpenAI ChatGPT
//! ("Export data") and Anthropic Claude ("Export data"), each a single JSON
//! file holding an array of conversations. It normalizes both into one
//! provider-agnostic model, offers BM25 full-text search across a whole
//! export, and renders individual conversations to Markdown with optional
//! YAML front matter.
//!
//! Every operation streams: a conversation is read, normalized, and (for
//! search) scored one at a time, so memory use stays bounded independent of
//! export size.
//!
//! ## Architecture
//!
//! - [`tokenizer`] — lowercase, Unicode-aware word splitting shared by
//!   search and ranking.
//! - [`model`] — the normalized, immutable [`Conversation`]/[`Message`]
//!   model and the [`SearchQuery`]/[`SearchResult`] search contract.
//! - [`provider`] — format detection and the OpenAI/Claude streaming
//!   adapters.
//! - [`search`] — BM25 ranking, the candidate filter pipeline, and snippet
//!   extraction.
//! - [`export`] — Markdown + YAML front matter rendering.
//! - [`config`] — CLI config-file loading.
//! - [`logging`] — structured logging initialization.
//! - [`error`] — the library's error hierarchy.

pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod model;
pub mod provider;
pub mod search;
pub mod tokenizer;

pub use error::{Error, Result, ValidationError};
pub use model::{Conversation, ImageRef, MatchMode, Message, Role, SearchQuery, SearchQueryBuilder, SearchResult, SortBy, SortOrder};
pub use provider::{Adapter, ProviderKind};
