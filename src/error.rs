//! Library-level error hierarchy.
//!
//! All errors raised by `echomine`'s public operations are variants of
//! [`Error`]. Operating-system errors (file not found, permission denied)
//! are not wrapped here — they surface from [`std::io`] unchanged, per
//! spec §6.

use std::path::PathBuf;

/// Root error type for the echomine library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The export file could not be opened or read.
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The export file's JSON is malformed or truncated.
    #[error("parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    /// A conversation or message record failed model validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The export uses a provider schema version this adapter does not support.
    #[error("unsupported schema version: {0}")]
    SchemaVersion(String),

    /// Detection could not classify the export as a known provider format.
    #[error(
        "unsupported export format: expected an OpenAI export (with a \"mapping\" key) \
         or a Claude export (with a \"chat_messages\" key)"
    )]
    UnsupportedFormat,
}

/// Wraps the underlying JSON syntax/streaming error.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Reader(#[from] struson::reader::ReaderError),
}

/// A single conversation or message failed construction-time validation.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("{field} is required but was missing")]
    MissingField { field: &'static str },

    #[error("timestamp for {field} must be timezone-aware")]
    NaiveTimestamp { field: &'static str },

    #[error("updated_at ({updated_at}) is earlier than created_at ({created_at})")]
    UpdatedBeforeCreated {
        updated_at: String,
        created_at: String,
    },

    #[error("conversation has zero messages")]
    EmptyConversation,

    #[error("image dimension {field} must be >= 1, got {value}")]
    InvalidImageDimension { field: &'static str, value: i64 },

    #[error("{field} must be >= {min}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        value: i64,
    },

    #[error("limit {0} is out of range [1, 1000]")]
    LimitOutOfRange(u32),

    #[error("min_messages ({min}) must be <= max_messages ({max})")]
    MessageRangeInverted { min: u32, max: u32 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Detail attached to a [skip event](crate::provider::SkipEvent) — a
/// non-fatal per-record failure encountered while streaming.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("malformed record: {0}")]
    Malformed(String),
}
