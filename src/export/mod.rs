//! Markdown rendering (spec §4.8).
//!
//! Each conversation renders as an optional YAML front matter block
//! followed by one section per message: a heading naming the role (with an
//! emoji) and an ISO 8601 timestamp, an optional inline-code message id,
//! the message body, and any images as Markdown image references. Messages
//! are separated by a `---` rule.

use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::model::{synthetic_message_id, Conversation, Message, Role};

/// Render `ts` as ISO 8601 with a trailing `Z` (spec §4.8.1), never the
/// `+00:00` offset form `DateTime::to_rfc3339` produces by default.
fn iso8601(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Derive a provider-neutral basename from an image's `asset_pointer`
/// (spec §4.8.3): strip a `scheme://` prefix, if any, and take the final
/// `/`-separated path segment, preserved verbatim (not slugified).
fn image_basename(asset_pointer: &str) -> &str {
    let without_scheme = asset_pointer.split("://").next_back().unwrap_or(asset_pointer);
    without_scheme.rsplit('/').next().unwrap_or(without_scheme)
}

/// Options controlling what [`render`] includes (spec §4.8).
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub front_matter: bool,
    pub message_ids: bool,
    pub exported_by: String,
    /// Tags copied into the front matter verbatim, e.g. from a user's
    /// config-file defaults; empty unless the caller sets them.
    pub tags: Vec<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            front_matter: true,
            message_ids: false,
            exported_by: "echomine".to_string(),
            tags: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct FrontMatter<'a> {
    id: &'a str,
    title: &'a str,
    created_at: String,
    updated_at: Option<String>,
    message_count: usize,
    export_date: String,
    exported_by: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: &'a [String],
}

/// Render `conversation` as Markdown per `options`.
pub fn render(conversation: &Conversation, options: &RenderOptions) -> String {
    let mut out = String::new();

    if options.front_matter {
        let front_matter = FrontMatter {
            id: conversation.id(),
            title: conversation.title(),
            created_at: iso8601(conversation.created_at()),
            updated_at: conversation.updated_at().map(iso8601),
            message_count: conversation.messages().len(),
            export_date: iso8601(Utc::now()),
            exported_by: &options.exported_by,
            tags: &options.tags,
        };
        let yaml = serde_yaml::to_string(&front_matter).unwrap_or_default();
        out.push_str("---\n");
        out.push_str(&yaml);
        out.push_str("---\n\n");
    }

    out.push_str(&format!("# {}\n\n", conversation.title()));

    for (index, message) in conversation.messages().iter().enumerate() {
        if index > 0 {
            out.push_str("---\n\n");
        }
        render_message(&mut out, conversation.id(), message, index, options);
    }

    out
}

fn render_message(
    out: &mut String,
    conversation_id: &str,
    message: &Message,
    index: usize,
    options: &RenderOptions,
) {
    let (emoji, label) = role_heading(message.role());
    let _ = write!(out, "## {emoji} {label}");
    let _ = write!(out, " — {}", iso8601(message.timestamp()));

    if options.message_ids {
        // Adapters always synthesize an id before a `Message` is constructed
        // (it rejects empty ids), but render defensively in case a future
        // in-memory `Message` was built without going through an adapter.
        let id = if message.id().is_empty() {
            synthetic_message_id(conversation_id, index)
        } else {
            message.id().to_string()
        };
        let _ = write!(out, " `{id}`");
    }
    out.push_str("\n\n");
    out.push_str(message.content());
    out.push('\n');

    for image in message.images() {
        let basename = image_basename(image.asset_pointer());
        let _ = writeln!(out, "\n![Image]({basename}.png)");
    }

    out.push('\n');
}

fn role_heading(role: Role) -> (&'static str, &'static str) {
    match role {
        Role::User => ("👤", "User"),
        Role::Assistant => ("🤖", "Assistant"),
        Role::System => ("⚙️", "System"),
    }
}
