//! OpenAI ChatGPT export adapter (spec §4.1, §4.4, §6).
//!
//! Each exported conversation stores its messages as a `mapping` of node id
//! to `{message, parent, children}`, a tree of edit branches. `current_node`
//! names the tip of the branch the export considers "current"; normalization
//! walks `current_node` back to the root via `parent` links, then emits in
//! root-to-leaf order. Nodes without a `message` (for example a synthetic
//! system root) are skipped but still traversed for their parent link.

use std::collections::HashMap;
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use struson::reader::JsonStreamReader;

use crate::error::{Error, ParseError, SkipReason, ValidationError};
use crate::model::{Conversation, ImageRef, Message, Role};

use super::parse_err;

#[derive(Debug, Deserialize)]
struct RawConversation {
    id: String,
    #[serde(default)]
    title: Option<String>,
    create_time: Option<f64>,
    update_time: Option<f64>,
    #[serde(default)]
    mapping: HashMap<String, RawNode>,
    current_node: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(default)]
    parent: Option<String>,
    message: Option<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    id: String,
    author: RawAuthor,
    content: RawContent,
    create_time: Option<f64>,
    #[serde(default)]
    metadata: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawAuthor {
    role: String,
}

#[derive(Debug, Deserialize)]
struct RawContent {
    #[serde(default)]
    parts: Vec<RawPart>,
}

#[derive(Debug)]
enum RawPart {
    Text(String),
    Image {
        asset_pointer: String,
        size_bytes: Option<u64>,
        width: Option<u32>,
        height: Option<u32>,
        metadata: HashMap<String, serde_json::Value>,
    },
    Other,
}

impl<'de> Deserialize<'de> for RawPart {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::String(s) => Ok(RawPart::Text(s)),
            serde_json::Value::Object(map) => {
                let content_type = map.get("content_type").and_then(|v| v.as_str());
                if content_type == Some("image_asset_pointer") {
                    let asset_pointer = map
                        .get("asset_pointer")
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string();
                    let size_bytes = map.get("size_bytes").and_then(|v| v.as_u64());
                    let width = map
                        .get("width")
                        .and_then(|v| v.as_f64())
                        .map(|w| w as u32);
                    let height = map
                        .get("height")
                        .and_then(|v| v.as_f64())
                        .map(|h| h as u32);
                    let metadata = map
                        .get("metadata")
                        .and_then(|v| v.as_object())
                        .map(|m| m.clone().into_iter().collect())
                        .unwrap_or_default();
                    Ok(RawPart::Image {
                        asset_pointer,
                        size_bytes,
                        width,
                        height,
                        metadata,
                    })
                } else {
                    Ok(RawPart::Other)
                }
            }
            _ => Ok(RawPart::Other),
        }
    }
}

fn posix_timestamp(secs: f64) -> Option<DateTime<Utc>> {
    let whole = secs.trunc() as i64;
    let nanos = ((secs.fract()) * 1_000_000_000.0).round() as u32;
    DateTime::from_timestamp(whole, nanos)
}

impl RawConversation {
    /// Follow `current_node` back to the root via `parent` links, then
    /// return node ids in root-to-leaf order.
    fn linear_node_order(&self) -> Result<Vec<String>, ValidationError> {
        let Some(current) = &self.current_node else {
            return Err(ValidationError::MissingField {
                field: "current_node",
            });
        };
        let mut chain = Vec::new();
        let mut cursor = Some(current.clone());
        let mut visited = std::collections::HashSet::new();
        while let Some(id) = cursor {
            if !visited.insert(id.clone()) {
                break; // cycle guard; malformed exports should not hang us
            }
            let Some(node) = self.mapping.get(&id) else {
                break;
            };
            chain.push(id.clone());
            cursor = node.parent.clone();
        }
        chain.reverse();
        Ok(chain)
    }

    fn normalize(self) -> Result<Conversation, ValidationError> {
        let created_at = self
            .create_time
            .and_then(posix_timestamp)
            .ok_or(ValidationError::MissingField {
                field: "create_time",
            })?;
        let updated_at = match self.update_time {
            Some(t) => Some(
                posix_timestamp(t).ok_or(ValidationError::NaiveTimestamp {
                    field: "update_time",
                })?,
            ),
            None => None,
        };

        let order = self.linear_node_order()?;
        let mut messages = Vec::with_capacity(order.len());
        for (position, id) in order.iter().enumerate() {
            let Some(node) = self.mapping.get(id) else {
                continue;
            };
            let Some(raw_msg) = &node.message else {
                continue;
            };
            if raw_msg.content.parts.is_empty() && raw_msg.author.role == "system" {
                continue;
            }

            let (role, _) = Role::normalize(&raw_msg.author.role);
            let mut content = String::new();
            let mut images = Vec::new();
            for part in &raw_msg.content.parts {
                match part {
                    RawPart::Text(text) => {
                        if !content.is_empty() {
                            content.push('\n');
                        }
                        content.push_str(text);
                    }
                    RawPart::Image {
                        asset_pointer,
                        size_bytes,
                        width,
                        height,
                        metadata,
                    } => {
                        if !asset_pointer.is_empty() {
                            images.push(ImageRef::new(
                                asset_pointer.clone(),
                                *size_bytes,
                                *width,
                                *height,
                                metadata.clone(),
                            )?);
                        }
                    }
                    RawPart::Other => {}
                }
            }

            let timestamp = raw_msg
                .create_time
                .and_then(posix_timestamp)
                .unwrap_or(created_at);

            let mut metadata = raw_msg.metadata.clone();
            metadata
                .entry("original_role".to_string())
                .or_insert_with(|| serde_json::Value::String(raw_msg.author.role.clone()));

            let message_id = if raw_msg.id.is_empty() {
                crate::model::synthetic_message_id(&self.id, position)
            } else {
                raw_msg.id.clone()
            };
            let message = Message::new(
                message_id,
                content,
                role,
                timestamp,
                node.parent.clone(),
                images,
                metadata,
            )?;
            messages.push(message);
        }

        if messages.is_empty() {
            return Err(ValidationError::EmptyConversation);
        }

        Conversation::new(
            self.id,
            self.title.unwrap_or_default(),
            created_at,
            updated_at,
            messages,
        )
    }
}

pub(super) fn next_conversation<R: std::io::Read>(
    reader: &mut JsonStreamReader<BufReader<R>>,
    path: &Path,
) -> Result<Result<Conversation, SkipReason>, Error> {
    let raw = RawConversation::deserialize(&mut *reader)
        .map_err(|e| parse_err(path, ParseError::Reader(e)))?;
    Ok(raw.normalize().map_err(SkipReason::from))
}
