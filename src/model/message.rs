//! [`Message`] and [`ImageRef`] — spec §3.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Normalized conversation role. Unknown provider roles, and tool/function
/// roles, collapse to [`Role::Assistant`]; the original provider string is
/// preserved by the caller under `metadata["original_role"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Map a raw provider role string to a normalized [`Role`].
    ///
    /// Returns `(role, was_recognized)`; `was_recognized` is `false` when
    /// the raw string fell back to [`Role::Assistant`], so callers can
    /// decide whether to record `original_role` in metadata.
    pub fn normalize(raw: &str) -> (Role, bool) {
        match raw {
            "user" => (Role::User, true),
            "assistant" => (Role::Assistant, true),
            "system" => (Role::System, true),
            "tool" | "function" | "tool_result" => (Role::Assistant, true),
            _ => (Role::Assistant, false),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// Synthesize a stable id for a wire record that omitted one (spec §4.8,
/// §6): `msg-{conversation_id}-{zero_padded_index}`.
pub fn synthetic_message_id(conversation_id: &str, index: usize) -> String {
    format!("msg-{conversation_id}-{index:04}")
}

/// Reference to an image attachment extracted from multimodal content
/// (spec §3 `ImageRef`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    asset_pointer: String,
    size_bytes: Option<u64>,
    width: Option<u32>,
    height: Option<u32>,
    metadata: HashMap<String, serde_json::Value>,
}

impl ImageRef {
    pub fn new(
        asset_pointer: impl Into<String>,
        size_bytes: Option<u64>,
        width: Option<u32>,
        height: Option<u32>,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Result<Self, ValidationError> {
        let asset_pointer = asset_pointer.into();
        if asset_pointer.is_empty() {
            return Err(ValidationError::EmptyField {
                field: "asset_pointer",
            });
        }
        if let Some(w) = width
            && w < 1
        {
            return Err(ValidationError::InvalidImageDimension {
                field: "width",
                value: w as i64,
            });
        }
        if let Some(h) = height
            && h < 1
        {
            return Err(ValidationError::InvalidImageDimension {
                field: "height",
                value: h as i64,
            });
        }
        Ok(Self {
            asset_pointer,
            size_bytes,
            width,
            height,
            metadata,
        })
    }

    pub fn asset_pointer(&self) -> &str {
        &self.asset_pointer
    }

    pub fn size_bytes(&self) -> Option<u64> {
        self.size_bytes
    }

    pub fn width(&self) -> Option<u32> {
        self.width
    }

    pub fn height(&self) -> Option<u32> {
        self.height
    }

    pub fn metadata(&self) -> &HashMap<String, serde_json::Value> {
        &self.metadata
    }
}

/// A single utterance within a [`Conversation`](super::conversation::Conversation)
/// (spec §3 `Message`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    id: String,
    content: String,
    role: Role,
    timestamp: DateTime<Utc>,
    parent_id: Option<String>,
    images: Vec<ImageRef>,
    metadata: HashMap<String, serde_json::Value>,
}

impl Message {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        role: Role,
        timestamp: DateTime<Utc>,
        parent_id: Option<String>,
        images: Vec<ImageRef>,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::EmptyField { field: "message.id" });
        }
        Ok(Self {
            id,
            content: content.into(),
            role,
            timestamp,
            parent_id,
            images,
            metadata,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }

    pub fn metadata(&self) -> &HashMap<String, serde_json::Value> {
        &self.metadata
    }

    /// Drop a dangling `parent_id` (one not present among `valid_ids`),
    /// per spec §3's "adapter repairs or drops dangling references".
    pub(crate) fn repair_dangling_parent(&mut self, valid_ids: &std::collections::HashSet<&str>) {
        if let Some(parent) = &self.parent_id
            && !valid_ids.contains(parent.as_str())
        {
            self.parent_id = None;
        }
    }
}
