//! [`Conversation`] — spec §3.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::Message;
use crate::error::ValidationError;

/// A normalized, immutable chat transcript (spec §3 `Conversation`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    id: String,
    title: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
        mut messages: Vec<Message>,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::EmptyField {
                field: "conversation.id",
            });
        }
        if messages.is_empty() {
            return Err(ValidationError::EmptyConversation);
        }
        if let Some(updated) = updated_at
            && updated < created_at
        {
            return Err(ValidationError::UpdatedBeforeCreated {
                updated_at: updated.to_rfc3339(),
                created_at: created_at.to_rfc3339(),
            });
        }

        let valid_ids: HashSet<&str> = messages.iter().map(Message::id).collect();
        for msg in messages.iter_mut() {
            msg.repair_dangling_parent(&valid_ids);
        }

        Ok(Self {
            id,
            title: title.into(),
            created_at,
            updated_at,
            messages,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// `updated_at` if present, else `created_at` — the canonical
    /// "last activity" timestamp (spec §3).
    pub fn updated_at_or_created(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message_by_id(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id() == id)
    }
}
