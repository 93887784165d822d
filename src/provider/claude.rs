//! Claude export adapter (spec §4.2, §4.4, §6).
//!
//! Claude exports already store messages in conversation order under
//! `chat_messages`, so normalization here is a direct field mapping with no
//! tree traversal.

use std::collections::HashMap;
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use struson::reader::JsonStreamReader;

use crate::error::{Error, ParseError, SkipReason, ValidationError};
use crate::model::{Conversation, Message, Role};

use super::parse_err;

#[derive(Debug, Deserialize)]
struct RawConversation {
    uuid: String,
    #[serde(default)]
    name: Option<String>,
    created_at: String,
    updated_at: Option<String>,
    #[serde(default)]
    chat_messages: Vec<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    uuid: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    content: Vec<RawContentBlock>,
    sender: String,
    created_at: String,
}

#[derive(Debug, Deserialize)]
struct RawContentBlock {
    #[serde(default)]
    text: Option<String>,
}

fn parse_iso8601(raw: &str, field: &'static str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ValidationError::NaiveTimestamp { field })
}

impl RawMessage {
    fn body(&self) -> String {
        if !self.text.is_empty() {
            return self.text.clone();
        }
        self.content
            .iter()
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn role(&self) -> &str {
        match self.sender.as_str() {
            "human" => "user",
            other => other,
        }
    }
}

impl RawConversation {
    fn normalize(self) -> Result<Conversation, ValidationError> {
        let created_at = parse_iso8601(&self.created_at, "created_at")?;
        let updated_at = match &self.updated_at {
            Some(raw) => Some(parse_iso8601(raw, "updated_at")?),
            None => None,
        };

        let mut messages = Vec::with_capacity(self.chat_messages.len());
        let mut previous_id: Option<String> = None;
        for (position, raw_msg) in self.chat_messages.iter().enumerate() {
            let raw_role = raw_msg.role();
            let (role, _) = Role::normalize(raw_role);
            let timestamp = parse_iso8601(&raw_msg.created_at, "created_at")?;

            let mut metadata = HashMap::new();
            metadata.insert(
                "original_role".to_string(),
                serde_json::Value::String(raw_msg.sender.clone()),
            );

            let message_id = if raw_msg.uuid.is_empty() {
                crate::model::synthetic_message_id(&self.uuid, position)
            } else {
                raw_msg.uuid.clone()
            };
            let id_for_chain = message_id.clone();
            let message = Message::new(
                message_id,
                raw_msg.body(),
                role,
                timestamp,
                previous_id.clone(),
                Vec::new(),
                metadata,
            )?;
            previous_id = Some(id_for_chain);
            messages.push(message);
        }

        Conversation::new(
            self.uuid,
            self.name.unwrap_or_default(),
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

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(json: &str) -> Result<Conversation, ValidationError> {
        let raw: RawConversation = serde_json::from_str(json).unwrap();
        raw.normalize()
    }

    #[test]
    fn chat_messages_map_in_order() {
        let json = r#"{
            "uuid": "c1",
            "name": "hi",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:05:00Z",
            "chat_messages": [
                {"uuid":"m1","text":"hello","sender":"human","created_at":"2024-01-01T00:00:00Z"},
                {"uuid":"m2","text":"hi there","sender":"assistant","created_at":"2024-01-01T00:01:00Z"}
            ]
        }"#;
        let conv = parse_one(json).unwrap();
        assert_eq!(conv.messages().len(), 2);
        assert_eq!(conv.messages()[0].role(), Role::User);
        assert_eq!(conv.messages()[1].role(), Role::Assistant);
        assert_eq!(conv.messages()[1].parent_id(), Some("m1"));
    }

    #[test]
    fn content_blocks_used_when_text_is_empty() {
        let json = r#"{
            "uuid": "c1",
            "name": "hi",
            "created_at": "2024-01-01T00:00:00Z",
            "chat_messages": [
                {"uuid":"m1","text":"","content":[{"text":"part one"},{"text":"part two"}],"sender":"human","created_at":"2024-01-01T00:00:00Z"}
            ]
        }"#;
        let conv = parse_one(json).unwrap();
        assert_eq!(conv.messages()[0].content(), "part one\npart two");
    }

    #[test]
    fn naive_timestamp_rejected() {
        let json = r#"{
            "uuid": "c1",
            "name": "hi",
            "created_at": "not-a-date",
            "chat_messages": [
                {"uuid":"m1","text":"hi","sender":"human","created_at":"2024-01-01T00:00:00Z"}
            ]
        }"#;
        let err = parse_one(json).unwrap_err();
        assert!(matches!(err, ValidationError::NaiveTimestamp { field: "created_at" }));
    }
}
