//! Client-side message model for the active conversation.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::api::{Role, StoredMessage};

/// One chat turn as rendered.
///
/// Assistant content is append-only while its turn is streaming and frozen
/// once the turn reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Client-generated id, unique within a session run.
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Model identifier the turn was sent with.
    pub model: String,
    pub timestamp: DateTime<Utc>,
    pub conversation_id: String,
}

impl Message {
    /// Creates the user half of a new turn.
    pub(crate) fn user(content: &str, model: &str, conversation_id: &str) -> Self {
        Self {
            id: format!("user-{}", Uuid::new_v4()),
            role: Role::User,
            content: content.to_string(),
            model: model.to_string(),
            timestamp: Utc::now(),
            conversation_id: conversation_id.to_string(),
        }
    }

    /// Creates the empty assistant placeholder that streamed fragments land in.
    pub(crate) fn assistant_placeholder(model: &str, conversation_id: &str) -> Self {
        Self {
            id: format!("assistant-{}", Uuid::new_v4()),
            role: Role::Assistant,
            content: String::new(),
            model: model.to_string(),
            timestamp: Utc::now(),
            conversation_id: conversation_id.to_string(),
        }
    }
}

impl From<StoredMessage> for Message {
    fn from(stored: StoredMessage) -> Self {
        let timestamp = DateTime::parse_from_rfc3339(&stored.timestamp)
            .map_or_else(|_| Utc::now(), |ts| ts.with_timezone(&Utc));
        Self {
            id: stored.id.to_string(),
            role: stored.role,
            content: stored.content,
            model: stored.model,
            timestamp,
            conversation_id: stored.conversation_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_starts_empty() {
        let msg = Message::assistant_placeholder("m1", "conv-1");
        assert_eq!(msg.role, Role::Assistant);
        assert!(msg.content.is_empty());
        assert!(msg.id.starts_with("assistant-"));
    }

    #[test]
    fn test_stored_message_maps_numeric_id_to_string() {
        let stored = StoredMessage {
            id: 7,
            conversation_id: "conv-1".to_string(),
            role: Role::User,
            content: "hi".to_string(),
            model: "m1".to_string(),
            timestamp: "2026-03-01T12:00:00+00:00".to_string(),
        };
        let msg: Message = stored.into();
        assert_eq!(msg.id, "7");
        assert_eq!(msg.timestamp.to_rfc3339(), "2026-03-01T12:00:00+00:00");
    }

    #[test]
    fn test_unparseable_timestamp_falls_back_to_now() {
        let stored = StoredMessage {
            id: 8,
            conversation_id: "conv-1".to_string(),
            role: Role::User,
            content: "hi".to_string(),
            model: "m1".to_string(),
            timestamp: "not-a-date".to_string(),
        };
        let msg: Message = stored.into();
        assert!(msg.timestamp <= Utc::now());
    }
}
