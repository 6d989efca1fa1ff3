//! Wire types for the backend REST and streaming contract.

use serde::{Deserialize, Serialize};

/// Message author, as stored and streamed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Catalog entry from `GET /api/models`. Loaded once at startup, read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub description: String,
}

/// List-view projection of a conversation from `GET /api/conversations`.
///
/// Timestamps stay as the ISO-8601 strings the backend serves; they are only
/// compared lexicographically and echoed back to the display layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
    pub message_count: u32,
    pub last_message_preview: String,
}

/// Response body of `POST /api/conversations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationCreated {
    pub id: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ConversationCreated> for ConversationSummary {
    fn from(created: ConversationCreated) -> Self {
        ConversationSummary {
            id: created.id,
            title: created.title,
            created_at: created.created_at,
            updated_at: created.updated_at,
            message_count: 0,
            last_message_preview: String::new(),
        }
    }
}

/// Persisted message from `GET /api/conversations/{id}/messages`.
///
/// The backend hands out numeric row ids; they are mapped into the client's
/// string id space when history is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: i64,
    pub conversation_id: String,
    pub role: Role,
    pub content: String,
    pub model: String,
    pub timestamp: String,
}

/// One prior turn sent as chat history, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: Role,
    pub content: String,
}

/// Request body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub conversation_id: String,
    pub message: String,
    pub model: String,
    pub history: Vec<HistoryTurn>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn test_chat_request_wire_shape() {
        let request = ChatRequest {
            conversation_id: "conv-1".to_string(),
            message: "hello".to_string(),
            model: "claude-haiku-4-5".to_string(),
            history: vec![HistoryTurn {
                role: Role::User,
                content: "earlier".to_string(),
            }],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["conversation_id"], "conv-1");
        assert_eq!(json["history"][0]["role"], "user");
    }

    #[test]
    fn test_stored_message_accepts_numeric_id() {
        let raw = r#"{
            "id": 42,
            "conversation_id": "conv-1",
            "role": "assistant",
            "content": "hi",
            "model": "claude-haiku-4-5",
            "timestamp": "2026-01-01T00:00:00Z"
        }"#;
        let msg: StoredMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(msg.id, 42);
        assert_eq!(msg.role, Role::Assistant);
    }

    #[test]
    fn test_created_conversation_becomes_empty_summary() {
        let created = ConversationCreated {
            id: "conv-9".to_string(),
            title: "New chat".to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        };
        let summary: ConversationSummary = created.into();
        assert_eq!(summary.message_count, 0);
        assert!(summary.last_message_preview.is_empty());
    }
}
