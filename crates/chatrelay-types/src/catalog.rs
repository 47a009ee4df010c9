//! Per-user session catalog types.
//!
//! The catalog is a lightweight index of a user's sessions. It is maintained
//! by callers of the session actors, never by the actors themselves.

use serde::{Deserialize, Serialize};

/// Title given to catalog entries created without one.
pub const DEFAULT_CHAT_TITLE: &str = "New Chat";

/// Summary of one session in a user's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
    /// Epoch milliseconds of the last `last_message` update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_time: Option<i64>,
    pub created_at: i64,
    pub message_count: u32,
}

impl SessionSummary {
    /// Time used to order the catalog: last activity, else creation.
    pub fn activity_time(&self) -> i64 {
        self.last_message_time.unwrap_or(self.created_at)
    }
}

/// Request to add a session to a user's catalog.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSessionSummary {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Partial update of a catalog entry. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummaryUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub message_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_time_prefers_last_message() {
        let mut summary = SessionSummary {
            session_id: "s1".to_string(),
            title: DEFAULT_CHAT_TITLE.to_string(),
            last_message: None,
            last_message_time: None,
            created_at: 100,
            message_count: 0,
        };
        assert_eq!(summary.activity_time(), 100);

        summary.last_message_time = Some(250);
        assert_eq!(summary.activity_time(), 250);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = SessionSummary {
            session_id: "s1".to_string(),
            title: "Trip".to_string(),
            last_message: Some("see you".to_string()),
            last_message_time: Some(7),
            created_at: 1,
            message_count: 4,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["sessionId"], "s1");
        assert_eq!(json["lastMessage"], "see you");
        assert_eq!(json["lastMessageTime"], 7);
        assert_eq!(json["messageCount"], 4);
    }

    #[test]
    fn test_update_accepts_partial_body() {
        let update: SessionSummaryUpdate = serde_json::from_str(r#"{"messageCount":3}"#).unwrap();
        assert_eq!(update.message_count, Some(3));
        assert!(update.title.is_none());
        assert!(update.last_message.is_none());
    }
}
