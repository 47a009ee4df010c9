//! SQLite session log store.
//!
//! Implements `SessionLogStore` from `chatrelay-core`. Each session is one
//! row whose `messages` column holds the whole log as a JSON array, so a
//! save is a single upsert.

use chatrelay_core::store::log_store::SessionLogStore;
use chatrelay_types::error::RepositoryError;
use chatrelay_types::message::Message;
use chrono::Utc;
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `SessionLogStore`.
pub struct SqliteSessionLogStore {
    pool: DatabasePool,
}

impl SqliteSessionLogStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl SessionLogStore for SqliteSessionLogStore {
    async fn load(&self, session_id: &str) -> Result<Option<Vec<Message>>, RepositoryError> {
        let row = sqlx::query("SELECT messages FROM session_logs WHERE session_id = ?")
            .bind(session_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let raw: String = row
                    .try_get("messages")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                let messages: Vec<Message> = serde_json::from_str(&raw)
                    .map_err(|e| RepositoryError::Query(format!("invalid session log JSON: {e}")))?;
                Ok(Some(messages))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, session_id: &str, messages: &[Message]) -> Result<(), RepositoryError> {
        let raw = serde_json::to_string(messages)
            .map_err(|e| RepositoryError::Query(format!("failed to serialize session log: {e}")))?;

        sqlx::query(
            r#"INSERT INTO session_logs (session_id, messages, updated_at)
               VALUES (?, ?, ?)
               ON CONFLICT (session_id) DO UPDATE SET messages = excluded.messages, updated_at = excluded.updated_at"#,
        )
        .bind(session_id)
        .bind(&raw)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }
}
