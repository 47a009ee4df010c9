//! SQLite catalog store: one JSON array of session summaries per user.

use chatrelay_core::catalog::store::CatalogStore;
use chatrelay_types::catalog::SessionSummary;
use chatrelay_types::error::RepositoryError;
use chrono::Utc;
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `CatalogStore`.
pub struct SqliteCatalogStore {
    pool: DatabasePool,
}

impl SqliteCatalogStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl CatalogStore for SqliteCatalogStore {
    async fn load(&self, user_id: &str) -> Result<Option<Vec<SessionSummary>>, RepositoryError> {
        let row = sqlx::query("SELECT chats FROM user_chats WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let raw: String = row
            .try_get("chats")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| RepositoryError::Query(format!("invalid catalog JSON: {e}")))
    }

    async fn save(&self, user_id: &str, chats: &[SessionSummary]) -> Result<(), RepositoryError> {
        let raw = serde_json::to_string(chats)
            .map_err(|e| RepositoryError::Query(format!("failed to serialize catalog: {e}")))?;

        sqlx::query(
            r#"INSERT INTO user_chats (user_id, chats, updated_at)
               VALUES (?, ?, ?)
               ON CONFLICT (user_id) DO UPDATE SET chats = excluded.chats, updated_at = excluded.updated_at"#,
        )
        .bind(user_id)
        .bind(&raw)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }
}
