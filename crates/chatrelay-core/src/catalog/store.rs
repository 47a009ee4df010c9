//! Catalog store trait and its in-process implementation.

use dashmap::DashMap;

use chatrelay_types::catalog::SessionSummary;
use chatrelay_types::error::RepositoryError;

/// Storage for one catalog value per user.
///
/// Like [`crate::store::log_store::SessionLogStore`], the whole list is read
/// and written as a single value.
pub trait CatalogStore: Send + Sync + 'static {
    /// Load a user's catalog. Returns None if nothing was ever stored.
    fn load(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Vec<SessionSummary>>, RepositoryError>> + Send;

    /// Replace a user's catalog (upsert).
    fn save(
        &self,
        user_id: &str,
        chats: &[SessionSummary],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}

/// Catalog store that keeps everything in memory.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    chats: DashMap<String, Vec<SessionSummary>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CatalogStore for InMemoryCatalogStore {
    async fn load(&self, user_id: &str) -> Result<Option<Vec<SessionSummary>>, RepositoryError> {
        Ok(self.chats.get(user_id).map(|chats| chats.clone()))
    }

    async fn save(&self, user_id: &str, chats: &[SessionSummary]) -> Result<(), RepositoryError> {
        self.chats.insert(user_id.to_string(), chats.to_vec());
        Ok(())
    }
}
