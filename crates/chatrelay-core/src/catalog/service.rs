//! Catalog operations: list, create, update and delete session summaries.
//!
//! Every mutation is a read-modify-write of the user's whole catalog, so
//! mutations for the same user are serialized through a per-user lock.

use std::sync::Arc;

use dashmap::DashMap;
use rand::Rng;
use tokio::sync::{Mutex, OwnedMutexGuard};

use chatrelay_types::catalog::{
    DEFAULT_CHAT_TITLE, NewSessionSummary, SessionSummary, SessionSummaryUpdate,
};
use chatrelay_types::error::CatalogError;
use chatrelay_types::message::now_millis;

use super::store::CatalogStore;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a session id of the form `chat_<epoch ms>_<9 base36 chars>`.
pub fn generate_session_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("chat_{}_{suffix}", now_millis())
}

pub struct CatalogService<C> {
    store: Arc<C>,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl<C: CatalogStore> CatalogService<C> {
    pub fn new(store: Arc<C>) -> Self {
        Self {
            store,
            locks: DashMap::new(),
        }
    }

    /// A user's sessions, most recently active first.
    pub async fn list(&self, user_id: &str) -> Result<Vec<SessionSummary>, CatalogError> {
        let user_id = require_user(user_id)?;
        let mut chats = self.store.load(user_id).await?.unwrap_or_default();
        chats.sort_by_key(|chat| std::cmp::Reverse(chat.activity_time()));
        Ok(chats)
    }

    /// Add a session to the user's catalog.
    ///
    /// Creating an id that is already listed returns the existing entry.
    pub async fn create(
        &self,
        user_id: &str,
        request: NewSessionSummary,
    ) -> Result<SessionSummary, CatalogError> {
        let user_id = require_user(user_id)?;
        let _guard = self.lock_user(user_id).await;

        let mut chats = self.store.load(user_id).await?.unwrap_or_default();
        let session_id = request
            .session_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(generate_session_id);

        if let Some(existing) = chats.iter().find(|chat| chat.session_id == session_id) {
            return Ok(existing.clone());
        }

        let summary = SessionSummary {
            session_id,
            title: request
                .title
                .filter(|title| !title.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CHAT_TITLE.to_string()),
            last_message: None,
            last_message_time: None,
            created_at: now_millis(),
            message_count: 0,
        };
        chats.push(summary.clone());
        self.store.save(user_id, &chats).await?;

        tracing::debug!(user_id, session_id = %summary.session_id, "Catalog entry created");
        Ok(summary)
    }

    /// Apply a partial update. Setting `last_message` also stamps its time.
    pub async fn update(
        &self,
        user_id: &str,
        session_id: &str,
        update: SessionSummaryUpdate,
    ) -> Result<SessionSummary, CatalogError> {
        let user_id = require_user(user_id)?;
        if session_id.trim().is_empty() {
            return Err(CatalogError::MissingSession);
        }
        let _guard = self.lock_user(user_id).await;

        let mut chats = self.store.load(user_id).await?.unwrap_or_default();
        let chat = chats
            .iter_mut()
            .find(|chat| chat.session_id == session_id)
            .ok_or(CatalogError::NotFound)?;

        if let Some(title) = update.title {
            chat.title = title;
        }
        if let Some(last_message) = update.last_message {
            chat.last_message = Some(last_message);
            chat.last_message_time = Some(now_millis());
        }
        if let Some(count) = update.message_count {
            chat.message_count = count;
        }

        let updated = chat.clone();
        self.store.save(user_id, &chats).await?;
        Ok(updated)
    }

    /// Remove a session from the catalog. Removing an unknown id succeeds.
    pub async fn delete(&self, user_id: &str, session_id: &str) -> Result<(), CatalogError> {
        let user_id = require_user(user_id)?;
        if session_id.trim().is_empty() {
            return Err(CatalogError::MissingSession);
        }
        let _guard = self.lock_user(user_id).await;

        let mut chats = self.store.load(user_id).await?.unwrap_or_default();
        let before = chats.len();
        chats.retain(|chat| chat.session_id != session_id);
        if chats.len() != before {
            self.store.save(user_id, &chats).await?;
        }
        Ok(())
    }

    async fn lock_user<'a>(&'a self, user_id: &'a str) -> UserLock<'a> {
        let lock = self
            .locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        UserLock {
            locks: &self.locks,
            user_id,
            guard: Some(lock.lock_owned().await),
        }
    }
}

/// Holds a user's catalog lock; drops the map entry once nobody else
/// holds or waits on it.
struct UserLock<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    user_id: &'a str,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for UserLock<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.locks
            .remove_if(self.user_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

fn require_user(user_id: &str) -> Result<&str, CatalogError> {
    if user_id.trim().is_empty() {
        Err(CatalogError::MissingUser)
    } else {
        Ok(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::store::InMemoryCatalogStore;

    fn service() -> CatalogService<InMemoryCatalogStore> {
        CatalogService::new(Arc::new(InMemoryCatalogStore::new()))
    }

    fn named(session_id: &str) -> NewSessionSummary {
        NewSessionSummary {
            session_id: Some(session_id.to_string()),
            title: None,
        }
    }

    #[test]
    fn generated_ids_have_expected_shape() {
        let id = generate_session_id();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "chat");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].bytes().all(|b| BASE36.contains(&b)));
    }

    #[tokio::test]
    async fn create_uses_defaults() {
        let catalog = service();
        let chat = catalog
            .create("u1", NewSessionSummary::default())
            .await
            .unwrap();

        assert!(chat.session_id.starts_with("chat_"));
        assert_eq!(chat.title, DEFAULT_CHAT_TITLE);
        assert_eq!(chat.message_count, 0);
        assert!(chat.last_message.is_none());
        assert_eq!(catalog.list("u1").await.unwrap(), vec![chat]);
    }

    #[tokio::test]
    async fn create_existing_id_returns_entry_unchanged() {
        let catalog = service();
        let first = catalog.create("u1", named("s1")).await.unwrap();
        let again = catalog
            .create(
                "u1",
                NewSessionSummary {
                    session_id: Some("s1".into()),
                    title: Some("Other".into()),
                },
            )
            .await
            .unwrap();

        assert_eq!(first, again);
        assert_eq!(catalog.list("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_stamps_last_message_time() {
        let catalog = service();
        catalog.create("u1", named("s1")).await.unwrap();

        let updated = catalog
            .update(
                "u1",
                "s1",
                SessionSummaryUpdate {
                    title: Some("Rust questions".into()),
                    last_message: Some("what is a borrow?".into()),
                    message_count: Some(2),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Rust questions");
        assert_eq!(updated.last_message.as_deref(), Some("what is a borrow?"));
        assert!(updated.last_message_time.is_some());
        assert_eq!(updated.message_count, 2);
    }

    #[tokio::test]
    async fn update_unknown_session_is_not_found() {
        let catalog = service();
        let err = catalog
            .update("u1", "missing", SessionSummaryUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound));
    }

    #[tokio::test]
    async fn list_orders_by_activity_descending() {
        let catalog = service();
        catalog.create("u1", named("old")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        catalog.create("u1", named("new")).await.unwrap();

        let ids: Vec<String> = catalog
            .list("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|chat| chat.session_id)
            .collect();
        assert_eq!(ids, vec!["new", "old"]);

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        catalog
            .update(
                "u1",
                "old",
                SessionSummaryUpdate {
                    last_message: Some("bump".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(catalog.list("u1").await.unwrap()[0].session_id, "old");
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let catalog = service();
        catalog.create("u1", named("s1")).await.unwrap();

        catalog.delete("u1", "s1").await.unwrap();
        catalog.delete("u1", "s1").await.unwrap();
        assert!(catalog.list("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_user_is_rejected() {
        let catalog = service();
        assert!(matches!(
            catalog.list(" ").await,
            Err(CatalogError::MissingUser)
        ));
        assert!(matches!(
            catalog.create("", NewSessionSummary::default()).await,
            Err(CatalogError::MissingUser)
        ));
    }

    #[tokio::test]
    async fn user_locks_are_released_after_each_operation() {
        let service = service();
        let created = service.create("u1", NewSessionSummary::default()).await.unwrap();
        service
            .update("u1", &created.session_id, SessionSummaryUpdate::default())
            .await
            .unwrap();
        service.delete("u2", "missing").await.unwrap();

        assert!(service.locks.is_empty());
    }

    #[tokio::test]
    async fn users_are_isolated() {
        let catalog = service();
        catalog.create("u1", named("s1")).await.unwrap();
        assert!(catalog.list("u2").await.unwrap().is_empty());
    }
}
