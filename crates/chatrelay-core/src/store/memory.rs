//! In-process session log store backed by a concurrent map.

use dashmap::DashMap;

use chatrelay_types::error::RepositoryError;
use chatrelay_types::message::Message;

use super::log_store::SessionLogStore;

/// Session log store that keeps every log in memory.
///
/// Nothing survives the process; useful for tests and throwaway relays.
#[derive(Debug, Default)]
pub struct InMemorySessionLogStore {
    logs: DashMap<String, Vec<Message>>,
}

impl InMemorySessionLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the stored log for a session, if any.
    pub fn snapshot(&self, session_id: &str) -> Option<Vec<Message>> {
        self.logs.get(session_id).map(|log| log.clone())
    }
}

impl SessionLogStore for InMemorySessionLogStore {
    async fn load(&self, session_id: &str) -> Result<Option<Vec<Message>>, RepositoryError> {
        Ok(self.snapshot(session_id))
    }

    async fn save(&self, session_id: &str, messages: &[Message]) -> Result<(), RepositoryError> {
        self.logs.insert(session_id.to_string(), messages.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_missing_returns_none() {
        let store = InMemorySessionLogStore::new();
        assert!(store.load("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_whole_log() {
        let store = InMemorySessionLogStore::new();
        store
            .save("s1", &[Message::user("a", "u1"), Message::assistant("b")])
            .await
            .unwrap();
        store.save("s1", &[Message::user("c", "u1")]).await.unwrap();

        let log = store.load("s1").await.unwrap().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].content, "c");
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = InMemorySessionLogStore::new();
        store.save("a", &[Message::user("x", "u1")]).await.unwrap();

        assert!(store.load("b").await.unwrap().is_none());
        assert_eq!(store.snapshot("a").unwrap().len(), 1);
    }
}
