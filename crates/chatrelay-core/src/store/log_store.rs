//! Session log store trait.
//!
//! Defines the interface for per-session message log storage.
//! Implementations live in chatrelay-infra (SQLite) and in
//! [`super::memory`] (in-process).

use chatrelay_types::error::RepositoryError;
use chatrelay_types::message::Message;

/// Trait for per-session persistent log storage.
///
/// One key per session holds the entire ordered log as a single value; no
/// secondary indices. Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait SessionLogStore: Send + Sync + 'static {
    /// Load the full log for a session. Returns None if nothing was ever stored.
    fn load(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Vec<Message>>, RepositoryError>> + Send;

    /// Replace the stored log for a session with `messages` (upsert).
    fn save(
        &self,
        session_id: &str,
        messages: &[Message],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
