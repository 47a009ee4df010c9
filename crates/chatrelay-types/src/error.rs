use thiserror::Error;

/// Errors from repository operations (used by trait definitions in chatrelay-core).
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from the text-completion backend.
///
/// The display strings are what fallback classification inspects, so the
/// unavailable and timeout variants keep the phrases "not available" and
/// "timeout" in their messages.
#[derive(Debug, Clone, Error)]
pub enum InferenceError {
    #[error("model not available: {0}")]
    Unavailable(String),

    #[error("inference request timeout after {0}s")]
    Timeout(u64),

    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("no response received from model")]
    EmptyResponse,

    #[error("request error: {0}")]
    Request(String),
}

/// Errors surfaced by session actor operations.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("message is required")]
    EmptyMessage,

    #[error("persistence error: {0}")]
    Persistence(#[from] RepositoryError),

    #[error("session actor is not running")]
    ActorUnavailable,
}

/// Errors related to the per-user session catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("userId is required")]
    MissingUser,

    #[error("sessionId is required")]
    MissingSession,

    #[error("chat not found")]
    NotFound,

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}
