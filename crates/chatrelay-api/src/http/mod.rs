//! HTTP/REST API layer for the chat relay.
//!
//! Axum-based API under `/api/` with envelope response format, a
//! WebSocket endpoint per session, and CORS support.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
