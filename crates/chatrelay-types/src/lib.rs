//! Shared domain types for the chat relay.
//!
//! Messages, real-time frames, catalog summaries, configuration and the
//! error types shared by every layer.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod catalog;
pub mod config;
pub mod error;
pub mod frame;
pub mod message;
