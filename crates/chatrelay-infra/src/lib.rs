//! Infrastructure layer for the chat relay.
//!
//! Contains implementations of the port traits defined in `chatrelay-core`:
//! SQLite session log and catalog stores, the HTTP inference client, and the
//! config file loader.

pub mod config;
pub mod inference;
pub mod sqlite;
