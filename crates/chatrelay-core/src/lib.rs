//! Session actors, ports and business logic for the chat relay.
//!
//! This crate defines the "ports" (store and inference traits) that the
//! infrastructure layer implements. It depends only on `chatrelay-types` --
//! never on `chatrelay-infra` or any database/IO crate.

pub mod catalog;
pub mod inference;
pub mod session;
pub mod store;
