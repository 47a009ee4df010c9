//! Session log persistence port.
//!
//! The actor is the only writer for its session, so the store only needs a
//! whole-value get/put per session identifier.

pub mod log_store;
pub mod memory;
