//! Text-completion backend abstraction.
//!
//! The relay treats the model as an opaque prompt-in, text-out service.
//! [`client::InferenceClient`] is the port; [`response`] turns whatever
//! shape the backend answers with into plain text.

pub mod client;
pub mod response;
