//! Inference backends.

pub mod http;
