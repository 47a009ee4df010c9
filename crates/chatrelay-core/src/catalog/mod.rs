//! Per-user session catalog.
//!
//! A lightweight index of the sessions a user has opened, kept alongside
//! (never inside) the session logs. Callers update it after submissions;
//! session actors know nothing about it.

pub mod service;
pub mod store;
