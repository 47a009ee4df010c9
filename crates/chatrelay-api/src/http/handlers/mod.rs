//! HTTP request handlers for the REST API.

pub mod catalog;
pub mod chat;
pub mod health;
pub mod history;
pub mod ws;
