//! Observability for the chat relay: tracing subscriber setup and the
//! OpenTelemetry GenAI attribute names used on inference spans.

pub mod genai_attrs;
pub mod tracing_setup;
