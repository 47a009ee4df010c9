//! InferenceClient trait definition.

use serde::Serialize;

use chatrelay_types::config::InferenceConfig;
use chatrelay_types::error::InferenceError;

/// Prompt and sampling parameters for one completion call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl InferenceRequest {
    /// Build a request for `prompt` using the configured sampling parameters.
    pub fn new(prompt: impl Into<String>, config: &InferenceConfig) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// Trait for text-completion backends.
///
/// `complete` returns the backend's raw JSON answer; callers extract the
/// text with [`super::response::extract_text`]. No ordering guarantees are
/// made across concurrent calls.
///
/// Implementations live in chatrelay-infra (e.g., `HttpInferenceClient`).
pub trait InferenceClient: Send + Sync + 'static {
    /// Human-readable backend name for logs.
    fn name(&self) -> &str;

    /// Send one prompt and receive the backend's response body.
    fn complete(
        &self,
        request: &InferenceRequest,
    ) -> impl std::future::Future<Output = Result<serde_json::Value, InferenceError>> + Send;
}
