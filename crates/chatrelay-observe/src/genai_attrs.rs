//! OpenTelemetry GenAI Semantic Convention attribute constants.
//!
//! These follow the OTel GenAI Semantic Conventions so inference calls are
//! instrumented consistently. All constants are string slices usable as
//! field names in `tracing::info_span!`.
//!
//! Span naming convention: `"{operation} {model}"` (e.g., `"text_completion llama-3"`)

// --- Required attributes ---

/// The name of the operation being performed (e.g., "text_completion").
pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";

/// The name of the GenAI provider (e.g., "http").
pub const GEN_AI_PROVIDER_NAME: &str = "gen_ai.provider.name";

// --- Recommended attributes ---

/// The model ID requested.
pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";

/// The sampling temperature for the request.
pub const GEN_AI_REQUEST_TEMPERATURE: &str = "gen_ai.request.temperature";

/// The maximum number of output tokens requested.
pub const GEN_AI_REQUEST_MAX_TOKENS: &str = "gen_ai.request.max_tokens";

// --- Operation name values ---

/// Single-prompt text completion.
pub const OP_TEXT_COMPLETION: &str = "text_completion";

/// Span name for an operation against a model.
pub fn span_name(operation: &str, model: &str) -> String {
    format!("{operation} {model}")
}
