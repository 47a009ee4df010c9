//! Status probes and the inference smoke test.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use chatrelay_core::inference::client::{InferenceClient, InferenceRequest};
use chatrelay_core::inference::response::extract_text;

use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

const TEST_PROMPT: &str = "Say hello in one short sentence.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub active_sessions: usize,
}

#[derive(Debug, Serialize)]
pub struct TestAiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /api and GET /health - Liveness probe.
pub async fn status(State(state): State<AppState>) -> Json<ApiResponse<StatusResponse>> {
    let timer = RequestTimer::start();
    Json(timer.finish(StatusResponse {
        status: "ok",
        service: "chatrelay",
        version: env!("CARGO_PKG_VERSION"),
        active_sessions: state.hub.active_sessions(),
    }))
}

/// GET /api/test-ai - One short inference call, reporting the text or the failure.
pub async fn test_ai(State(state): State<AppState>) -> Json<ApiResponse<TestAiResponse>> {
    let timer = RequestTimer::start();
    let request = InferenceRequest::new(TEST_PROMPT, &state.config.inference);

    let result = state
        .hub
        .inference()
        .complete(&request)
        .await
        .and_then(|body| extract_text(&body));

    let body = match result {
        Ok(text) => TestAiResponse {
            success: true,
            response: Some(text.trim().to_string()),
            error: None,
        },
        Err(err) => {
            tracing::warn!(error = %err, "Inference smoke test failed");
            TestAiResponse {
                success: false,
                response: None,
                error: Some(err.to_string()),
            }
        }
    };

    Json(timer.finish(body))
}
