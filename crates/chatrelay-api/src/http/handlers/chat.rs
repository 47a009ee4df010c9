//! Chat submission over plain HTTP.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use chatrelay_core::session::SubmitOutcome;

use crate::http::error::AppError;
use crate::http::extractors::json::ValidJson;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// Body of `POST /api/chat`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    /// Session key; the user id is used when absent.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// POST /api/chat - Submit a message and wait for the assistant reply.
pub async fn submit_chat(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<ChatRequest>,
) -> Result<Json<ApiResponse<SubmitOutcome>>, AppError> {
    let timer = RequestTimer::start();

    let message = body
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| AppError::Validation("message is required".to_string()))?;
    let user_id = body
        .user_id
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::Validation("userId is required".to_string()))?;
    let session_id = body
        .session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| user_id.clone());

    let outcome = state.hub.submit(&session_id, message, user_id).await?;
    tracing::debug!(%session_id, history = outcome.history.len(), "Chat submission handled");

    Ok(Json(
        timer
            .finish(outcome)
            .with_link("history", &format!("/api/chat/history/{session_id}")),
    ))
}
