//! Session history handler.

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use chatrelay_types::message::Message;

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub messages: Vec<Message>,
    pub count: usize,
}

/// GET /api/chat/history/{session_id} - Full session log, oldest first.
pub async fn get_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<HistoryResponse>>, AppError> {
    let timer = RequestTimer::start();

    let messages = state.hub.history(&session_id).await?;
    let count = messages.len();

    Ok(Json(timer.finish(HistoryResponse { messages, count })))
}
