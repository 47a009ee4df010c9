//! Per-user session catalog handlers.

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use chatrelay_types::catalog::{NewSessionSummary, SessionSummary, SessionSummaryUpdate};

use crate::http::error::AppError;
use crate::http::extractors::json::ValidJson;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ChatListResponse {
    pub chats: Vec<SessionSummary>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedResponse {
    pub deleted: bool,
    pub session_id: String,
}

/// GET /api/chats/{user_id} - The user's sessions, most recent first.
pub async fn list_chats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<ChatListResponse>>, AppError> {
    let timer = RequestTimer::start();
    let chats = state.catalog.list(&user_id).await?;
    let count = chats.len();
    Ok(Json(timer.finish(ChatListResponse { chats, count })))
}

/// POST /api/chats/{user_id} - Add a session to the catalog.
pub async fn create_chat(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ValidJson(body): ValidJson<NewSessionSummary>,
) -> Result<Json<ApiResponse<SessionSummary>>, AppError> {
    let timer = RequestTimer::start();
    let chat = state.catalog.create(&user_id, body).await?;
    let history = format!("/api/chat/history/{}", chat.session_id);
    Ok(Json(timer.finish(chat).with_link("history", &history)))
}

/// PUT /api/chats/{user_id}/{session_id} - Update title, last message or count.
pub async fn update_chat(
    State(state): State<AppState>,
    Path((user_id, session_id)): Path<(String, String)>,
    ValidJson(body): ValidJson<SessionSummaryUpdate>,
) -> Result<Json<ApiResponse<SessionSummary>>, AppError> {
    let timer = RequestTimer::start();
    let chat = state.catalog.update(&user_id, &session_id, body).await?;
    Ok(Json(timer.finish(chat)))
}

/// DELETE /api/chats/{user_id}/{session_id} - Remove a session from the catalog.
///
/// The session log itself is kept.
pub async fn delete_chat(
    State(state): State<AppState>,
    Path((user_id, session_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<DeletedResponse>>, AppError> {
    let timer = RequestTimer::start();
    state.catalog.delete(&user_id, &session_id).await?;
    Ok(Json(timer.finish(DeletedResponse {
        deleted: true,
        session_id,
    })))
}
