//! Axum router configuration with middleware.
//!
//! API routes live under `/api/`; `/health` sits at the root for probes.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Chat
        .route("/chat", post(handlers::chat::submit_chat))
        .route(
            "/chat/history/{session_id}",
            get(handlers::history::get_history),
        )
        // Real-time
        .route("/ws/{session_id}", get(handlers::ws::ws_handler))
        // Diagnostics
        .route("/test-ai", get(handlers::health::test_ai))
        // Catalog
        .route(
            "/chats/{user_id}",
            get(handlers::catalog::list_chats).post(handlers::catalog::create_chat),
        )
        .route(
            "/chats/{user_id}/{session_id}",
            put(handlers::catalog::update_chat).delete(handlers::catalog::delete_chat),
        );

    Router::new()
        .route("/api", get(handlers::health::status))
        .nest("/api", api_routes)
        .route("/health", get(handlers::health::status))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
