pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::conversation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Chat API
        .route("/api/v1/chat", post(handlers::handle_chat))
        .route(
            "/api/v1/chat/:session_id",
            get(handlers::handle_get_session).delete(handlers::handle_reset_session),
        )
        // Legacy single-conversation endpoint
        .route("/chat", post(handlers::handle_legacy_chat))
        .with_state(state)
}
