pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::assistant::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Assistant API
        .route(
            "/api/v1/assistant/sessions",
            post(handlers::handle_create_session),
        )
        .route(
            "/api/v1/assistant/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_reset_session),
        )
        .route(
            "/api/v1/assistant/sessions/:id/messages",
            post(handlers::handle_send_message),
        )
        .route("/api/v1/assistant/parse", post(handlers::handle_parse))
        .with_state(state)
}
