//! HTTP routes for conversation and escalation endpoints.

use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{
    close_escalation, disconnect_escalation, get_conversation, get_escalation, health, purge_escalations,
    relay_operator_message, send_media, send_message, AppState,
};

/// Creates the application router with all endpoints.
pub fn api_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/conversations/:user_id", get(get_conversation))
        .route("/conversations/:user_id/messages", post(send_message))
        .route("/conversations/:user_id/media", post(send_media))
        .route("/escalations/:thread_id", get(get_escalation))
        .route("/escalations/:thread_id/disconnect", post(disconnect_escalation))
        .route("/escalations/:thread_id/close", post(close_escalation))
        .route("/escalations/:thread_id/operator-messages", post(relay_operator_message))
        .route("/admin/escalations/purge", post(purge_escalations))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
