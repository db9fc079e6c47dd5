//! HTTP handlers for conversation and escalation endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::application::{ConversationOrchestrator, OrchestratorError};
use crate::domain::conversation::MediaKind;
use crate::domain::foundation::{DomainError, ErrorCode, ThreadId, UserId};

use super::dto::{
    ConversationResponse, ErrorResponse, EscalationResponse, HealthResponse, OperatorMessageRequest,
    OperatorMessageResponse, PurgeResponse, SendMediaRequest, SendMessageRequest, TurnResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

/// Shared state for all routes. Cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ConversationOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Arc<ConversationOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Conversation handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /conversations/:user_id/messages - Process one inbound text message
pub async fn send_message(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Response {
    let user_id = match parse_user_id(&user_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.orchestrator.handle(&user_id, &req.text).await {
        Ok(outcome) => (StatusCode::OK, Json(TurnResponse::from(outcome))).into_response(),
        Err(e) => handle_orchestrator_error(e),
    }
}

/// POST /conversations/:user_id/media - Process one inbound media attachment
pub async fn send_media(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<SendMediaRequest>,
) -> Response {
    let user_id = match parse_user_id(&user_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let kind = match req.kind.parse::<MediaKind>() {
        Ok(kind) => kind,
        Err(e) => return error_response(DomainError::validation("kind", e.to_string())),
    };

    match state.orchestrator.handle_media(&user_id, kind, &req.handle).await {
        Ok(outcome) => (StatusCode::OK, Json(TurnResponse::from(outcome))).into_response(),
        Err(e) => handle_orchestrator_error(e),
    }
}

/// GET /conversations/:user_id - Conversation state and history
pub async fn get_conversation(State(state): State<AppState>, Path(user_id): Path<String>) -> Response {
    let user_id = match parse_user_id(&user_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.orchestrator.get_conversation(&user_id).await {
        Ok(Some(conversation)) => (StatusCode::OK, Json(ConversationResponse::from(conversation))).into_response(),
        Ok(None) => error_response(DomainError::new(
            ErrorCode::ConversationNotFound,
            format!("conversation not found: {}", user_id.masked()),
        )),
        Err(e) => handle_orchestrator_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Escalation handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /escalations/:thread_id - Escalation record
pub async fn get_escalation(State(state): State<AppState>, Path(thread_id): Path<String>) -> Response {
    let thread_id = match parse_thread_id(&thread_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.orchestrator.get_escalation(&thread_id).await {
        Ok(Some(record)) => (StatusCode::OK, Json(EscalationResponse::from(record))).into_response(),
        Ok(None) => handle_orchestrator_error(OrchestratorError::EscalationNotFound(thread_id)),
        Err(e) => handle_orchestrator_error(e),
    }
}

/// POST /escalations/:thread_id/disconnect - End a hand-off from the operator side
pub async fn disconnect_escalation(State(state): State<AppState>, Path(thread_id): Path<String>) -> Response {
    let thread_id = match parse_thread_id(&thread_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.orchestrator.disconnect_by_thread(&thread_id).await {
        Ok(record) => (StatusCode::OK, Json(EscalationResponse::from(record))).into_response(),
        Err(e) => handle_orchestrator_error(e),
    }
}

/// POST /escalations/:thread_id/close - Administrative close
pub async fn close_escalation(State(state): State<AppState>, Path(thread_id): Path<String>) -> Response {
    let thread_id = match parse_thread_id(&thread_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.orchestrator.close_escalation(&thread_id).await {
        Ok(record) => (StatusCode::OK, Json(EscalationResponse::from(record))).into_response(),
        Err(e) => handle_orchestrator_error(e),
    }
}

/// POST /escalations/:thread_id/operator-messages - Relay an operator message
pub async fn relay_operator_message(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
    Json(req): Json<OperatorMessageRequest>,
) -> Response {
    let thread_id = match parse_thread_id(&thread_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state
        .orchestrator
        .relay_operator_message(&thread_id, req.sender_id.as_deref(), &req.sender_name, &req.body)
        .await
    {
        Ok(relayed) => (StatusCode::OK, Json(OperatorMessageResponse::from(relayed))).into_response(),
        Err(e) => handle_orchestrator_error(e),
    }
}

/// POST /admin/escalations/purge - Delete inactive escalations and their threads
pub async fn purge_escalations(State(state): State<AppState>) -> Response {
    match state.orchestrator.purge_inactive().await {
        Ok(purged) => (StatusCode::OK, Json(PurgeResponse { purged })).into_response(),
        Err(e) => handle_orchestrator_error(e),
    }
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn parse_user_id(raw: &str) -> Result<UserId, Response> {
    UserId::new(raw).map_err(|e| error_response(e.into()))
}

fn parse_thread_id(raw: &str) -> Result<ThreadId, Response> {
    ThreadId::new(raw).map_err(|e| error_response(e.into()))
}

fn handle_orchestrator_error(error: OrchestratorError) -> Response {
    error_response(error.into())
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
        ErrorCode::EscalationNotFound | ErrorCode::ConversationNotFound => StatusCode::NOT_FOUND,
        ErrorCode::InactiveEscalation | ErrorCode::InvalidStateTransition => StatusCode::CONFLICT,
        ErrorCode::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorCode::ChannelError => StatusCode::BAD_GATEWAY,
        ErrorCode::StorageError | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: DomainError) -> Response {
    let status = status_for(error.code);

    let body = if status.is_server_error() {
        tracing::error!(error = %error, "Request failed");
        ErrorResponse::new(error.code.to_string(), "Internal server error")
    } else {
        ErrorResponse::from(&error)
    };

    let mut response = (status, Json(body)).into_response();
    if let Some(secs) = error
        .details
        .get("retry_after_secs")
        .and_then(|value| HeaderValue::from_str(value).ok())
    {
        response.headers_mut().insert(header::RETRY_AFTER, secs);
    }
    response
}
