//! HTTP adapter - REST API over the conversation orchestrator.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ConversationResponse, ErrorResponse, EscalationResponse, HealthResponse, MessageResponse,
    OperatorMessageRequest, OperatorMessageResponse, PurgeResponse, SendMediaRequest, SendMessageRequest,
    TranscriptEntryResponse, TurnResponse,
};
pub use handlers::AppState;
pub use routes::api_router;
