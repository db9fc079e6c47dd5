//! HTTP DTOs for conversation and escalation endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};

use crate::application::{RelayedMessage, TurnOutcome};
use crate::domain::conversation::{AgentRole, ConversationState, DispatchState, Message, MessageRole};
use crate::domain::escalation::{EscalationRecord, EscalationStatus, TranscriptEntry, TranscriptRole};
use crate::domain::foundation::DomainError;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Inbound text message from an end user.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

/// Inbound media attachment reference.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMediaRequest {
    /// One of `image`, `video`, `audio`, `document`
    pub kind: String,
    /// Attachment handle on the user-facing channel
    pub handle: String,
}

/// Message posted by a human operator on a hand-off thread.
#[derive(Debug, Clone, Deserialize)]
pub struct OperatorMessageRequest {
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub sender_name: String,
    pub body: String,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Result of one conversation turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
    pub agent: AgentRole,
    pub agent_label: String,
    pub dispatch: DispatchState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalation_thread_id: Option<String>,
}

impl From<TurnOutcome> for TurnResponse {
    fn from(outcome: TurnOutcome) -> Self {
        Self {
            display_text: outcome.display_text(),
            agent_label: outcome.agent.label().to_string(),
            response: outcome.response,
            agent: outcome.agent,
            dispatch: outcome.dispatch,
            escalation_thread_id: outcome.escalation_thread_id.map(|id| id.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub role: MessageRole,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentRole>,
    pub timestamp: String,
}

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id().to_string(),
            role: message.role(),
            text: message.text().to_string(),
            agent: message.agent_role(),
            timestamp: message.timestamp().to_rfc3339(),
        }
    }
}

/// Conversation view for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationResponse {
    pub user_id: String,
    pub current_agent: AgentRole,
    pub dispatch: DispatchState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalation_thread_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_summary: Option<String>,
    pub messages: Vec<MessageResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ConversationState> for ConversationResponse {
    fn from(state: ConversationState) -> Self {
        Self {
            user_id: state.user_id().to_string(),
            current_agent: state.current_agent(),
            dispatch: state.dispatch(),
            escalation_thread_id: state.escalation_thread_id().map(|id| id.to_string()),
            last_summary: state.last_summary().map(str::to_string),
            messages: state.messages().iter().map(MessageResponse::from).collect(),
            created_at: state.created_at().to_rfc3339(),
            updated_at: state.updated_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntryResponse {
    pub role: TranscriptRole,
    pub text: String,
}

impl From<&TranscriptEntry> for TranscriptEntryResponse {
    fn from(entry: &TranscriptEntry) -> Self {
        Self {
            role: entry.role,
            text: entry.text.clone(),
        }
    }
}

/// Escalation record view. The customer identity is masked.
#[derive(Debug, Clone, Serialize)]
pub struct EscalationResponse {
    pub thread_id: String,
    pub customer_id: String,
    pub customer_display_name: String,
    pub status: EscalationStatus,
    pub messages: Vec<TranscriptEntryResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<EscalationRecord> for EscalationResponse {
    fn from(record: EscalationRecord) -> Self {
        Self {
            thread_id: record.thread_id().to_string(),
            customer_id: record.customer_id().masked(),
            customer_display_name: record.customer_display_name().to_string(),
            status: record.status(),
            messages: record.messages().iter().map(TranscriptEntryResponse::from).collect(),
            created_at: record.created_at().to_rfc3339(),
            updated_at: record.updated_at().to_rfc3339(),
        }
    }
}

/// Outcome of relaying an operator message.
#[derive(Debug, Clone, Serialize)]
pub struct OperatorMessageResponse {
    pub relayed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl From<Option<RelayedMessage>> for OperatorMessageResponse {
    fn from(relayed: Option<RelayedMessage>) -> Self {
        match relayed {
            Some(message) => Self {
                relayed: true,
                customer_id: Some(message.customer_id.to_string()),
                text: Some(message.text),
            },
            None => Self {
                relayed: false,
                customer_id: None,
                text: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PurgeResponse {
    pub purged: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&DomainError> for ErrorResponse {
    fn from(err: &DomainError) -> Self {
        Self::new(err.code.to_string(), err.message.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ErrorCode, ThreadId, UserId};

    #[test]
    fn operator_message_request_defaults_sender() {
        let json = r#"{"body": "Hello"}"#;
        let req: OperatorMessageRequest = serde_json::from_str(json).unwrap();
        assert!(req.sender_id.is_none());
        assert_eq!(req.sender_name, "");
        assert_eq!(req.body, "Hello");
    }

    #[test]
    fn turn_response_carries_label_and_display_text() {
        let outcome = TurnOutcome {
            response: Some("Hi".to_string()),
            agent: AgentRole::CustomerAgent,
            dispatch: DispatchState::Automated,
            escalation_thread_id: None,
        };

        let response = TurnResponse::from(outcome);
        assert_eq!(response.agent_label, "Customer Service");
        assert_eq!(response.display_text.as_deref(), Some("[Customer Service] Hi"));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["agent"], "customer_agent");
        assert_eq!(json["dispatch"], "automated");
        assert!(json.get("escalation_thread_id").is_none());
    }

    #[test]
    fn human_owned_turn_has_no_response() {
        let outcome = TurnOutcome {
            response: None,
            agent: AgentRole::HumanChannel,
            dispatch: DispatchState::HumanOwned,
            escalation_thread_id: Some(ThreadId::new("19:abc@thread.v2").unwrap()),
        };

        let json = serde_json::to_value(TurnResponse::from(outcome)).unwrap();
        assert!(json.get("response").is_none());
        assert_eq!(json["agent"], "contact_center");
        assert_eq!(json["escalation_thread_id"], "19:abc@thread.v2");
    }

    #[test]
    fn operator_message_response_from_skipped_relay() {
        let response = OperatorMessageResponse::from(None);
        assert!(!response.relayed);
        assert!(response.text.is_none());
    }

    #[test]
    fn operator_message_response_from_relay() {
        let response = OperatorMessageResponse::from(Some(RelayedMessage {
            customer_id: UserId::new("+15550001111").unwrap(),
            text: "[Contact Center Agent] Dana: Hi".to_string(),
        }));
        assert!(response.relayed);
        assert_eq!(response.customer_id.as_deref(), Some("+15550001111"));
    }

    #[test]
    fn error_response_uses_domain_code() {
        let err = DomainError::new(ErrorCode::EscalationNotFound, "escalation not found: 19:abc");
        let error = ErrorResponse::from(&err);
        assert_eq!(error.code, "ESCALATION_NOT_FOUND");
        assert_eq!(error.message, "escalation not found: 19:abc");
    }
}
