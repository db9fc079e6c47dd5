//! Content agent port.
//!
//! Content agents produce the automated reply when no escalation intent
//! fired. They may suggest an automated display label for the reply
//! (`CustomerAgent` or `PolicyAgent`); the orchestrator ignores any
//! human-staffed label they return.

use async_trait::async_trait;

use crate::domain::conversation::{AgentRole, ConversationState};
use crate::domain::customer::CustomerProfile;
use crate::domain::foundation::UserId;

use super::AIError;

/// Everything a content agent sees for one turn.
#[derive(Debug, Clone, Copy)]
pub struct ContentRequest<'a> {
    pub user_id: &'a UserId,
    pub text: &'a str,
    pub conversation: &'a ConversationState,
    pub customer: Option<&'a CustomerProfile>,
}

/// A content agent's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentReply {
    pub text: String,
    /// Display label the reply should be attributed to.
    pub agent: AgentRole,
}

impl ContentReply {
    pub fn new(agent: AgentRole, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            agent,
        }
    }
}

/// Port for automated content generation.
#[async_trait]
pub trait ContentAgent: Send + Sync {
    async fn respond(&self, request: ContentRequest<'_>) -> Result<ContentReply, ContentAgentError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentAgentError {
    #[error("content provider failed: {0}")]
    Provider(#[from] AIError),

    #[error("content agent produced no reply")]
    EmptyReply,
}
