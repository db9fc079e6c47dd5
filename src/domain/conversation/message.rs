//! Conversation history entries.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MessageId, Timestamp};

use super::AgentRole;

/// Who authored a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Agent,
}

/// One entry in a conversation history. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    role: MessageRole,
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    agent: Option<AgentRole>,
    timestamp: Timestamp,
}

impl Message {
    /// A message received from the end user.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role: MessageRole::User,
            text: text.into(),
            agent: None,
            timestamp: Timestamp::now(),
        }
    }

    /// A message produced by `agent`.
    pub fn agent(agent: AgentRole, text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role: MessageRole::Agent,
            text: text.into(),
            agent: Some(agent),
            timestamp: Timestamp::now(),
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The producing agent, present iff `role == Agent`.
    pub fn agent_role(&self) -> Option<AgentRole> {
        self.agent
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// `role: text` line used when rendering context for prompts.
    pub fn as_context_line(&self) -> String {
        match self.role {
            MessageRole::User => format!("user: {}", self.text),
            MessageRole::Agent => format!("assistant: {}", self.text),
        }
    }
}
