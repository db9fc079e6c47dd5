//! Escalation records and their lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::conversation::{Message, MessageRole};
use crate::domain::foundation::{StateMachine, ThreadId, Timestamp, UserId};

use super::EscalationError;

/// Notice posted to the hand-off thread when the customer leaves.
pub const CUSTOMER_DISCONNECTED_NOTICE: &str = "Customer has disconnected from the chat.";

/// Lifecycle of a hand-off thread.
///
/// `Active -> Disconnected` on a confirmed user disconnect,
/// `Active | Disconnected -> Closed` through administrative action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EscalationStatus {
    #[default]
    Active,
    Disconnected,
    Closed,
}

impl EscalationStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for EscalationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Disconnected => "disconnected",
            Self::Closed => "closed",
        };
        write!(f, "{}", s)
    }
}

impl StateMachine for EscalationStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use EscalationStatus::*;
        matches!(
            (self, target),
            (Active, Disconnected) | (Active, Closed) | (Disconnected, Closed)
        )
    }
}

/// Author of a transcript entry on the hand-off thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptRole {
    #[serde(rename = "user")]
    Customer,
    Assistant,
    System,
}

/// One line of the transcript mirrored to the hand-off thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: TranscriptRole,
    pub text: String,
}

impl TranscriptEntry {
    pub fn new(role: TranscriptRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    pub fn customer(text: impl Into<String>) -> Self {
        Self::new(TranscriptRole::Customer, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(TranscriptRole::Assistant, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(TranscriptRole::System, text)
    }

    /// Display name the entry is posted under on the external thread.
    pub fn sender_label<'a>(&self, customer_display_name: &'a str) -> &'a str {
        match self.role {
            TranscriptRole::Customer => customer_display_name,
            TranscriptRole::Assistant => "Assistant",
            TranscriptRole::System => "System",
        }
    }
}

impl From<&Message> for TranscriptEntry {
    fn from(message: &Message) -> Self {
        let role = match message.role() {
            MessageRole::User => TranscriptRole::Customer,
            MessageRole::Agent => TranscriptRole::Assistant,
        };
        Self::new(role, message.text())
    }
}

/// A hand-off session with a human-staffed channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationRecord {
    customer_id: UserId,
    customer_display_name: String,
    thread_id: ThreadId,
    messages: Vec<TranscriptEntry>,
    created_at: Timestamp,
    status: EscalationStatus,
    #[serde(default)]
    updated_at: Timestamp,
}

impl EscalationRecord {
    /// A new active record seeded with `messages`.
    pub fn open(
        customer_id: UserId,
        customer_display_name: impl Into<String>,
        thread_id: ThreadId,
        messages: Vec<TranscriptEntry>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            customer_id,
            customer_display_name: customer_display_name.into(),
            thread_id,
            messages,
            created_at: now,
            status: EscalationStatus::Active,
            updated_at: now,
        }
    }

    pub fn customer_id(&self) -> &UserId {
        &self.customer_id
    }

    pub fn customer_display_name(&self) -> &str {
        &self.customer_display_name
    }

    pub fn thread_id(&self) -> &ThreadId {
        &self.thread_id
    }

    pub fn messages(&self) -> &[TranscriptEntry] {
        &self.messages
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn status(&self) -> EscalationStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Fails unless the record is active.
    pub fn ensure_active(&self) -> Result<(), EscalationError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(EscalationError::Inactive {
                thread_id: self.thread_id.clone(),
                status: self.status,
            })
        }
    }

    /// Appends to the local mirror of an active thread.
    pub fn append(&mut self, entry: TranscriptEntry) -> Result<(), EscalationError> {
        self.ensure_active()?;
        self.messages.push(entry);
        self.touch();
        Ok(())
    }

    /// Replaces the local mirror of an active thread.
    pub fn replace_messages(&mut self, messages: Vec<TranscriptEntry>) -> Result<(), EscalationError> {
        self.ensure_active()?;
        self.messages = messages;
        self.touch();
        Ok(())
    }

    /// Moves an active record to `Disconnected`.
    ///
    /// Returns `false` without changes when the record is already inactive.
    pub fn disconnect(&mut self, notice: Option<TranscriptEntry>) -> bool {
        if !self.is_active() {
            return false;
        }
        if let Some(notice) = notice {
            self.messages.push(notice);
        }
        self.status = EscalationStatus::Disconnected;
        self.touch();
        true
    }

    /// Moves the record to `Closed`. Closing a closed record is a no-op.
    pub fn close(&mut self) -> Result<bool, EscalationError> {
        if self.status == EscalationStatus::Closed {
            return Ok(false);
        }
        self.status = self.status.transition_to(EscalationStatus::Closed)?;
        self.touch();
        Ok(true)
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}
