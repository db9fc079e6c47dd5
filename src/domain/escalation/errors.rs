use thiserror::Error;

use crate::domain::foundation::{ThreadId, ValidationError};

use super::EscalationStatus;

/// Errors raised by escalation record operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscalationError {
    #[error("escalation {thread_id} is not active (status: {status})")]
    Inactive {
        thread_id: ThreadId,
        status: EscalationStatus,
    },

    #[error(transparent)]
    InvalidTransition(#[from] ValidationError),
}
