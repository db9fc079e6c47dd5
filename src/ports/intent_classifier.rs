//! Intent classifier port.
//!
//! A classifier maps one inbound message (plus a little context) onto one of
//! the intents it is offered. Implementations return the raw label; the
//! domain resolves it against the offered set, so an unexpected label can
//! never trigger an escalation.

use async_trait::async_trait;

use crate::domain::conversation::Message;
use crate::domain::routing::IntentSet;

use super::AIError;

/// Input to a single classification.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRequest<'a> {
    /// The message to classify.
    pub text: &'a str,
    /// Recent conversation history, oldest first.
    pub context: &'a [Message],
    /// Intents the classifier may choose from.
    pub intents: &'a IntentSet,
}

/// Port for message classification.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Returns an intent name from `request.intents` or the `general_query`
    /// sentinel.
    async fn classify(&self, request: ClassificationRequest<'_>) -> Result<String, ClassifierError>;
}

/// Classification failures. Callers treat every variant as "no match".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    #[error("classifier rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },
}

impl From<AIError> for ClassifierError {
    fn from(err: AIError) -> Self {
        match err {
            AIError::RateLimited { retry_after_secs } => ClassifierError::RateLimited { retry_after_secs },
            other => ClassifierError::Unavailable(other.to_string()),
        }
    }
}
