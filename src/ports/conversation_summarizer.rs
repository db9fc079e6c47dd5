//! Conversation summarizer port.

use async_trait::async_trait;

use crate::domain::conversation::Message;

use super::AIError;

/// Produces the short summary shown to the user and the operator at hand-off.
#[async_trait]
pub trait ConversationSummarizer: Send + Sync {
    /// Summarizes `messages`, oldest first.
    async fn summarize(&self, messages: &[Message]) -> Result<String, SummarizerError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SummarizerError {
    #[error("summary provider failed: {0}")]
    Provider(#[from] AIError),

    #[error("summary was empty")]
    Empty,
}
