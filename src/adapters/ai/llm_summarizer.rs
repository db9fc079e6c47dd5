//! Conversation summarizers used at hand-off.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::conversation::Message;
use crate::domain::routing::replies::fallback_summary;
use crate::ports::{AIProvider, CompletionRequest, ConversationSummarizer, MessageRole, RequestMetadata, SummarizerError};

const SYSTEM_PROMPT: &str =
    "You are a conversation summarizer. Create a brief summary of the key points from this conversation.";
const MAX_MESSAGES: usize = 20;

/// Summarizer that asks an `AIProvider` for a short summary.
pub struct LlmSummarizer {
    provider: Arc<dyn AIProvider>,
}

impl LlmSummarizer {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ConversationSummarizer for LlmSummarizer {
    async fn summarize(&self, messages: &[Message]) -> Result<String, SummarizerError> {
        let start = messages.len().saturating_sub(MAX_MESSAGES);
        let transcript = messages[start..]
            .iter()
            .map(|m| m.as_context_line())
            .collect::<Vec<_>>()
            .join("\n");

        let request = CompletionRequest::new(RequestMetadata::new("summarize", Uuid::new_v4().to_string()))
            .with_system_prompt(SYSTEM_PROMPT)
            .with_message(MessageRole::User, transcript)
            .with_temperature(0.3)
            .with_max_tokens(150);

        let summary = self.provider.complete(request).await?.content.trim().to_string();
        if summary.is_empty() {
            return Err(SummarizerError::Empty);
        }
        Ok(summary)
    }
}

/// Summarizer that never calls out: lists the customer's latest messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct TranscriptSummarizer;

#[async_trait]
impl ConversationSummarizer for TranscriptSummarizer {
    async fn summarize(&self, messages: &[Message]) -> Result<String, SummarizerError> {
        Ok(fallback_summary(messages))
    }
}
