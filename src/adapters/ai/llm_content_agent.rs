//! LLM-backed content agent.
//!
//! Fixed questions (identity, help, greetings, policy look-ups) are answered
//! by the rule-based agent without a model call. Everything else goes to the
//! provider with the customer snapshot as system prompt and the previous
//! hand-off summary as context.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::conversation::{AgentRole, MessageRole as HistoryRole};
use crate::ports::{
    AIProvider, CompletionRequest, ContentAgent, ContentAgentError, ContentReply, ContentRequest, MessageRole,
    RequestMetadata,
};

use super::RuleBasedContentAgent;

const HISTORY_WINDOW: usize = 10;
const NO_CUSTOMER: &str = "No customer information available";

pub struct LlmContentAgent {
    provider: Arc<dyn AIProvider>,
    rules: RuleBasedContentAgent,
}

impl LlmContentAgent {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self {
            provider,
            rules: RuleBasedContentAgent::new(),
        }
    }

    fn system_prompt(request: &ContentRequest<'_>) -> String {
        let snapshot = request
            .conversation
            .customer_profile_snapshot()
            .map(str::to_string)
            .or_else(|| request.customer.map(|c| c.snapshot()))
            .unwrap_or_else(|| NO_CUSTOMER.to_string());

        format!(
            "You are a helpful insurance customer service assistant. Answer briefly and politely.\n\n{}",
            snapshot
        )
    }
}

#[async_trait]
impl ContentAgent for LlmContentAgent {
    async fn respond(&self, request: ContentRequest<'_>) -> Result<ContentReply, ContentAgentError> {
        if let Some(reply) = self.rules.quick_reply(request.text, request.customer) {
            return Ok(reply);
        }

        let mut completion = CompletionRequest::new(RequestMetadata::new("respond", Uuid::new_v4().to_string()))
            .with_system_prompt(Self::system_prompt(&request))
            .with_temperature(0.7)
            .with_max_tokens(150);

        if let Some(summary) = request.conversation.last_summary() {
            completion = completion.with_message(
                MessageRole::System,
                format!("Summary of the earlier conversation: {}", summary),
            );
        }

        // The current user message is already the last history entry.
        for message in request.conversation.recent_messages(HISTORY_WINDOW) {
            let role = match message.role() {
                HistoryRole::User => MessageRole::User,
                HistoryRole::Agent => MessageRole::Assistant,
            };
            completion = completion.with_message(role, message.text());
        }

        let text = self.provider.complete(completion).await?.content.trim().to_string();
        if text.is_empty() {
            return Err(ContentAgentError::EmptyReply);
        }

        let agent = match request.customer {
            Some(profile) if profile.mentioned_policy(request.text).is_some() => AgentRole::PolicyAgent,
            _ => AgentRole::CustomerAgent,
        };
        Ok(ContentReply::new(agent, text))
    }
}
