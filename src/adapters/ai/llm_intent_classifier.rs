//! LLM-backed intent classifier.
//!
//! Renders the offered intents with their example phrases and the last few
//! context messages into a single prompt, and asks the model for the intent
//! name only.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::routing::GENERAL_QUERY;
use crate::ports::{
    AIProvider, ClassificationRequest, ClassifierError, CompletionRequest, IntentClassifier, MessageRole,
    RequestMetadata,
};

const SYSTEM_PROMPT: &str = "You are a helpful message classification assistant.";
const MAX_CONTEXT_MESSAGES: usize = 5;

/// Intent classifier built on an `AIProvider`.
pub struct LlmIntentClassifier {
    provider: Arc<dyn AIProvider>,
}

impl LlmIntentClassifier {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self { provider }
    }

    fn build_prompt(request: &ClassificationRequest<'_>) -> String {
        let names = serde_json::to_string(&request.intents.names()).unwrap_or_default();
        let examples = serde_json::to_string_pretty(&request.intents.examples_by_name()).unwrap_or_default();
        let meanings = request
            .intents
            .intents()
            .iter()
            .map(|intent| format!("- {}: {}", intent.name(), intent.description()))
            .collect::<Vec<_>>()
            .join("\n");

        let start = request.context.len().saturating_sub(MAX_CONTEXT_MESSAGES);
        let context = request.context[start..]
            .iter()
            .map(|m| m.as_context_line())
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Given the following message and conversation context, classify the message into one of these intents: {names}\n\n\
             {meanings}\n\n\
             Example messages for each intent:\n{examples}\n\n\
             Conversation context:\n{context}\n\n\
             Message to classify:\n{message}\n\n\
             Return ONLY the intent name, nothing else. If no intent matches, return \"{sentinel}\".",
            names = names,
            meanings = meanings,
            examples = examples,
            context = context,
            message = request.text,
            sentinel = GENERAL_QUERY,
        )
    }
}

#[async_trait]
impl IntentClassifier for LlmIntentClassifier {
    async fn classify(&self, request: ClassificationRequest<'_>) -> Result<String, ClassifierError> {
        let completion = CompletionRequest::new(RequestMetadata::new("classify", Uuid::new_v4().to_string()))
            .with_system_prompt(SYSTEM_PROMPT)
            .with_message(MessageRole::User, Self::build_prompt(&request))
            .with_temperature(0.0)
            .with_max_tokens(20);

        let response = self.provider.complete(completion).await?;
        let label = response.content.trim().to_lowercase();

        if request.intents.names().contains(&label.as_str()) {
            Ok(label)
        } else {
            Ok(GENERAL_QUERY.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::domain::conversation::{AgentRole, Message};
    use crate::domain::routing::{ALL_INTENTS, DISCONNECT_INTENTS};

    fn request<'a>(text: &'a str, context: &'a [Message], full: bool) -> ClassificationRequest<'a> {
        ClassificationRequest {
            text,
            context,
            intents: if full { &ALL_INTENTS } else { &DISCONNECT_INTENTS },
        }
    }

    #[tokio::test]
    async fn returns_label_from_offered_set() {
        let provider = Arc::new(MockAIProvider::new().with_response(" Needs_Agent \n"));
        let classifier = LlmIntentClassifier::new(provider.clone());

        let label = classifier.classify(request("speak to agent", &[], true)).await.unwrap();

        assert_eq!(label, "needs_agent");
    }

    #[tokio::test]
    async fn label_outside_offered_set_becomes_sentinel() {
        let provider = Arc::new(MockAIProvider::new().with_response("needs_agent"));
        let classifier = LlmIntentClassifier::new(provider);

        let label = classifier.classify(request("speak to agent", &[], false)).await.unwrap();

        assert_eq!(label, GENERAL_QUERY);
    }

    #[tokio::test]
    async fn prompt_lists_intents_examples_and_recent_context() {
        let provider = Arc::new(MockAIProvider::new().with_response("wants_disconnect"));
        let classifier = LlmIntentClassifier::new(provider.clone());
        let context: Vec<Message> = (0..7)
            .map(|i| Message::agent(AgentRole::CustomerAgent, format!("context-{}", i)))
            .collect();

        classifier.classify(request("bye", &context, false)).await.unwrap();

        let calls = provider.get_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].temperature, Some(0.0));
        assert_eq!(calls[0].max_tokens, Some(20));
        let prompt = &calls[0].messages[0].content;
        assert!(prompt.contains(r#"["wants_disconnect","confirms_disconnect"]"#));
        assert!(prompt.contains("\"end chat\""));
        assert!(prompt.contains("- wants_disconnect: User wants to end the conversation"));
        assert!(!prompt.contains("needs_rm"));
        assert!(prompt.contains("assistant: context-6"));
        assert!(!prompt.contains("context-1"));
        assert!(prompt.contains("Message to classify:\nbye"));
    }

    #[tokio::test]
    async fn provider_failure_is_unavailable() {
        let provider = Arc::new(MockAIProvider::new().with_error(MockError::Unavailable {
            message: "down".to_string(),
        }));
        let classifier = LlmIntentClassifier::new(provider);

        let err = classifier.classify(request("hi", &[], true)).await.unwrap_err();

        assert!(matches!(err, ClassifierError::Unavailable(_)));
    }
}
