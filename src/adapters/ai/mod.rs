//! AI Adapters.
//!
//! Language-model backed implementations of the classifier, summarizer and
//! content agent ports, plus deterministic fallbacks used when no model is
//! configured.
//!
//! ## Available Adapters
//!
//! - `OpenAIProvider` - OpenAI and Azure OpenAI chat completions
//! - `MockAIProvider` - Configurable mock for testing
//! - `LlmIntentClassifier` / `KeywordIntentClassifier` - `IntentClassifier`
//! - `LlmSummarizer` / `TranscriptSummarizer` - `ConversationSummarizer`
//! - `LlmContentAgent` / `RuleBasedContentAgent` - `ContentAgent`

mod keyword_intent_classifier;
mod llm_content_agent;
mod llm_intent_classifier;
mod llm_summarizer;
mod mock_provider;
mod openai_provider;
mod rule_based_content_agent;

pub use keyword_intent_classifier::KeywordIntentClassifier;
pub use llm_content_agent::LlmContentAgent;
pub use llm_intent_classifier::LlmIntentClassifier;
pub use llm_summarizer::{LlmSummarizer, TranscriptSummarizer};
pub use mock_provider::{MockAIProvider, MockError, MockResponse};
pub use openai_provider::{ApiFlavor, OpenAIConfig, OpenAIProvider};
pub use rule_based_content_agent::{RuleBasedContentAgent, FALLBACK_REPLY, HELP_REPLY};
