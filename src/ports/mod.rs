//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the routing core and the outside world. Adapters implement these ports.
//!
//! ## Capability Ports
//!
//! - `IntentClassifier` - Maps a message onto an offered intent set
//! - `ContentAgent` - Produces automated replies
//! - `ConversationSummarizer` - Summarizes history at hand-off
//! - `AIProvider` - Chat-completion backend the LLM adapters share
//!
//! ## Channel and Reference Data Ports
//!
//! - `ChannelTransport` - External thread service human operators work in
//! - `CustomerDirectory` - Customer profile lookup
//!
//! ## Storage Ports
//!
//! - `ConversationStore` - One conversation state per user identity
//! - `EscalationRepository` - Durable escalation records

mod ai_provider;
mod channel_transport;
mod content_agent;
mod conversation_store;
mod conversation_summarizer;
mod customer_directory;
mod escalation_repository;
mod intent_classifier;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message, MessageRole,
    ProviderInfo, RequestMetadata,
};
pub use channel_transport::{ChannelMessageId, ChannelTransport, ThreadPost, TransportError};
pub use content_agent::{ContentAgent, ContentAgentError, ContentReply, ContentRequest};
pub use conversation_store::{ConversationStore, ConversationStoreError};
pub use conversation_summarizer::{ConversationSummarizer, SummarizerError};
pub use customer_directory::{CustomerDirectory, CustomerDirectoryError};
pub use escalation_repository::{EscalationRepository, EscalationRepositoryError};
pub use intent_classifier::{ClassificationRequest, ClassifierError, IntentClassifier};
