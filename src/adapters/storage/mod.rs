//! Storage adapters for conversation state and escalation records.
//!
//! - `FileEscalationRepository` - one YAML file per hand-off thread
//! - `InMemoryEscalationRepository` - for tests and development
//! - `InMemoryConversationStore` - process-lifetime conversation state

mod file_escalation_repository;
mod in_memory_conversation_store;
mod in_memory_escalation_repository;

pub use file_escalation_repository::FileEscalationRepository;
pub use in_memory_conversation_store::InMemoryConversationStore;
pub use in_memory_escalation_repository::InMemoryEscalationRepository;
