//! Conversation domain module.
//!
//! Per-user conversation history, the agent that currently owns it, and
//! the dispatch state the router keys its decisions on.

mod agent_role;
mod media;
mod message;
mod state;

pub use agent_role::{AgentRole, DispatchState};
pub use media::MediaKind;
pub use message::{Message, MessageRole};
pub use state::ConversationState;
