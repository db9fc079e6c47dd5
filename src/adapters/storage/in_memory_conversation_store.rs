//! In-Memory Conversation Store Adapter
//!
//! Conversation state lives for the process lifetime. Session expiry, if
//! wanted, belongs to an external store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::ConversationState;
use crate::domain::foundation::UserId;
use crate::ports::{ConversationStore, ConversationStoreError};

/// In-memory storage for conversation state
#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationStore {
    states: Arc<RwLock<HashMap<UserId, ConversationState>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored conversations
    pub async fn len(&self) -> usize {
        self.states.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.states.read().await.is_empty()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn find(&self, user_id: &UserId) -> Result<Option<ConversationState>, ConversationStoreError> {
        Ok(self.states.read().await.get(user_id).cloned())
    }

    async fn save(&self, state: &ConversationState) -> Result<(), ConversationStoreError> {
        self.states
            .write()
            .await
            .insert(state.user_id().clone(), state.clone());
        Ok(())
    }
}
