//! Conversation store port.

use async_trait::async_trait;

use crate::domain::conversation::ConversationState;
use crate::domain::foundation::UserId;

/// Holds one `ConversationState` per user identity.
///
/// The store does not serialize writers; callers hold the identity's
/// exclusive section across load and save.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn find(&self, user_id: &UserId) -> Result<Option<ConversationState>, ConversationStoreError>;

    /// Returns the stored state or a fresh one for a first-time identity.
    ///
    /// A fresh state is not persisted until `save` is called.
    async fn load_or_create(&self, user_id: &UserId) -> Result<ConversationState, ConversationStoreError> {
        Ok(self
            .find(user_id)
            .await?
            .unwrap_or_else(|| ConversationState::new(user_id.clone())))
    }

    async fn save(&self, state: &ConversationState) -> Result<(), ConversationStoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversationStoreError {
    #[error("conversation store unavailable: {0}")]
    Unavailable(String),
}
