//! Hand-off channel transport port.
//!
//! The external chat service that human operators work in. Credentials and
//! their refresh live entirely behind this port; callers only ever see
//! success, `RateLimited`, or a hard failure.

use async_trait::async_trait;

use crate::domain::foundation::ThreadId;

/// A message posted to a hand-off thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadPost {
    pub sender_label: String,
    pub text: String,
}

impl ThreadPost {
    pub fn new(sender_label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender_label: sender_label.into(),
            text: text.into(),
        }
    }
}

/// Channel-assigned id of a posted message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelMessageId(pub String);

/// Port for the human hand-off channel.
#[async_trait]
pub trait ChannelTransport: Send + Sync {
    /// Opens a thread titled `topic` and posts `seed` into it, in order.
    async fn create_thread(&self, topic: &str, seed: &[ThreadPost]) -> Result<ThreadId, TransportError>;

    /// Posts one message to an existing thread.
    async fn send_message(
        &self,
        thread_id: &ThreadId,
        sender_label: &str,
        text: &str,
    ) -> Result<ChannelMessageId, TransportError>;

    /// Deletes a thread.
    async fn delete_thread(&self, thread_id: &ThreadId) -> Result<(), TransportError>;
}

/// Transport failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The channel is shedding load; the call may succeed later.
    #[error("channel rate limited")]
    RateLimited { retry_after_secs: Option<u32> },

    #[error("thread not found: {0}")]
    ThreadNotFound(ThreadId),

    #[error("channel authentication failed: {0}")]
    Authentication(String),

    #[error("channel network error: {0}")]
    Network(String),

    #[error("unexpected channel response: {0}")]
    Protocol(String),
}

impl TransportError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, TransportError::RateLimited { .. })
    }
}
