//! Escalation ledger.
//!
//! Owns every escalation record and keeps the external hand-off thread and
//! its local transcript mirror in step. Operations for one customer (on
//! create) or one thread (on everything else) are serialized; reads always go
//! to the repository.

use std::sync::Arc;
use thiserror::Error;

use crate::domain::escalation::{
    escalation_topic, EscalationError, EscalationRecord, EscalationStatus, TranscriptEntry, TranscriptRole,
    CUSTOMER_DISCONNECTED_NOTICE,
};
use crate::domain::foundation::{ThreadId, UserId};
use crate::ports::{ChannelTransport, EscalationRepository, EscalationRepositoryError, ThreadPost, TransportError};

use super::IdentityLocks;

/// Default number of recent messages a new hand-off thread is seeded with.
pub const DEFAULT_SEED_WINDOW: usize = 20;

/// Errors surfaced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("escalation not found: {0}")]
    NotFound(ThreadId),

    #[error("escalation {thread_id} is not active (status: {status})")]
    InactiveEscalation {
        thread_id: ThreadId,
        status: EscalationStatus,
    },

    #[error("channel is rate limited")]
    RateLimited { retry_after_secs: Option<u32> },

    #[error("channel transport failed: {0}")]
    Transport(String),

    #[error("escalation storage failed: {0}")]
    Storage(String),

    #[error("invalid escalation transition: {0}")]
    InvalidTransition(String),
}

impl From<TransportError> for LedgerError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::RateLimited { retry_after_secs } => LedgerError::RateLimited { retry_after_secs },
            other => LedgerError::Transport(other.to_string()),
        }
    }
}

impl From<EscalationRepositoryError> for LedgerError {
    fn from(err: EscalationRepositoryError) -> Self {
        LedgerError::Storage(err.to_string())
    }
}

impl From<EscalationError> for LedgerError {
    fn from(err: EscalationError) -> Self {
        match err {
            EscalationError::Inactive { thread_id, status } => LedgerError::InactiveEscalation { thread_id, status },
            EscalationError::InvalidTransition(e) => LedgerError::InvalidTransition(e.to_string()),
        }
    }
}

/// Request to open (or reuse) a hand-off for a customer.
#[derive(Debug, Clone)]
pub struct EscalationRequest {
    pub customer_id: UserId,
    pub customer_display_name: String,
    /// Recent conversation, oldest first. Only the seed window is used.
    pub recent_messages: Vec<TranscriptEntry>,
}

/// Result of `create_or_reuse`.
#[derive(Debug, Clone)]
pub struct EscalationHandle {
    pub record: EscalationRecord,
    /// `true` when an already active record was returned.
    pub reused: bool,
}

impl EscalationHandle {
    pub fn thread_id(&self) -> &ThreadId {
        self.record.thread_id()
    }
}

pub struct EscalationLedger {
    repository: Arc<dyn EscalationRepository>,
    transport: Arc<dyn ChannelTransport>,
    customer_locks: IdentityLocks<UserId>,
    thread_locks: IdentityLocks<ThreadId>,
    seed_window: usize,
}

impl EscalationLedger {
    pub fn new(repository: Arc<dyn EscalationRepository>, transport: Arc<dyn ChannelTransport>) -> Self {
        Self {
            repository,
            transport,
            customer_locks: IdentityLocks::new(),
            thread_locks: IdentityLocks::new(),
            seed_window: DEFAULT_SEED_WINDOW,
        }
    }

    pub fn with_seed_window(mut self, seed_window: usize) -> Self {
        self.seed_window = seed_window;
        self
    }

    /// Returns the customer's active escalation, or opens a new thread seeded
    /// with the most recent messages.
    pub async fn create_or_reuse(&self, request: EscalationRequest) -> Result<EscalationHandle, LedgerError> {
        let _guard = self.customer_locks.acquire(&request.customer_id).await;

        if let Some(record) = self.repository.find_active_for(&request.customer_id).await? {
            tracing::info!(
                user_id = %request.customer_id.masked(),
                thread_id = %record.thread_id(),
                "Reusing active escalation"
            );
            return Ok(EscalationHandle { record, reused: true });
        }

        let start = request.recent_messages.len().saturating_sub(self.seed_window);
        let seed: Vec<TranscriptEntry> = request.recent_messages[start..].to_vec();
        let posts: Vec<ThreadPost> = seed
            .iter()
            .map(|entry| ThreadPost::new(entry.sender_label(&request.customer_display_name), &entry.text))
            .collect();

        let topic = escalation_topic(&request.customer_display_name, &request.customer_id.masked());
        let thread_id = self.transport.create_thread(&topic, &posts).await?;

        let record = EscalationRecord::open(
            request.customer_id.clone(),
            request.customer_display_name,
            thread_id,
            seed,
        );
        self.repository.save(&record).await?;

        tracing::info!(
            user_id = %request.customer_id.masked(),
            thread_id = %record.thread_id(),
            seed_messages = record.messages().len(),
            "Escalation opened"
        );
        Ok(EscalationHandle { record, reused: false })
    }

    /// Posts one message to an active thread and records it in the mirror.
    pub async fn append_message(
        &self,
        thread_id: &ThreadId,
        role: TranscriptRole,
        text: &str,
    ) -> Result<(), LedgerError> {
        let _guard = self.thread_locks.acquire(thread_id).await;

        let mut record = self.load(thread_id).await?;
        record.ensure_active()?;

        let entry = TranscriptEntry::new(role, text);
        self.transport
            .send_message(thread_id, entry.sender_label(record.customer_display_name()), &entry.text)
            .await?;

        record.append(entry)?;
        self.repository.save(&record).await?;
        Ok(())
    }

    /// Re-posts `messages` to an active thread and makes them the mirror.
    pub async fn replace_messages(
        &self,
        thread_id: &ThreadId,
        messages: Vec<TranscriptEntry>,
    ) -> Result<(), LedgerError> {
        let _guard = self.thread_locks.acquire(thread_id).await;

        let mut record = self.load(thread_id).await?;
        record.ensure_active()?;

        for entry in &messages {
            self.transport
                .send_message(thread_id, entry.sender_label(record.customer_display_name()), &entry.text)
                .await?;
        }

        record.replace_messages(messages)?;
        self.repository.save(&record).await?;
        Ok(())
    }

    /// Marks the escalation Disconnected after posting a notice to the
    /// thread. Disconnecting an inactive escalation succeeds without changes.
    pub async fn disconnect(&self, thread_id: &ThreadId) -> Result<EscalationRecord, LedgerError> {
        let _guard = self.thread_locks.acquire(thread_id).await;

        let mut record = self.load(thread_id).await?;
        if !record.is_active() {
            tracing::debug!(thread_id = %thread_id, status = %record.status(), "Escalation already inactive");
            return Ok(record);
        }

        let notice = TranscriptEntry::system(CUSTOMER_DISCONNECTED_NOTICE);
        let posted = match self
            .transport
            .send_message(thread_id, notice.sender_label(record.customer_display_name()), &notice.text)
            .await
        {
            Ok(_) => Some(notice),
            Err(e) => {
                tracing::warn!(thread_id = %thread_id, error = %e, "Failed to post disconnect notice");
                None
            }
        };

        record.disconnect(posted);
        self.repository.save(&record).await?;
        tracing::info!(thread_id = %thread_id, "Escalation disconnected");
        Ok(record)
    }

    /// Administrative close. No channel I/O.
    pub async fn close(&self, thread_id: &ThreadId) -> Result<EscalationRecord, LedgerError> {
        let _guard = self.thread_locks.acquire(thread_id).await;

        let mut record = self.load(thread_id).await?;
        if record.close()? {
            self.repository.save(&record).await?;
            tracing::info!(thread_id = %thread_id, "Escalation closed");
        }
        Ok(record)
    }

    pub async fn get(&self, thread_id: &ThreadId) -> Result<Option<EscalationRecord>, LedgerError> {
        Ok(self.repository.find(thread_id).await?)
    }

    pub async fn active_for(&self, customer_id: &UserId) -> Result<Option<EscalationRecord>, LedgerError> {
        Ok(self.repository.find_active_for(customer_id).await?)
    }

    /// Deletes the external thread and the record of every inactive
    /// escalation. Returns how many records were purged.
    pub async fn purge_inactive(&self) -> Result<usize, LedgerError> {
        let inactive: Vec<ThreadId> = self
            .repository
            .list()
            .await?
            .into_iter()
            .filter(|record| !record.is_active())
            .map(|record| record.thread_id().clone())
            .collect();

        let mut purged = 0;
        for thread_id in inactive {
            let _guard = self.thread_locks.acquire(&thread_id).await;

            // Re-read under the lock; the record may have changed or gone.
            match self.repository.find(&thread_id).await? {
                Some(record) if !record.is_active() => {}
                _ => continue,
            }

            match self.transport.delete_thread(&thread_id).await {
                Ok(()) | Err(TransportError::ThreadNotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
            self.repository.delete(&thread_id).await?;
            purged += 1;
        }

        tracing::info!(purged, "Inactive escalations purged");
        Ok(purged)
    }

    async fn load(&self, thread_id: &ThreadId) -> Result<EscalationRecord, LedgerError> {
        self.repository
            .find(thread_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(thread_id.clone()))
    }
}
