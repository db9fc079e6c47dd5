//! Escalation repository port.
//!
//! Durable, keyed storage of escalation records. Every method reads or
//! writes the backing store directly; implementations must not serve
//! reads from a process-local cache, since operators may change a
//! record's status out of band.

use async_trait::async_trait;

use crate::domain::escalation::EscalationRecord;
use crate::domain::foundation::{ThreadId, UserId};

#[async_trait]
pub trait EscalationRepository: Send + Sync {
    /// Inserts or replaces the record keyed by its thread id.
    ///
    /// A save is atomic: readers see either the previous record or the new one.
    async fn save(&self, record: &EscalationRecord) -> Result<(), EscalationRepositoryError>;

    async fn find(&self, thread_id: &ThreadId) -> Result<Option<EscalationRecord>, EscalationRepositoryError>;

    /// The active record for `customer_id`, if any.
    async fn find_active_for(
        &self,
        customer_id: &UserId,
    ) -> Result<Option<EscalationRecord>, EscalationRepositoryError>;

    async fn list(&self) -> Result<Vec<EscalationRecord>, EscalationRepositoryError>;

    /// Removes the record. Removing an unknown thread is not an error.
    async fn delete(&self, thread_id: &ThreadId) -> Result<(), EscalationRepositoryError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EscalationRepositoryError {
    #[error("escalation storage I/O failed: {0}")]
    Io(String),

    #[error("escalation record could not be serialized: {0}")]
    Serialization(String),

    #[error("escalation record {path} is corrupt: {reason}")]
    Corrupt { path: String, reason: String },
}
