//! In-Memory Escalation Repository Adapter
//!
//! Keeps escalation records in memory. Useful for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::escalation::EscalationRecord;
use crate::domain::foundation::{ThreadId, UserId};
use crate::ports::{EscalationRepository, EscalationRepositoryError};

/// In-memory storage for escalation records
#[derive(Debug, Clone, Default)]
pub struct InMemoryEscalationRepository {
    records: Arc<RwLock<HashMap<ThreadId, EscalationRecord>>>,
}

impl InMemoryEscalationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl EscalationRepository for InMemoryEscalationRepository {
    async fn save(&self, record: &EscalationRecord) -> Result<(), EscalationRepositoryError> {
        self.records
            .write()
            .await
            .insert(record.thread_id().clone(), record.clone());
        Ok(())
    }

    async fn find(&self, thread_id: &ThreadId) -> Result<Option<EscalationRecord>, EscalationRepositoryError> {
        Ok(self.records.read().await.get(thread_id).cloned())
    }

    async fn find_active_for(
        &self,
        customer_id: &UserId,
    ) -> Result<Option<EscalationRecord>, EscalationRepositoryError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|record| record.customer_id() == customer_id && record.is_active())
            .max_by_key(|record| record.created_at())
            .cloned())
    }

    async fn list(&self) -> Result<Vec<EscalationRecord>, EscalationRepositoryError> {
        let mut records: Vec<_> = self.records.read().await.values().cloned().collect();
        records.sort_by_key(|record| record.created_at());
        Ok(records)
    }

    async fn delete(&self, thread_id: &ThreadId) -> Result<(), EscalationRepositoryError> {
        self.records.write().await.remove(thread_id);
        Ok(())
    }
}
