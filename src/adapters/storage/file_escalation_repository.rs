//! File-based Escalation Repository Adapter
//!
//! Stores one YAML document per hand-off thread under a base directory.
//! Writes go to a temporary file that is renamed over the target, so a
//! reader never observes a half-written record.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use crate::domain::escalation::EscalationRecord;
use crate::domain::foundation::{ThreadId, UserId};
use crate::ports::{EscalationRepository, EscalationRepositoryError};

const RECORD_EXTENSION: &str = "yaml";

/// File-based storage for escalation records
#[derive(Debug, Clone)]
pub struct FileEscalationRepository {
    base_path: PathBuf,
}

impl FileEscalationRepository {
    /// Create a repository rooted at `base_path`
    ///
    /// # Example
    /// ```ignore
    /// let repository = FileEscalationRepository::new("./data/escalations");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn record_path(&self, thread_id: &ThreadId) -> PathBuf {
        self.base_path
            .join(format!("{}.{}", thread_id.file_stem(), RECORD_EXTENSION))
    }

    async fn ensure_dir(&self) -> Result<(), EscalationRepositoryError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| EscalationRepositoryError::Io(e.to_string()))
    }

    async fn read_record(path: &Path) -> Result<Option<EscalationRecord>, EscalationRepositoryError> {
        let yaml = match fs::read_to_string(path).await {
            Ok(yaml) => yaml,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(EscalationRepositoryError::Io(e.to_string())),
        };

        serde_yaml::from_str(&yaml)
            .map(Some)
            .map_err(|e| EscalationRepositoryError::Corrupt {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl EscalationRepository for FileEscalationRepository {
    async fn save(&self, record: &EscalationRecord) -> Result<(), EscalationRepositoryError> {
        self.ensure_dir().await?;

        let yaml = serde_yaml::to_string(record)
            .map_err(|e| EscalationRepositoryError::Serialization(e.to_string()))?;

        let target = self.record_path(record.thread_id());
        let temp = self
            .base_path
            .join(format!(".{}.{}.tmp", record.thread_id().file_stem(), Uuid::new_v4()));

        fs::write(&temp, yaml)
            .await
            .map_err(|e| EscalationRepositoryError::Io(e.to_string()))?;

        if let Err(e) = fs::rename(&temp, &target).await {
            let _ = fs::remove_file(&temp).await;
            return Err(EscalationRepositoryError::Io(e.to_string()));
        }

        Ok(())
    }

    async fn find(&self, thread_id: &ThreadId) -> Result<Option<EscalationRecord>, EscalationRepositoryError> {
        Self::read_record(&self.record_path(thread_id)).await
    }

    async fn find_active_for(
        &self,
        customer_id: &UserId,
    ) -> Result<Option<EscalationRecord>, EscalationRepositoryError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|record| record.customer_id() == customer_id && record.is_active())
            .max_by_key(|record| record.created_at()))
    }

    async fn list(&self) -> Result<Vec<EscalationRecord>, EscalationRepositoryError> {
        let mut entries = match fs::read_dir(&self.base_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(EscalationRepositoryError::Io(e.to_string())),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| EscalationRepositoryError::Io(e.to_string()))?
        {
            let path = entry.path();
            let is_record = path
                .extension()
                .map(|ext| ext == RECORD_EXTENSION)
                .unwrap_or(false);
            if !is_record {
                continue;
            }
            match Self::read_record(&path).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e @ EscalationRepositoryError::Corrupt { .. }) => {
                    tracing::warn!(error = %e, "Skipping unreadable escalation record");
                }
                Err(e) => return Err(e),
            }
        }

        records.sort_by_key(|record| record.created_at());
        Ok(records)
    }

    async fn delete(&self, thread_id: &ThreadId) -> Result<(), EscalationRepositoryError> {
        match fs::remove_file(self.record_path(thread_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EscalationRepositoryError::Io(e.to_string())),
        }
    }
}
