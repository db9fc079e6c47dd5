//! Customer directory loaded from a JSON document.
//!
//! The file holds `{"customers": [...]}` with camelCase profile fields. It is
//! read once at start-up and indexed by normalised phone number.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::domain::customer::{normalize_phone_number, CustomerProfile};
use crate::domain::foundation::UserId;
use crate::ports::{CustomerDirectory, CustomerDirectoryError};

#[derive(Deserialize)]
struct CustomerFile {
    customers: Vec<CustomerProfile>,
}

#[derive(Debug, Clone, Default)]
pub struct JsonCustomerDirectory {
    by_phone: HashMap<String, CustomerProfile>,
}

impl JsonCustomerDirectory {
    /// Reads and indexes the directory file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CustomerDirectoryError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CustomerDirectoryError::Unavailable(format!("{}: {}", path.display(), e)))?;
        let directory = Self::from_json(&raw)?;
        tracing::info!(path = %path.display(), customers = directory.len(), "Customer directory loaded");
        Ok(directory)
    }

    pub fn from_json(raw: &str) -> Result<Self, CustomerDirectoryError> {
        let file: CustomerFile =
            serde_json::from_str(raw).map_err(|e| CustomerDirectoryError::Malformed(e.to_string()))?;
        let by_phone = file
            .customers
            .into_iter()
            .map(|profile| (normalize_phone_number(&profile.phone_number), profile))
            .collect();
        Ok(Self { by_phone })
    }

    pub fn len(&self) -> usize {
        self.by_phone.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_phone.is_empty()
    }
}

#[async_trait]
impl CustomerDirectory for JsonCustomerDirectory {
    async fn lookup(&self, user_id: &UserId) -> Result<Option<CustomerProfile>, CustomerDirectoryError> {
        Ok(self.by_phone.get(&normalize_phone_number(user_id.as_str())).cloned())
    }
}
