//! In-memory customer directory for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::customer::{normalize_phone_number, CustomerProfile};
use crate::domain::foundation::UserId;
use crate::ports::{CustomerDirectory, CustomerDirectoryError};

#[derive(Debug, Clone, Default)]
pub struct InMemoryCustomerDirectory {
    profiles: Arc<RwLock<HashMap<String, CustomerProfile>>>,
    unavailable: Arc<RwLock<bool>>,
}

impl InMemoryCustomerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, profile: CustomerProfile) {
        self.profiles
            .write()
            .await
            .insert(normalize_phone_number(&profile.phone_number), profile);
    }

    /// Makes every lookup fail until reset.
    pub async fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write().await = unavailable;
    }
}

#[async_trait]
impl CustomerDirectory for InMemoryCustomerDirectory {
    async fn lookup(&self, user_id: &UserId) -> Result<Option<CustomerProfile>, CustomerDirectoryError> {
        if *self.unavailable.read().await {
            return Err(CustomerDirectoryError::Unavailable("directory offline".to_string()));
        }
        Ok(self
            .profiles
            .read()
            .await
            .get(&normalize_phone_number(user_id.as_str()))
            .cloned())
    }
}
