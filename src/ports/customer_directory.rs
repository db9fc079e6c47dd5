//! Customer directory port.

use async_trait::async_trait;

use crate::domain::customer::CustomerProfile;
use crate::domain::foundation::UserId;

/// Read-only lookup of customer reference data by channel identity.
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    /// Returns the profile for `user_id`, or `None` for unknown identities.
    async fn lookup(&self, user_id: &UserId) -> Result<Option<CustomerProfile>, CustomerDirectoryError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustomerDirectoryError {
    #[error("customer directory unavailable: {0}")]
    Unavailable(String),

    #[error("customer directory is malformed: {0}")]
    Malformed(String),
}
