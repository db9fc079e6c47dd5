//! Customer directory configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct CustomersConfig {
    /// JSON document with `{"customers": [...]}`
    #[serde(default = "default_directory_path")]
    pub directory_path: PathBuf,
}

impl CustomersConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.directory_path.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("CUSTOMERS__DIRECTORY_PATH"));
        }
        Ok(())
    }
}

impl Default for CustomersConfig {
    fn default() -> Self {
        Self {
            directory_path: default_directory_path(),
        }
    }
}

fn default_directory_path() -> PathBuf {
    PathBuf::from("data/customers.json")
}
