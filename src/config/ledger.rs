//! Escalation ledger and conversation window configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

const MAX_WINDOW: usize = 200;

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Directory holding one YAML file per escalation
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Recent messages a new hand-off thread is seeded with
    #[serde(default = "default_seed_window")]
    pub seed_window: usize,

    /// Earlier messages offered to the classifier
    #[serde(default = "default_context_window")]
    pub context_window: usize,
}

impl LedgerConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("LEDGER__DATA_DIR"));
        }
        if self.seed_window == 0 || self.seed_window > MAX_WINDOW {
            return Err(ValidationError::InvalidWindow("seed_window"));
        }
        if self.context_window == 0 || self.context_window > MAX_WINDOW {
            return Err(ValidationError::InvalidWindow("context_window"));
        }
        Ok(())
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            seed_window: default_seed_window(),
            context_window: default_context_window(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data/escalations")
}

fn default_seed_window() -> usize {
    20
}

fn default_context_window() -> usize {
    5
}
