//! Application configuration module
//!
//! Configuration is read from environment variables with the `AGENT_HANDOFF`
//! prefix, nested values separated by double underscores. A `.env` file is
//! loaded first when present.
//!
//! # Example
//!
//! ```no_run
//! use agent_handoff::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod ai;
mod channel;
mod customers;
mod error;
mod ledger;
mod server;

pub use ai::AiConfig;
pub use channel::ChannelConfig;
pub use customers::CustomersConfig;
pub use error::{ConfigError, ValidationError};
pub use ledger::LedgerConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a
/// development setup with keyword classification and an in-memory channel.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Language model provider (optional)
    #[serde(default)]
    pub ai: AiConfig,

    /// Hand-off channel service
    #[serde(default)]
    pub channel: ChannelConfig,

    #[serde(default)]
    pub ledger: LedgerConfig,

    #[serde(default)]
    pub customers: CustomersConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// - `AGENT_HANDOFF__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `AGENT_HANDOFF__CHANNEL__ENDPOINT=...` -> `channel.endpoint = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("AGENT_HANDOFF")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.channel.validate(&self.server.environment)?;
        self.ledger.validate()?;
        self.customers.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "AGENT_HANDOFF__SERVER__PORT",
        "AGENT_HANDOFF__SERVER__ENVIRONMENT",
        "AGENT_HANDOFF__AI__API_KEY",
        "AGENT_HANDOFF__CHANNEL__ENDPOINT",
        "AGENT_HANDOFF__CHANNEL__IDENTITY",
        "AGENT_HANDOFF__CHANNEL__ACCESS_KEY",
        "AGENT_HANDOFF__LEDGER__SEED_WINDOW",
    ];

    fn set_channel_env() {
        env::set_var("AGENT_HANDOFF__CHANNEL__ENDPOINT", "https://chat.example.com");
        env::set_var("AGENT_HANDOFF__CHANNEL__IDENTITY", "8:acs:bot");
        env::set_var("AGENT_HANDOFF__CHANNEL__ACCESS_KEY", "secret");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert!(!config.ai.is_configured());
        assert!(!config.channel.is_configured());
        assert_eq!(config.ledger.seed_window, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_channel_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_channel_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.channel.is_configured());
        assert_eq!(config.channel.identity.as_deref(), Some("8:acs:bot"));
    }

    #[test]
    fn test_custom_server_port() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("AGENT_HANDOFF__SERVER__PORT", "3000");
        env::set_var("AGENT_HANDOFF__LEDGER__SEED_WINDOW", "10");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.ledger.seed_window, 10);
    }

    #[test]
    fn test_production_requires_channel() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("AGENT_HANDOFF__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_production_with_channel_is_valid() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("AGENT_HANDOFF__SERVER__ENVIRONMENT", "production");
        set_channel_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.validate().is_ok());
    }
}
