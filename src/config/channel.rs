//! Channel transport configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// Hand-off channel configuration.
///
/// When endpoint, identity and access key are all absent the service runs
/// against an in-memory channel (development only).
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    /// Chat-thread service base URL
    pub endpoint: Option<String>,

    /// Identity threads are created under
    pub identity: Option<String>,

    /// Key used to sign credential requests
    pub access_key: Option<String>,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Credential lifetime assumed when the service does not report one
    #[serde(default = "default_token_lifetime")]
    pub token_lifetime_secs: u64,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Base URL for the thread link shown to users
    pub thread_link_base: Option<String>,
}

impl ChannelConfig {
    pub fn is_configured(&self) -> bool {
        [&self.endpoint, &self.identity, &self.access_key]
            .iter()
            .all(|value| value.as_ref().is_some_and(|v| !v.trim().is_empty()))
    }

    fn is_partially_configured(&self) -> bool {
        [&self.endpoint, &self.identity, &self.access_key]
            .iter()
            .any(|value| value.is_some())
    }

    pub fn token_lifetime(&self) -> Duration {
        Duration::from_secs(self.token_lifetime_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate channel configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if !self.is_configured() {
            if *environment == Environment::Production {
                return Err(ValidationError::MissingRequired("CHANNEL__ENDPOINT"));
            }
            if self.is_partially_configured() {
                let missing = if self.endpoint.is_none() {
                    "CHANNEL__ENDPOINT"
                } else if self.identity.is_none() {
                    "CHANNEL__IDENTITY"
                } else {
                    "CHANNEL__ACCESS_KEY"
                };
                return Err(ValidationError::MissingRequired(missing));
            }
            return Ok(());
        }

        let endpoint = self.endpoint.as_deref().unwrap_or_default();
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(ValidationError::InvalidUrl("channel.endpoint"));
        }
        if *environment == Environment::Production && !endpoint.starts_with("https://") {
            return Err(ValidationError::ChannelEndpointMustBeHttps);
        }
        if self.token_lifetime_secs < 600 || self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            identity: None,
            access_key: None,
            api_version: default_api_version(),
            token_lifetime_secs: default_token_lifetime(),
            timeout_secs: default_timeout(),
            thread_link_base: None,
        }
    }
}

fn default_api_version() -> String {
    "2021-09-07".to_string()
}

fn default_token_lifetime() -> u64 {
    3600
}

fn default_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> ChannelConfig {
        ChannelConfig {
            endpoint: Some("https://chat.example.com".to_string()),
            identity: Some("8:acs:bot".to_string()),
            access_key: Some("key".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_unconfigured_allowed_in_development() {
        assert!(ChannelConfig::default().validate(&Environment::Development).is_ok());
    }

    #[test]
    fn test_unconfigured_rejected_in_production() {
        assert!(ChannelConfig::default().validate(&Environment::Production).is_err());
    }

    #[test]
    fn test_partial_configuration_names_missing_value() {
        let config = ChannelConfig {
            access_key: None,
            ..configured()
        };
        assert_eq!(
            config.validate(&Environment::Development),
            Err(ValidationError::MissingRequired("CHANNEL__ACCESS_KEY"))
        );
    }

    #[test]
    fn test_production_requires_https() {
        let config = ChannelConfig {
            endpoint: Some("http://chat.example.com".to_string()),
            ..configured()
        };
        assert!(config.validate(&Environment::Development).is_ok());
        assert_eq!(
            config.validate(&Environment::Production),
            Err(ValidationError::ChannelEndpointMustBeHttps)
        );
    }

    #[test]
    fn test_configured_is_valid() {
        assert!(configured().is_configured());
        assert!(configured().validate(&Environment::Production).is_ok());
    }
}
