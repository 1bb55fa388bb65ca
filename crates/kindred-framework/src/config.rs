//! Store configuration.
//!
//! ```toml
//! buffer_size = 64
//! log_payloads = true
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

const MAX_BUFFER_SIZE: usize = 65_536;

/// Settings of a [`StoreActor`](crate::actor::StoreActor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Capacity of the request channel. Clients wait when it is full.
    pub buffer_size: usize,
    /// Log full create/write payloads at debug level instead of field names.
    pub log_payloads: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            buffer_size: 32,
            log_payloads: false,
        }
    }
}

impl StoreConfig {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size,
            ..Self::default()
        }
    }

    pub fn with_payload_logging(mut self) -> Self {
        self.log_payloads = true;
        self
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.buffer_size == 0 {
            return Err("buffer_size must be greater than zero");
        }
        if self.buffer_size > MAX_BUFFER_SIZE {
            return Err("buffer_size must not exceed 65536");
        }
        Ok(())
    }

    /// Parses and validates a TOML document. Missing keys keep their default.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(StoreConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = StoreConfig::from_toml_str("log_payloads = true").unwrap();
        assert_eq!(config.buffer_size, 32);
        assert!(config.log_payloads);
    }

    #[test]
    fn zero_buffer_is_rejected() {
        assert!(matches!(
            StoreConfig::from_toml_str("buffer_size = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert_eq!(
            StoreConfig::new(MAX_BUFFER_SIZE + 1).validate(),
            Err("buffer_size must not exceed 65536")
        );
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            StoreConfig::from_toml_str("buffer_size = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
