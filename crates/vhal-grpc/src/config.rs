//! Bridge configuration
//!
//! Loaded from TOML. Every section and field is optional:
//!
//! ```toml
//! [server]
//! address = "http://127.0.0.1:50051"
//! connect_timeout_ms = 5000
//!
//! [stream]
//! reconnect = true
//! initial_backoff_ms = 100
//! max_backoff_ms = 10000
//!
//! [get_values]
//! max_attempts = 5
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::bridge::BridgeOptions;
use crate::error::BridgeError;

/// Configuration for a gRPC bridge
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub get_values: GetValuesConfig,
}

impl BridgeConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, BridgeError> {
        let config: BridgeConfig =
            toml::from_str(content).map_err(|e| BridgeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| BridgeError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.server.address.trim().is_empty() {
            return Err(BridgeError::Config("server.address must not be empty".into()));
        }
        if self.get_values.max_attempts == 0 {
            return Err(BridgeError::Config(
                "get_values.max_attempts must be at least 1".into(),
            ));
        }
        if self.stream.initial_backoff_ms == 0 {
            return Err(BridgeError::Config(
                "stream.initial_backoff_ms must be at least 1".into(),
            ));
        }
        if self.stream.initial_backoff_ms > self.stream.max_backoff_ms {
            return Err(BridgeError::Config(format!(
                "stream.initial_backoff_ms ({}) exceeds stream.max_backoff_ms ({})",
                self.stream.initial_backoff_ms, self.stream.max_backoff_ms
            )));
        }
        Ok(())
    }

    /// Runtime options of the bridge built from this config
    pub fn options(&self) -> BridgeOptions {
        BridgeOptions {
            stream: self.stream.clone(),
            max_get_values_attempts: self.get_values.max_attempts,
        }
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

/// Remote vehicle server endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server URI, e.g. "http://10.0.2.2:50051"
    #[serde(default = "default_address")]
    pub address: String,
    /// Timeout of each connection attempt in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
}

impl ServerConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            connect_timeout_ms: default_connect_timeout(),
        }
    }
}

fn default_address() -> String {
    "http://127.0.0.1:50051".to_string()
}

fn default_connect_timeout() -> u64 {
    5000
}

// =============================================================================
// Value Stream Configuration
// =============================================================================

/// Property value stream reconnection policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Reopen the stream after it ends. When false the first end is terminal.
    #[serde(default = "default_reconnect")]
    pub reconnect: bool,
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
}

impl StreamConfig {
    /// Never shorter than 1ms, so doubling always makes progress
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms.max(1))
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            reconnect: default_reconnect(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
        }
    }
}

fn default_reconnect() -> bool {
    true
}

fn default_initial_backoff() -> u64 {
    100
}

fn default_max_backoff() -> u64 {
    10_000
}

// =============================================================================
// GetValues Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetValuesConfig {
    /// RPC attempts per `get_values` call before giving up with TRY_AGAIN
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

impl Default for GetValuesConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_max_attempts() -> usize {
    5
}
