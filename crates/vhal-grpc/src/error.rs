//! Bridge construction and configuration errors

use thiserror::Error;

/// Errors raised while building a bridge.
///
/// Contract operations never fail with this type; they report `StatusCode`s.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The server address is not a valid URI
    #[error("Invalid server address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Configuration file could not be read
    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration content is invalid
    #[error("Invalid configuration: {0}")]
    Config(String),
}
