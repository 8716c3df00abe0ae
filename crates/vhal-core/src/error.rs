//! Common error types for the vehicle property model

use thiserror::Error;

/// A wire status value that is not part of the `StatusCode` taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Unknown status code: {0}")]
pub struct InvalidStatusCode(pub i32);
