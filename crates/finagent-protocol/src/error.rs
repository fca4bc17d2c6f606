//! Error types for finagent-protocol

use thiserror::Error;

/// Result type alias for finagent-protocol
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Error type for envelope construction and validation
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// A field or discriminator value falls outside its protocol's closed set
    #[error("validation failed: {0}")]
    Validation(String),

    /// An envelope could not be serialized to its wire format
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
