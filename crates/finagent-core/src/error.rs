//! Error types for finagent-core

use thiserror::Error;

/// Result type alias for finagent-core
pub type Result<T> = std::result::Result<T, AgentError>;

/// Error type for agent operations
#[derive(Error, Debug)]
pub enum AgentError {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// Agent or runtime initialization failed
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// Agent processing failed
    #[error("Agent processing failed: {0}")]
    ProcessingFailed(String),

    /// A protocol builder or validator rejected the message
    #[error("Protocol error: {0}")]
    Protocol(#[from] finagent_protocol::ProtocolError),

    /// JSON serialization or deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
