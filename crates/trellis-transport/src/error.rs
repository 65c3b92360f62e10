//! Transport error types.

use thiserror::Error;
use trellis_types::TopicId;

/// Transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("topic not found: {0}")]
    TopicNotFound(TopicId),

    #[error("transport I/O failure: {0}")]
    Io(String),

    #[error("transport backend error: {0}")]
    Backend(String),
}

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;
