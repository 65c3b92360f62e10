//! Content layer error types.

use thiserror::Error;
use trellis_types::TopicId;

/// Content errors
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content not found at topic: {0}")]
    NotFound(TopicId),

    #[error("malformed content at topic {topic}: {reason}")]
    Malformed { topic: TopicId, reason: String },

    #[error("digest mismatch at topic {topic}: expected {expected}, got {actual}")]
    DigestMismatch {
        topic: TopicId,
        expected: String,
        actual: String,
    },

    #[error("content backend error: {0}")]
    Backend(String),
}

/// Result type for content operations
pub type Result<T> = std::result::Result<T, ContentError>;
