//! Action registry error types.

use thiserror::Error;
use trellis_content::ContentError;
use trellis_registry::RegistryError;
use trellis_transport::TransportError;

/// Action registry errors
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("transport read failed: {0}")]
    Transport(#[from] TransportError),

    #[error("action registry is detached from any transport")]
    Detached,

    #[error("failed to encode registration: {0}")]
    Encode(String),
}

/// Result type for action registry operations
pub type Result<T> = std::result::Result<T, ActionError>;
