//! Registry error types.

use thiserror::Error;
use trellis_transport::TransportError;
use trellis_types::ValidationError;

/// Registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Payload failed its base shape check. Never retried.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Transport append failed; no local entry was inserted.
    #[error("transport append failed: {0}")]
    Transport(#[from] TransportError),

    /// A sync read against the transport failed.
    #[error("sync failed: {0}")]
    Sync(TransportError),

    /// Operation needs a transport but the registry is detached.
    #[error("registry is detached from any transport")]
    Detached,

    #[error("registry lock poisoned")]
    Lock,
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
