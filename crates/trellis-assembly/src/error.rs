//! Assembly registry error types.

use thiserror::Error;
use trellis_registry::RegistryError;

/// Assembly registry errors
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("assembly registry is detached from any transport")]
    Detached,

    #[error("failed to encode operation: {0}")]
    Encode(String),
}

/// Result type for assembly registry operations
pub type Result<T> = std::result::Result<T, AssemblyError>;
