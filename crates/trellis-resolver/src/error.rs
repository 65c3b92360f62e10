//! Resolution error types.

use thiserror::Error;
use trellis_assembly::AssemblyError;
use trellis_types::TopicId;

/// Resolution errors.
///
/// Missing individual references are data on the resolved assembly, not
/// errors; only a missing assembly registration or a failure reading the
/// assembly's own log surfaces here.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no assembly registered at topic: {0}")]
    AssemblyNotFound(TopicId),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error("resolver cache lock poisoned")]
    Lock,
}

/// Result type for resolution operations
pub type Result<T> = std::result::Result<T, ResolveError>;
