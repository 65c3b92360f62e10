//! Trellis action registry
//!
//! Specializes the generic replay engine with an action projection: every
//! accepted registration is indexed by content hash, and a given hash
//! resolves to exactly one registration. Also owns the publish path for
//! WASM modules (hash computation, artifact storage, registration).

#![deny(unsafe_code)]

mod error;
mod projection;
mod registry;

pub use error::{ActionError, Result};
pub use projection::ActionProjection;
pub use registry::ActionRegistry;
