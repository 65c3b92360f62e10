//! Trellis generic replay engine
//!
//! A [`TopicRegistry`] owns one topic's replay state: a cache of
//! materialized entries, a monotonic sync cursor, and a [`Projection`]
//! folding every accepted entry into typed local state. The same fold runs
//! on the incremental sync path and on full replay after a cache clear, so
//! the two can never diverge. Typed registries (actions, assemblies) are
//! projections supplied at construction rather than subclasses.

#![deny(unsafe_code)]

mod entry;
mod error;
mod id_source;
mod projection;
mod registry;

pub use entry::{EntryFilter, RegistryEntry, SyncReport};
pub use error::{RegistryError, Result};
pub use id_source::IdSource;
pub use projection::{DecodeOutcome, Projection};
pub use registry::{RegistryConfig, TopicRegistry};
