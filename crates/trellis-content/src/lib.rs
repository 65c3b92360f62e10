//! Trellis content-addressed payloads
//!
//! Blocks and WASM artifacts are immutable content-addressed payloads
//! referenced by topic id. This crate owns the [`ContentStore`] seam, an
//! in-memory reference store, and the [`BlockLoader`], which materializes
//! block definition + template pairs with a memoized per-topic cache and
//! digest verification of retrieved bytes.

#![deny(unsafe_code)]

mod error;
mod loader;
mod store;

pub use error::{ContentError, Result};
pub use loader::{BlockContent, BlockLoader};
pub use store::{sha256_hex, ContentStore, InMemoryContentStore};
