//! Trellis assembly resolution engine
//!
//! Resolves an [`AssemblyState`](trellis_assembly::AssemblyState) into a
//! fully materialized [`ResolvedAssembly`]: every action reference answered
//! by the action registry, every block reference by the block loader, with
//! bounded parallel fan-out and per-reference error capture. Resolved
//! assemblies are cached by topic id for the resolver's lifetime, and the
//! finished graph can be checked for dangling references without further
//! I/O.

#![deny(unsafe_code)]

mod error;
mod resolved;
mod resolver;
mod validate;

pub use error::{ResolveError, Result};
pub use resolved::{CompositionReport, ResolvedAction, ResolvedAssembly, ResolvedBlock};
pub use resolver::{AssemblyResolver, ResolverConfig};
pub use validate::validate_composition;
