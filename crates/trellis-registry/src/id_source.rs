//! Entry id assignment.

use std::sync::atomic::{AtomicU64, Ordering};
use trellis_types::EntryId;

/// Where a registry's entry ids come from.
///
/// Transport-backed registries use the sequence number the log assigns;
/// detached registries (pure local use, tests) mint synthetic monotonic
/// ids. Selected at construction instead of branching on "is a transport
/// attached" at every call site.
#[derive(Debug)]
pub enum IdSource {
    TransportAssigned,
    LocalMonotonic(AtomicU64),
}

impl IdSource {
    pub fn local() -> Self {
        Self::LocalMonotonic(AtomicU64::new(1))
    }

    /// Mint the next local id. Panics if called on `TransportAssigned`;
    /// the registry only routes detached registrations here.
    pub(crate) fn next_local(&self) -> (EntryId, u64) {
        match self {
            Self::LocalMonotonic(counter) => {
                let sequence = counter.fetch_add(1, Ordering::SeqCst);
                (EntryId::new(format!("local-{sequence}")), sequence)
            }
            Self::TransportAssigned => {
                unreachable!("transport-assigned registries never mint local ids")
            }
        }
    }
}
