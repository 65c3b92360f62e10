//! Materialized entries and query types.

use chrono::{DateTime, Utc};
use trellis_types::EntryId;

/// One materialized record from a log message.
///
/// Immutable once materialized: re-sync only ever adds new entries.
#[derive(Clone, Debug, PartialEq)]
pub struct RegistryEntry<T> {
    /// Log-assigned sequence identifier, usable as an external reference.
    pub id: EntryId,
    pub sequence_number: u64,
    /// Log consensus time; drives ordering and cursor advancement.
    pub timestamp: DateTime<Utc>,
    /// Identity of whoever appended the message.
    pub submitter: String,
    /// Decoded protocol payload.
    pub data: T,
}

/// Filter for [`TopicRegistry::list_entries`](crate::TopicRegistry::list_entries).
///
/// Timestamp bounds are inclusive on both ends.
#[derive(Clone, Debug, Default)]
pub struct EntryFilter {
    pub submitter: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl EntryFilter {
    pub(crate) fn matches<T>(&self, entry: &RegistryEntry<T>) -> bool {
        if let Some(submitter) = &self.submitter {
            if &entry.submitter != submitter {
                return false;
            }
        }
        if let Some(from) = self.from {
            if entry.timestamp < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if entry.timestamp > to {
                return false;
            }
        }
        true
    }
}

/// Outcome of one sync pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Entries newly materialized and folded.
    pub consumed: usize,
    /// Messages skipped for carrying a different protocol tag.
    pub skipped_foreign: usize,
    /// Tag-matching messages whose body failed to decode.
    pub skipped_invalid: usize,
    /// Messages already present in the cache (cursor-boundary re-delivery).
    pub duplicates: usize,
}
