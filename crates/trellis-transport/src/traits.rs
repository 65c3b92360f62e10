//! Log transport trait and message types.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use trellis_types::TopicId;

/// Receipt for one durable append.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppendReceipt {
    pub sequence_number: u64,
    pub consensus_timestamp: DateTime<Utc>,
}

/// One ordered message read back from a topic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogMessage {
    pub sequence_number: u64,
    pub consensus_timestamp: DateTime<Utc>,
    /// Identity of whoever paid for / submitted the append.
    pub payer: String,
    /// Opaque encoded body; Trellis payloads are protocol-tagged JSON.
    pub payload: Vec<u8>,
}

/// Append-only ordered message log, one stream per topic.
///
/// The transport guarantees a single total order per log; this engine
/// treats that order as authoritative. `read_since` treats the cursor as a
/// lower timestamp bound but may re-deliver messages sharing the cursor
/// timestamp; callers dedupe by sequence number.
#[async_trait]
pub trait LogTransport: Send + Sync {
    /// Ordered, durable append.
    async fn append(&self, topic: &TopicId, payload: Vec<u8>) -> Result<AppendReceipt>;

    /// Paged ascending read of messages at or after `cursor`.
    async fn read_since(
        &self,
        topic: &TopicId,
        cursor: Option<DateTime<Utc>>,
        limit: usize,
    ) -> Result<Vec<LogMessage>>;

    /// Newest-first read, used for latest-entry lookups on foreign topics.
    async fn read_latest(&self, topic: &TopicId, limit: usize) -> Result<Vec<LogMessage>>;
}
