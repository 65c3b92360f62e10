//! In-memory reference transport.
//!
//! Deterministic and test-friendly: sequence numbers are per-topic
//! monotonic, synthetic consensus timestamps are strictly increasing per
//! topic, and read calls are counted so tests can assert how often a
//! registry actually went to the log.

use crate::error::{Result, TransportError};
use crate::traits::{AppendReceipt, LogMessage, LogTransport};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use trellis_types::TopicId;

/// In-memory append-only log, one ordered stream per topic.
pub struct InMemoryLogTransport {
    topics: DashMap<TopicId, Topic>,
    next_topic: AtomicU64,
    read_calls: AtomicU64,
    payer: String,
}

#[derive(Default)]
struct Topic {
    messages: Vec<LogMessage>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl InMemoryLogTransport {
    pub fn new() -> Self {
        Self {
            topics: DashMap::new(),
            next_topic: AtomicU64::new(1000),
            read_calls: AtomicU64::new(0),
            payer: "0.0.2".to_string(),
        }
    }

    pub fn with_payer(payer: impl Into<String>) -> Self {
        Self {
            payer: payer.into(),
            ..Self::new()
        }
    }

    /// Allocate a fresh empty topic.
    pub fn create_topic(&self) -> TopicId {
        let id = TopicId::new(format!(
            "0.0.{}",
            self.next_topic.fetch_add(1, Ordering::SeqCst)
        ));
        self.topics.insert(id.clone(), Topic::default());
        id
    }

    /// Number of `read_since` / `read_latest` calls served so far.
    pub fn read_calls(&self) -> u64 {
        self.read_calls.load(Ordering::SeqCst)
    }

    /// Append a message on behalf of an arbitrary payer.
    ///
    /// Lets tests plant foreign-protocol or corrupt bodies alongside
    /// regular traffic.
    pub fn append_as(
        &self,
        topic: &TopicId,
        payer: impl Into<String>,
        payload: Vec<u8>,
    ) -> Result<AppendReceipt> {
        let mut entry = self.topics.entry(topic.clone()).or_default();

        // Consensus timestamps are strictly increasing per topic even when
        // appends land within the same wall-clock instant.
        let now = Utc::now();
        let timestamp = match entry.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        entry.last_timestamp = Some(timestamp);

        let sequence_number = entry.messages.len() as u64 + 1;
        entry.messages.push(LogMessage {
            sequence_number,
            consensus_timestamp: timestamp,
            payer: payer.into(),
            payload,
        });
        Ok(AppendReceipt {
            sequence_number,
            consensus_timestamp: timestamp,
        })
    }
}

impl Default for InMemoryLogTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogTransport for InMemoryLogTransport {
    async fn append(&self, topic: &TopicId, payload: Vec<u8>) -> Result<AppendReceipt> {
        self.append_as(topic, self.payer.clone(), payload)
    }

    async fn read_since(
        &self,
        topic: &TopicId,
        cursor: Option<DateTime<Utc>>,
        limit: usize,
    ) -> Result<Vec<LogMessage>> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        let entry = self
            .topics
            .get(topic)
            .ok_or_else(|| TransportError::TopicNotFound(topic.clone()))?;
        Ok(entry
            .messages
            .iter()
            .filter(|m| cursor.map_or(true, |c| m.consensus_timestamp >= c))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn read_latest(&self, topic: &TopicId, limit: usize) -> Result<Vec<LogMessage>> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        let entry = self
            .topics
            .get(topic)
            .ok_or_else(|| TransportError::TopicNotFound(topic.clone()))?;
        Ok(entry.messages.iter().rev().take(limit).cloned().collect())
    }
}
