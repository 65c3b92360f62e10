//! The generic topic registry.

use crate::entry::{EntryFilter, RegistryEntry, SyncReport};
use crate::error::{RegistryError, Result};
use crate::id_source::IdSource;
use crate::projection::{DecodeOutcome, Projection};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};
use trellis_transport::LogTransport;
use trellis_types::{EntryId, TopicId, ValidationError};

/// Registry tuning knobs.
#[derive(Clone, Debug)]
pub struct RegistryConfig {
    /// Page size for cursor reads during sync.
    pub page_size: usize,
    /// Identity recorded on locally materialized registrations.
    pub submitter: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            submitter: "local".to_string(),
        }
    }
}

/// Replay state for one topic: entry cache, sync cursor, and the typed
/// projection folded from the entry stream.
///
/// A registry instance exclusively owns its cache and cursor. All methods
/// take `&self`; interior state sits behind one composite lock that is
/// never held across a transport read.
pub struct TopicRegistry<P: Projection> {
    transport: Option<Arc<dyn LogTransport>>,
    topic: Option<TopicId>,
    ids: IdSource,
    config: RegistryConfig,
    inner: RwLock<Inner<P>>,
}

struct Inner<P: Projection> {
    entries: Vec<RegistryEntry<P::Payload>>,
    by_id: HashMap<EntryId, usize>,
    cursor: Option<DateTime<Utc>>,
    projection: P,
}

impl<P: Projection> TopicRegistry<P> {
    /// Registry backed by a transport topic; ids come from the log.
    pub fn attached(
        transport: Arc<dyn LogTransport>,
        topic: TopicId,
        projection: P,
        config: RegistryConfig,
    ) -> Self {
        Self {
            transport: Some(transport),
            topic: Some(topic),
            ids: IdSource::TransportAssigned,
            config,
            inner: RwLock::new(Inner {
                entries: Vec::new(),
                by_id: HashMap::new(),
                cursor: None,
                projection,
            }),
        }
    }

    /// Detached registry for pure local use and tests; ids are synthetic.
    pub fn detached(projection: P, config: RegistryConfig) -> Self {
        Self {
            transport: None,
            topic: None,
            ids: IdSource::local(),
            config,
            inner: RwLock::new(Inner {
                entries: Vec::new(),
                by_id: HashMap::new(),
                cursor: None,
                projection,
            }),
        }
    }

    pub fn topic(&self) -> Option<&TopicId> {
        self.topic.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.transport.is_some()
    }

    /// Validate a wire payload, publish it, and materialize the entry.
    ///
    /// Attached registries append to the transport first; an append failure
    /// propagates and no local entry is inserted. Detached registries mint
    /// a local id instead.
    pub async fn register(&self, payload: Vec<u8>) -> Result<EntryId> {
        let data = {
            let inner = self.read()?;
            match inner.projection.decode(&payload) {
                DecodeOutcome::Accepted(data) => data,
                DecodeOutcome::Foreign => {
                    return Err(ValidationError::new(
                        "p",
                        "missing or unrecognized protocol tag",
                    )
                    .into())
                }
                DecodeOutcome::Invalid(reason) => {
                    return Err(ValidationError::new("op", reason).into())
                }
            }
        };

        let (id, sequence_number, timestamp) = match (&self.transport, &self.topic) {
            (Some(transport), Some(topic)) => {
                let receipt = transport.append(topic, payload).await?;
                (
                    EntryId::from_sequence(receipt.sequence_number),
                    receipt.sequence_number,
                    receipt.consensus_timestamp,
                )
            }
            _ => {
                let (id, sequence_number) = self.ids.next_local();
                (id, sequence_number, Utc::now())
            }
        };

        let entry = RegistryEntry {
            id: id.clone(),
            sequence_number,
            timestamp,
            submitter: self.config.submitter.clone(),
            data,
        };

        let mut inner = self.write()?;
        if !inner.by_id.contains_key(&id) {
            inner.projection.fold(&entry);
            let index = inner.entries.len();
            inner.entries.push(entry);
            inner.by_id.insert(id.clone(), index);
        }
        Ok(id)
    }

    /// Cache lookup; a miss on an attached registry triggers one sync pass
    /// before rechecking. Absence is `None`, never an error.
    pub async fn entry(&self, id: &EntryId) -> Result<Option<RegistryEntry<P::Payload>>> {
        {
            let inner = self.read()?;
            if let Some(&index) = inner.by_id.get(id) {
                return Ok(Some(inner.entries[index].clone()));
            }
        }
        if self.is_attached() {
            self.sync().await?;
            let inner = self.read()?;
            if let Some(&index) = inner.by_id.get(id) {
                return Ok(Some(inner.entries[index].clone()));
            }
        }
        Ok(None)
    }

    /// Entries in sequence order, freshly synced when attached.
    pub async fn list_entries(&self, filter: &EntryFilter) -> Result<Vec<RegistryEntry<P::Payload>>> {
        if self.is_attached() {
            self.sync().await?;
        }
        let inner = self.read()?;
        Ok(inner
            .entries
            .iter()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect())
    }

    /// Consume the topic's log from the cursor forward.
    ///
    /// Pages through `read_since` ascending. Foreign-tagged messages are
    /// skipped silently, tag-matching but malformed ones are logged and
    /// skipped, and re-delivered cursor-boundary messages are deduplicated
    /// by id. The cursor advances to the last message's consensus
    /// timestamp, or to now when the log had nothing new.
    pub async fn sync(&self) -> Result<SyncReport> {
        let (Some(transport), Some(topic)) = (&self.transport, &self.topic) else {
            return Ok(SyncReport::default());
        };

        let mut report = SyncReport::default();
        loop {
            let cursor = self.read()?.cursor;
            let page = transport
                .read_since(topic, cursor, self.config.page_size)
                .await
                .map_err(RegistryError::Sync)?;
            let page_len = page.len();
            let consumed_before = report.consumed;

            {
                let mut inner = self.write()?;
                match page.last() {
                    Some(last) => {
                        let last_timestamp = last.consensus_timestamp;
                        for message in &page {
                            match inner.projection.decode(&message.payload) {
                                DecodeOutcome::Foreign => {
                                    report.skipped_foreign += 1;
                                    debug!(
                                        topic = %topic,
                                        sequence = message.sequence_number,
                                        "skipping foreign-protocol message"
                                    );
                                }
                                DecodeOutcome::Invalid(reason) => {
                                    report.skipped_invalid += 1;
                                    warn!(
                                        topic = %topic,
                                        sequence = message.sequence_number,
                                        %reason,
                                        "skipping undecodable message"
                                    );
                                }
                                DecodeOutcome::Accepted(data) => {
                                    let id = EntryId::from_sequence(message.sequence_number);
                                    if inner.by_id.contains_key(&id) {
                                        report.duplicates += 1;
                                        continue;
                                    }
                                    let entry = RegistryEntry {
                                        id: id.clone(),
                                        sequence_number: message.sequence_number,
                                        timestamp: message.consensus_timestamp,
                                        submitter: message.payer.clone(),
                                        data,
                                    };
                                    inner.projection.fold(&entry);
                                    let index = inner.entries.len();
                                    inner.entries.push(entry);
                                    inner.by_id.insert(id, index);
                                    report.consumed += 1;
                                }
                            }
                        }
                        inner.cursor = Some(last_timestamp);
                    }
                    None => {
                        inner.cursor = Some(Utc::now());
                    }
                }
            }

            if page_len < self.config.page_size {
                break;
            }
            // A full page that is all re-delivered boundary messages cannot
            // advance the cursor; bail instead of spinning on it.
            if report.consumed == consumed_before && self.read()?.cursor == cursor {
                break;
            }
        }
        Ok(report)
    }

    /// Drop all entries, reset the projection, and rewind the cursor to the
    /// beginning of the log.
    pub fn clear_cache(&self) -> Result<()> {
        let mut inner = self.write()?;
        inner.entries.clear();
        inner.by_id.clear();
        inner.cursor = None;
        inner.projection.reset();
        Ok(())
    }

    /// Re-derive projection state from the cached entries alone.
    ///
    /// Applies the same fold `sync` uses, over the same ordered entry set,
    /// so a full replay converges with incremental processing by
    /// construction.
    pub fn replay(&self) -> Result<()> {
        let mut inner = self.write()?;
        let Inner {
            entries, projection, ..
        } = &mut *inner;
        projection.reset();
        for entry in entries.iter() {
            projection.fold(entry);
        }
        Ok(())
    }

    /// Read access to the folded projection state.
    pub fn with_projection<R>(&self, f: impl FnOnce(&P) -> R) -> Result<R> {
        let inner = self.read()?;
        Ok(f(&inner.projection))
    }

    pub fn entry_count(&self) -> Result<usize> {
        Ok(self.read()?.entries.len())
    }

    pub fn cursor(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.read()?.cursor)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner<P>>> {
        self.inner.read().map_err(|_| RegistryError::Lock)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner<P>>> {
        self.inner.write().map_err(|_| RegistryError::Lock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use trellis_transport::InMemoryLogTransport;
    use trellis_types::{decode_envelope, encode_envelope, EnvelopeOutcome};

    #[derive(Clone, Debug, Serialize, Deserialize)]
    struct TestOp {
        op: String,
    }

    #[derive(Default)]
    struct OpLog {
        ops: Vec<String>,
    }

    impl Projection for OpLog {
        type Payload = TestOp;

        fn decode(&self, raw: &[u8]) -> DecodeOutcome<TestOp> {
            match decode_envelope(raw) {
                EnvelopeOutcome::Message(op) => DecodeOutcome::Accepted(op),
                EnvelopeOutcome::Foreign => DecodeOutcome::Foreign,
                EnvelopeOutcome::Invalid(reason) => DecodeOutcome::Invalid(reason),
            }
        }

        fn fold(&mut self, entry: &RegistryEntry<TestOp>) {
            self.ops.push(entry.data.op.clone());
        }

        fn reset(&mut self) {
            self.ops.clear();
        }
    }

    fn wire(op: &str) -> Vec<u8> {
        encode_envelope(&TestOp { op: op.to_string() }).unwrap()
    }

    fn attached_registry(
        transport: &Arc<InMemoryLogTransport>,
        topic: &TopicId,
    ) -> TopicRegistry<OpLog> {
        TopicRegistry::attached(
            transport.clone() as Arc<dyn LogTransport>,
            topic.clone(),
            OpLog::default(),
            RegistryConfig::default(),
        )
    }

    #[tokio::test]
    async fn detached_register_mints_local_ids() {
        let registry = TopicRegistry::detached(OpLog::default(), RegistryConfig::default());
        let first = registry.register(wire("a")).await.unwrap();
        let second = registry.register(wire("b")).await.unwrap();

        assert_eq!(first, EntryId::new("local-1"));
        assert_eq!(second, EntryId::new("local-2"));
        assert_eq!(registry.entry_count().unwrap(), 2);
        registry
            .with_projection(|p| assert_eq!(p.ops, vec!["a", "b"]))
            .unwrap();
    }

    #[tokio::test]
    async fn register_rejects_untagged_payloads() {
        let registry = TopicRegistry::detached(OpLog::default(), RegistryConfig::default());
        let result = registry.register(b"{\"op\":\"a\"}".to_vec()).await;
        assert!(matches!(result, Err(RegistryError::Validation(_))));
        assert_eq!(registry.entry_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn sync_materializes_entries_and_skips_foreign_traffic() {
        let transport = Arc::new(InMemoryLogTransport::new());
        let topic = transport.create_topic();
        transport.append_as(&topic, "0.0.9", wire("a")).unwrap();
        transport
            .append_as(&topic, "0.0.9", br#"{"p":"other-1","op":"x"}"#.to_vec())
            .unwrap();
        transport.append_as(&topic, "0.0.9", wire("b")).unwrap();

        let registry = attached_registry(&transport, &topic);
        let report = registry.sync().await.unwrap();

        assert_eq!(report.consumed, 2);
        assert_eq!(report.skipped_foreign, 1);
        registry
            .with_projection(|p| assert_eq!(p.ops, vec!["a", "b"]))
            .unwrap();
    }

    #[tokio::test]
    async fn sync_twice_is_idempotent() {
        let transport = Arc::new(InMemoryLogTransport::new());
        let topic = transport.create_topic();
        transport.append_as(&topic, "0.0.9", wire("a")).unwrap();

        let registry = attached_registry(&transport, &topic);
        registry.sync().await.unwrap();
        let cursor = registry.cursor().unwrap();
        let count = registry.entry_count().unwrap();

        let report = registry.sync().await.unwrap();
        assert_eq!(report.consumed, 0);
        assert_eq!(registry.cursor().unwrap(), cursor);
        assert_eq!(registry.entry_count().unwrap(), count);
    }

    #[tokio::test]
    async fn entry_lookup_triggers_a_sync_pass() {
        let transport = Arc::new(InMemoryLogTransport::new());
        let topic = transport.create_topic();
        let receipt = transport.append_as(&topic, "0.0.9", wire("a")).unwrap();

        let registry = attached_registry(&transport, &topic);
        let id = EntryId::from_sequence(receipt.sequence_number);
        let entry = registry.entry(&id).await.unwrap().unwrap();
        assert_eq!(entry.data.op, "a");
        assert_eq!(entry.submitter, "0.0.9");

        let missing = registry.entry(&EntryId::new("42")).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn list_entries_filters_by_submitter_and_time() {
        let transport = Arc::new(InMemoryLogTransport::new());
        let topic = transport.create_topic();
        transport.append_as(&topic, "0.0.7", wire("a")).unwrap();
        let second = transport.append_as(&topic, "0.0.8", wire("b")).unwrap();

        let registry = attached_registry(&transport, &topic);

        let by_submitter = registry
            .list_entries(&EntryFilter {
                submitter: Some("0.0.8".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_submitter.len(), 1);
        assert_eq!(by_submitter[0].data.op, "b");

        // Inclusive lower bound keeps the entry at exactly the boundary.
        let by_time = registry
            .list_entries(&EntryFilter {
                from: Some(second.consensus_timestamp),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_time.len(), 1);
        assert_eq!(by_time[0].data.op, "b");
    }

    #[tokio::test]
    async fn clear_cache_rewinds_and_resync_rebuilds_identical_state() {
        let transport = Arc::new(InMemoryLogTransport::new());
        let topic = transport.create_topic();
        transport.append_as(&topic, "0.0.9", wire("a")).unwrap();
        transport.append_as(&topic, "0.0.9", wire("b")).unwrap();

        let registry = attached_registry(&transport, &topic);
        registry.sync().await.unwrap();
        let before = registry.with_projection(|p| p.ops.clone()).unwrap();

        registry.clear_cache().unwrap();
        assert_eq!(registry.entry_count().unwrap(), 0);
        assert_eq!(registry.cursor().unwrap(), None);

        registry.sync().await.unwrap();
        let after = registry.with_projection(|p| p.ops.clone()).unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn replay_refolds_cached_entries_without_the_transport() {
        let transport = Arc::new(InMemoryLogTransport::new());
        let topic = transport.create_topic();
        transport.append_as(&topic, "0.0.9", wire("a")).unwrap();
        transport.append_as(&topic, "0.0.9", wire("b")).unwrap();

        let registry = attached_registry(&transport, &topic);
        registry.sync().await.unwrap();
        let reads_after_sync = transport.read_calls();

        registry.replay().unwrap();
        registry
            .with_projection(|p| assert_eq!(p.ops, vec!["a", "b"]))
            .unwrap();
        assert_eq!(transport.read_calls(), reads_after_sync);
    }

    #[tokio::test]
    async fn attached_register_appends_to_the_log() {
        let transport = Arc::new(InMemoryLogTransport::new());
        let topic = transport.create_topic();

        let registry = attached_registry(&transport, &topic);
        let id = registry.register(wire("a")).await.unwrap();
        assert_eq!(id, EntryId::new("1"));

        // A second registry over the same topic sees the append.
        let reader = attached_registry(&transport, &topic);
        reader.sync().await.unwrap();
        reader
            .with_projection(|p| assert_eq!(p.ops, vec!["a"]))
            .unwrap();
    }
}
