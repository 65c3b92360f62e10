//! The action registry.

use crate::error::{ActionError, Result};
use crate::projection::ActionProjection;
use std::sync::Arc;
use tracing::debug;
use trellis_content::{sha256_hex, ContentStore};
use trellis_registry::{RegistryConfig, TopicRegistry};
use trellis_transport::LogTransport;
use trellis_types::{
    decode_envelope, encode_envelope, ActionModuleInfo, ActionOperation, ActionRegistration,
    EntryId, EnvelopeOutcome, TopicId,
};

/// Registry of executable action modules, indexed by content hash.
pub struct ActionRegistry {
    registry: TopicRegistry<ActionProjection>,
    transport: Option<Arc<dyn LogTransport>>,
    store: Arc<dyn ContentStore>,
}

impl ActionRegistry {
    pub fn attached(
        transport: Arc<dyn LogTransport>,
        topic: TopicId,
        store: Arc<dyn ContentStore>,
        config: RegistryConfig,
    ) -> Self {
        Self {
            registry: TopicRegistry::attached(
                transport.clone(),
                topic,
                ActionProjection::default(),
                config,
            ),
            transport: Some(transport),
            store,
        }
    }

    pub fn detached(store: Arc<dyn ContentStore>, config: RegistryConfig) -> Self {
        Self {
            registry: TopicRegistry::detached(ActionProjection::default(), config),
            transport: None,
            store,
        }
    }

    /// The underlying replay engine, for entry-level access.
    pub fn entries(&self) -> &TopicRegistry<ActionProjection> {
        &self.registry
    }

    /// Validate and publish a registration.
    pub async fn register(&self, registration: ActionRegistration) -> Result<EntryId> {
        registration
            .validate()
            .map_err(trellis_registry::RegistryError::from)?;
        let payload = encode_envelope(&ActionOperation::Register(registration))
            .map_err(|err| ActionError::Encode(err.to_string()))?;
        Ok(self.registry.register(payload).await?)
    }

    /// Look a registration up by content hash.
    ///
    /// Checks the folded index first; on a miss, one sync pass picks up any
    /// registrations that landed since, then the index is rechecked.
    pub async fn action_by_hash(&self, hash: &str) -> Result<Option<ActionRegistration>> {
        let hit = self
            .registry
            .with_projection(|p| p.get(hash).cloned())
            .map_err(ActionError::Registry)?;
        if hit.is_some() {
            return Ok(hit);
        }
        self.registry.sync().await?;
        Ok(self
            .registry
            .with_projection(|p| p.get(hash).cloned())
            .map_err(ActionError::Registry)?)
    }

    /// Decode the newest registration on a foreign action topic.
    ///
    /// The resolver uses this for assemblies that reference actions living
    /// on topics this registry does not own. Returns `Ok(None)` when the
    /// topic's newest message is not a usable registration.
    pub async fn latest_registration(
        &self,
        topic: &TopicId,
    ) -> Result<Option<ActionRegistration>> {
        let transport = self.transport.as_ref().ok_or(ActionError::Detached)?;
        let messages = transport.read_latest(topic, 1).await?;
        for message in messages {
            if let EnvelopeOutcome::Message(ActionOperation::Register(registration)) =
                decode_envelope::<ActionOperation>(&message.payload)
            {
                if registration.validate().is_ok() {
                    return Ok(Some(registration));
                }
            }
        }
        Ok(None)
    }

    /// Publish a WASM module end to end: store the binary and its interface
    /// metadata, derive content hashes, and register the result.
    pub async fn register_with_wasm(
        &self,
        wasm: Vec<u8>,
        info: &ActionModuleInfo,
    ) -> Result<EntryId> {
        let wasm_hash = sha256_hex(&wasm);
        let artifact_topic = self.store.store(wasm).await?;

        let info_bytes =
            serde_json::to_vec(info).map_err(|err| ActionError::Encode(err.to_string()))?;
        let hash = sha256_hex(&info_bytes);
        let info_topic = self.store.store(info_bytes).await?;

        debug!(module = %info.name, %hash, "publishing wasm module");
        self.register(ActionRegistration {
            hash,
            wasm_hash,
            artifact_topic,
            info_topic: Some(info_topic),
        })
        .await
    }
}
