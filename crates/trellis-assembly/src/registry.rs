//! The assembly registry.

use crate::error::{AssemblyError, Result};
use crate::projection::AssemblyProjection;
use crate::state::AssemblyState;
use semver::Version;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use trellis_registry::{RegistryConfig, TopicRegistry};
use trellis_transport::LogTransport;
use trellis_types::{encode_envelope, AssemblyOperation, EntryId, TopicId};

/// Registry bound to one assembly topic, with read-only replay of others.
pub struct AssemblyRegistry {
    transport: Option<Arc<dyn LogTransport>>,
    config: RegistryConfig,
    registry: TopicRegistry<AssemblyProjection>,
}

impl AssemblyRegistry {
    pub fn attached(
        transport: Arc<dyn LogTransport>,
        topic: TopicId,
        config: RegistryConfig,
    ) -> Self {
        Self {
            registry: TopicRegistry::attached(
                transport.clone(),
                topic,
                AssemblyProjection::default(),
                config.clone(),
            ),
            transport: Some(transport),
            config,
        }
    }

    pub fn detached(config: RegistryConfig) -> Self {
        Self {
            registry: TopicRegistry::detached(AssemblyProjection::default(), config.clone()),
            transport: None,
            config,
        }
    }

    /// The underlying replay engine, for entry-level access.
    pub fn entries(&self) -> &TopicRegistry<AssemblyProjection> {
        &self.registry
    }

    /// Current folded state of the bound topic, synced first when attached.
    pub async fn state(&self) -> Result<Option<AssemblyState>> {
        self.registry.sync().await?;
        Ok(self.registry.with_projection(|p| p.state().cloned())?)
    }

    /// Folded state of an arbitrary assembly topic.
    ///
    /// The bound topic answers from this registry's own cache; any other
    /// topic is replayed through an ephemeral read-only registry running
    /// the same fold, which is how the resolver reads assemblies it does
    /// not own.
    pub async fn assembly_state(&self, topic: &TopicId) -> Result<Option<AssemblyState>> {
        if self.registry.topic() == Some(topic) {
            return self.state().await;
        }
        let transport = self.transport.clone().ok_or(AssemblyError::Detached)?;
        let replica = TopicRegistry::attached(
            transport,
            topic.clone(),
            AssemblyProjection::default(),
            self.config.clone(),
        );
        replica.sync().await?;
        Ok(replica.with_projection(|p| p.state().cloned())?)
    }

    /// Publish one operation on the bound topic.
    pub async fn submit(&self, operation: &AssemblyOperation) -> Result<EntryId> {
        let payload =
            encode_envelope(operation).map_err(|err| AssemblyError::Encode(err.to_string()))?;
        Ok(self.registry.register(payload).await?)
    }

    pub async fn register_assembly(
        &self,
        name: impl Into<String>,
        version: Version,
        description: Option<String>,
        tags: Option<Vec<String>>,
    ) -> Result<EntryId> {
        self.submit(&AssemblyOperation::Register {
            name: name.into(),
            version,
            description,
            tags,
        })
        .await
    }

    pub async fn add_action(
        &self,
        topic: TopicId,
        alias: impl Into<String>,
        config: Option<Value>,
    ) -> Result<EntryId> {
        self.submit(&AssemblyOperation::AddAction {
            topic,
            alias: alias.into(),
            config,
        })
        .await
    }

    pub async fn add_block(
        &self,
        topic: TopicId,
        action_bindings: Option<BTreeMap<String, TopicId>>,
        attribute_overrides: Option<Value>,
        child_aliases: Option<Vec<String>>,
    ) -> Result<EntryId> {
        self.submit(&AssemblyOperation::AddBlock {
            topic,
            action_bindings,
            attribute_overrides,
            child_aliases,
        })
        .await
    }

    pub async fn update(
        &self,
        description: Option<String>,
        tags: Option<Vec<String>>,
    ) -> Result<EntryId> {
        self.submit(&AssemblyOperation::Update { description, tags })
            .await
    }
}
