//! The resolution engine.

use crate::error::{ResolveError, Result};
use crate::resolved::{CompositionReport, ResolvedAction, ResolvedAssembly, ResolvedBlock};
use crate::validate;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;
use trellis_actions::ActionRegistry;
use trellis_assembly::{ActionRef, AssemblyRegistry, AssemblyState, BlockRef};
use trellis_content::{BlockLoader, ContentError};
use trellis_types::TopicId;

/// Resolution tuning knobs.
#[derive(Clone, Debug)]
pub struct ResolverConfig {
    /// Upper bound on in-flight reference lookups per assembly, so a large
    /// composition cannot flood the transport with simultaneous reads.
    pub max_concurrency: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { max_concurrency: 8 }
    }
}

/// Resolves assemblies against the typed registries and the block loader.
///
/// Borrows the registries it resolves against; exclusively owns its
/// resolved-assembly cache. A cached assembly is returned by `Arc`, so
/// repeated loads hand back the identical object.
pub struct AssemblyResolver {
    actions: Arc<ActionRegistry>,
    assemblies: Arc<AssemblyRegistry>,
    blocks: Arc<BlockLoader>,
    config: ResolverConfig,
    cache: RwLock<HashMap<TopicId, Arc<ResolvedAssembly>>>,
}

impl AssemblyResolver {
    pub fn new(
        actions: Arc<ActionRegistry>,
        assemblies: Arc<AssemblyRegistry>,
        blocks: Arc<BlockLoader>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            actions,
            assemblies,
            blocks,
            config,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Load and resolve the assembly at `topic`, from cache when possible.
    ///
    /// A topic whose log carries no `register` fails with
    /// [`ResolveError::AssemblyNotFound`]; per-reference failures are
    /// recorded on the result instead. Concurrent misses for the same
    /// topic may both resolve; the overwrite is idempotent.
    pub async fn load_assembly(&self, topic: &TopicId) -> Result<Arc<ResolvedAssembly>> {
        {
            let cache = self.cache.read().map_err(|_| ResolveError::Lock)?;
            if let Some(hit) = cache.get(topic) {
                return Ok(hit.clone());
            }
        }

        let state = self
            .assemblies
            .assembly_state(topic)
            .await?
            .ok_or_else(|| ResolveError::AssemblyNotFound(topic.clone()))?;

        let (actions, blocks) = self.resolve_references(&state).await;
        debug!(
            topic = %topic,
            actions = actions.len(),
            blocks = blocks.len(),
            "assembly resolved"
        );

        let resolved = Arc::new(ResolvedAssembly {
            topic: topic.clone(),
            state,
            actions,
            blocks,
        });
        let mut cache = self.cache.write().map_err(|_| ResolveError::Lock)?;
        cache.insert(topic.clone(), resolved.clone());
        Ok(resolved)
    }

    /// Primary external entry point.
    pub async fn load_and_resolve_assembly(&self, topic: &TopicId) -> Result<Arc<ResolvedAssembly>> {
        self.load_assembly(topic).await
    }

    /// Resolve every action and block reference in `state`.
    ///
    /// References fan out with bounded concurrency and fail independently:
    /// a missing or unreachable dependency is recorded on its own slot and
    /// never aborts the rest. Output order mirrors declaration order.
    pub async fn resolve_references(
        &self,
        state: &AssemblyState,
    ) -> (Vec<ResolvedAction>, Vec<ResolvedBlock>) {
        let actions = stream::iter(state.actions.iter().cloned())
            .map(|action| self.resolve_action(action))
            .buffered(self.config.max_concurrency)
            .collect::<Vec<_>>();

        let blocks = stream::iter(state.blocks.iter().cloned())
            .map(|block| self.resolve_block(block))
            .buffered(self.config.max_concurrency)
            .collect::<Vec<_>>();

        futures::join!(actions, blocks)
    }

    async fn resolve_action(&self, action: ActionRef) -> ResolvedAction {
        match self.actions.latest_registration(&action.topic).await {
            Ok(Some(definition)) => ResolvedAction {
                alias: action.alias,
                reference: action.topic,
                definition: Some(definition),
                error: None,
            },
            Ok(None) => ResolvedAction {
                alias: action.alias,
                error: Some(format!("Action not found at topic: {}", action.topic)),
                reference: action.topic,
                definition: None,
            },
            Err(err) => ResolvedAction {
                alias: action.alias,
                error: Some(err.to_string()),
                reference: action.topic,
                definition: None,
            },
        }
    }

    async fn resolve_block(&self, block: BlockRef) -> ResolvedBlock {
        match self.blocks.load(&block.topic).await {
            Ok(content) => ResolvedBlock {
                reference: block.topic,
                definition: Some(content.definition.clone()),
                template: Some(content.template.clone()),
                error: None,
            },
            Err(ContentError::NotFound(_)) => ResolvedBlock {
                error: Some(format!("Block not found at topic: {}", block.topic)),
                reference: block.topic,
                definition: None,
                template: None,
            },
            Err(err) => ResolvedBlock {
                error: Some(err.to_string()),
                reference: block.topic,
                definition: None,
                template: None,
            },
        }
    }

    /// Static dangling-reference check over a resolved assembly.
    pub fn validate_composition(&self, assembly: &ResolvedAssembly) -> CompositionReport {
        validate::validate_composition(assembly)
    }

    /// Drop every cached resolved assembly.
    pub fn clear_cache(&self) -> Result<()> {
        self.cache.write().map_err(|_| ResolveError::Lock)?.clear();
        Ok(())
    }
}
