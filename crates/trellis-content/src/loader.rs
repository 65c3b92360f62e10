//! Block loader with memoized per-topic cache.

use crate::error::{ContentError, Result};
use crate::store::{sha256_hex, ContentStore};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;
use trellis_types::{BlockDefinition, TopicId};

/// A fully materialized block: parsed definition plus template source.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockContent {
    pub definition: BlockDefinition,
    pub template: String,
}

/// Fetches and caches immutable block payloads.
///
/// A block lives at a topic as a JSON [`BlockDefinition`] pointing at its
/// template payload. Both are immutable, so a loaded block is memoized for
/// the loader's lifetime until [`BlockLoader::clear_cache`].
pub struct BlockLoader {
    store: Arc<dyn ContentStore>,
    cache: DashMap<TopicId, Arc<BlockContent>>,
}

impl BlockLoader {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            cache: DashMap::new(),
        }
    }

    /// Load the block at `topic`, from cache when possible.
    ///
    /// Verifies retrieved template bytes against the definition's expected
    /// digest before anything enters the cache.
    pub async fn load(&self, topic: &TopicId) -> Result<Arc<BlockContent>> {
        if let Some(cached) = self.cache.get(topic) {
            return Ok(cached.clone());
        }

        let raw = self.store.fetch(topic).await?;
        let definition: BlockDefinition =
            serde_json::from_slice(&raw).map_err(|err| ContentError::Malformed {
                topic: topic.clone(),
                reason: err.to_string(),
            })?;

        let template_bytes = self.store.fetch(&definition.template_topic).await?;
        if let Some(expected) = &definition.template_digest {
            let actual = sha256_hex(&template_bytes);
            if &actual != expected {
                return Err(ContentError::DigestMismatch {
                    topic: definition.template_topic.clone(),
                    expected: expected.clone(),
                    actual,
                });
            }
        }
        let template = String::from_utf8(template_bytes).map_err(|_| ContentError::Malformed {
            topic: definition.template_topic.clone(),
            reason: "template is not valid UTF-8".to_string(),
        })?;

        let content = Arc::new(BlockContent {
            definition,
            template,
        });
        debug!(topic = %topic, "block materialized");
        self.cache.insert(topic.clone(), content.clone());
        Ok(content)
    }

    /// Publish a template payload, returning its location and digest.
    pub async fn store_template(&self, template: &str) -> Result<(TopicId, String)> {
        let digest = sha256_hex(template.as_bytes());
        let location = self.store.store(template.as_bytes().to_vec()).await?;
        Ok((location, digest))
    }

    /// Publish a block definition payload.
    pub async fn store_definition(&self, definition: &BlockDefinition) -> Result<TopicId> {
        let bytes = serde_json::to_vec(definition).map_err(|err| ContentError::Backend(err.to_string()))?;
        self.store.store(bytes).await
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
