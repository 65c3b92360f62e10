//! Content store seam and in-memory reference implementation.

use crate::error::{ContentError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use trellis_types::TopicId;

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Immutable content-addressed byte storage.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store `bytes`, returning their content-derived location.
    async fn store(&self, bytes: Vec<u8>) -> Result<TopicId>;

    /// Fetch the bytes at `location`.
    async fn fetch(&self, location: &TopicId) -> Result<Vec<u8>>;
}

/// In-memory content store; locations are digest-derived.
#[derive(Default)]
pub struct InMemoryContentStore {
    blobs: DashMap<TopicId, Vec<u8>>,
    fetch_calls: AtomicU64,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `fetch` calls served; lets tests assert cache hits.
    pub fn fetch_calls(&self) -> u64 {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn store(&self, bytes: Vec<u8>) -> Result<TopicId> {
        let location = TopicId::new(format!("cas-{}", sha256_hex(&bytes)));
        self.blobs.insert(location.clone(), bytes);
        Ok(location)
    }

    async fn fetch(&self, location: &TopicId) -> Result<Vec<u8>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.blobs
            .get(location)
            .map(|blob| blob.clone())
            .ok_or_else(|| ContentError::NotFound(location.clone()))
    }
}
