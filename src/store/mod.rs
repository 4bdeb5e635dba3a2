// file: src/store/mod.rs
// description: vector store contract, backends and the embedding-aware collection handle
// reference: internal module structure

pub mod collection;
pub mod lance;
pub mod memory;

pub use collection::Collection;
pub use lance::LanceDbStore;
pub use memory::InMemoryVectorStore;

use crate::config::{StoreBackend, VectorStoreConfig};
use crate::error::{BackendResult, PipelineError, Result};
use crate::models::{EmbeddedChunk, ScoredChunk};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

/// Persistent, append-only storage of embedded chunks grouped in named
/// collections.
#[async_trait]
pub trait VectorStore: Send + Sync {
    fn backend(&self) -> &str;

    async fn list_collections(&self) -> BackendResult<HashSet<String>>;

    /// Creates `name` and writes `records` into it. Fails if it already exists.
    async fn create_and_populate(&self, name: &str, records: &[EmbeddedChunk]) -> BackendResult<()>;

    async fn append(&self, name: &str, records: &[EmbeddedChunk]) -> BackendResult<()>;

    /// Returns at most `k` hits ordered by descending score.
    async fn similarity_search(
        &self,
        name: &str,
        query: &[f32],
        k: usize,
    ) -> BackendResult<Vec<ScoredChunk>>;

    async fn count(&self, name: &str) -> BackendResult<usize>;
}

pub async fn open_store(config: &VectorStoreConfig) -> Result<Arc<dyn VectorStore>> {
    let store: Arc<dyn VectorStore> = match config.backend {
        StoreBackend::LanceDb => Arc::new(
            LanceDbStore::connect(&config.uri)
                .await
                .map_err(|e| PipelineError::Config(format!("Cannot open vector store: {}", e)))?,
        ),
        StoreBackend::Memory => Arc::new(InMemoryVectorStore::new()),
    };
    Ok(store)
}

/// Sorts hits by descending score; equal scores keep the store's order.
pub(crate) fn rank_by_score(hits: &mut [ScoredChunk]) {
    hits.sort_by(|a, b| {
        let a = a.score.unwrap_or(f32::MIN);
        let b = b.score.unwrap_or(f32::MIN);
        b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
    });
}
