// file: src/store/memory.rs
// description: In-memory vector store using cosine similarity
// reference: collection name -> insertion-ordered records behind a tokio RwLock

use crate::error::{BackendError, BackendResult};
use crate::models::{EmbeddedChunk, ScoredChunk};
use crate::store::{VectorStore, rank_by_score};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

const BACKEND: &str = "memory";

/// Ephemeral store for tests and one-shot runs. Counts write calls so
/// callers can observe that a reused collection received no writes.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Vec<EmbeddedChunk>>>,
    writes: AtomicUsize,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `create_and_populate` and `append` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn check_dimensions(stored: &[EmbeddedChunk], incoming: &[EmbeddedChunk]) -> BackendResult<()> {
    let expected = stored
        .first()
        .or_else(|| incoming.first())
        .map(EmbeddedChunk::dimensions);

    if let Some(expected) = expected
        && let Some(bad) = incoming.iter().find(|r| r.dimensions() != expected)
    {
        return Err(BackendError::store(
            BACKEND,
            format!(
                "chunk {} has {} dimensions, collection uses {}",
                bad.chunk.chunk_id,
                bad.dimensions(),
                expected
            ),
        ));
    }
    Ok(())
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn backend(&self) -> &str {
        BACKEND
    }

    async fn list_collections(&self) -> BackendResult<HashSet<String>> {
        let collections = self.collections.read().await;
        Ok(collections.keys().cloned().collect())
    }

    async fn create_and_populate(&self, name: &str, records: &[EmbeddedChunk]) -> BackendResult<()> {
        let mut collections = self.collections.write().await;
        if collections.contains_key(name) {
            return Err(BackendError::store(
                BACKEND,
                format!("collection '{}' already exists", name),
            ));
        }

        check_dimensions(&[], records)?;
        collections.insert(name.to_string(), records.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn append(&self, name: &str, records: &[EmbeddedChunk]) -> BackendResult<()> {
        let mut collections = self.collections.write().await;
        let stored = collections.get_mut(name).ok_or_else(|| {
            BackendError::store(BACKEND, format!("collection '{}' does not exist", name))
        })?;

        check_dimensions(stored, records)?;
        stored.extend_from_slice(records);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn similarity_search(
        &self,
        name: &str,
        query: &[f32],
        k: usize,
    ) -> BackendResult<Vec<ScoredChunk>> {
        let collections = self.collections.read().await;
        let stored = collections.get(name).ok_or_else(|| {
            BackendError::store(BACKEND, format!("collection '{}' does not exist", name))
        })?;

        let mut hits: Vec<ScoredChunk> = stored
            .iter()
            .map(|record| {
                let score = cosine_similarity(&record.vector, query);
                ScoredChunk::scored(record.chunk.clone(), score, Some(1.0 - score))
            })
            .collect();

        rank_by_score(&mut hits);
        hits.truncate(k);
        Ok(hits)
    }

    async fn count(&self, name: &str) -> BackendResult<usize> {
        let collections = self.collections.read().await;
        Ok(collections.get(name).map(Vec::len).unwrap_or(0))
    }
}
