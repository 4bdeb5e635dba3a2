// file: src/store/collection.rs
// description: handle pairing a named collection with the embedder used to fill and query it
// reference: internal data flow

use crate::embeddings::{EmbeddingClient, ensure_count};
use crate::error::BackendResult;
use crate::models::{Chunk, EmbeddedChunk, ScoredChunk};
use crate::store::VectorStore;
use std::sync::Arc;
use tracing::debug;

/// A collection the pipeline can write chunks into and query by text.
#[derive(Clone)]
pub struct Collection {
    name: String,
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingClient>,
}

impl Collection {
    pub fn open(
        name: impl Into<String>,
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingClient>,
    ) -> Self {
        Self {
            name: name.into(),
            store,
            embedder,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn exists(&self) -> BackendResult<bool> {
        Ok(self.store.list_collections().await?.contains(&self.name))
    }

    /// Creates the collection from its first batch of chunks.
    pub async fn create_with(&self, chunks: &[Chunk]) -> BackendResult<()> {
        let records = self.embed_chunks(chunks).await?;
        self.store.create_and_populate(&self.name, &records).await
    }

    pub async fn add_chunks(&self, chunks: &[Chunk]) -> BackendResult<()> {
        let records = self.embed_chunks(chunks).await?;
        self.store.append(&self.name, &records).await
    }

    /// Embeds `query` and returns the `k` nearest chunks, best first.
    pub async fn similarity_search(&self, query: &str, k: usize) -> BackendResult<Vec<ScoredChunk>> {
        let vector = self.embedder.embed_query(query).await?;
        self.store.similarity_search(&self.name, &vector, k).await
    }

    pub async fn count(&self) -> BackendResult<usize> {
        self.store.count(&self.name).await
    }

    async fn embed_chunks(&self, chunks: &[Chunk]) -> BackendResult<Vec<EmbeddedChunk>> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = ensure_count(
            self.embedder.provider(),
            chunks.len(),
            self.embedder.embed(&texts).await?,
        )?;

        debug!(
            "Embedded {} chunks with {}",
            chunks.len(),
            self.embedder.provider()
        );

        Ok(chunks
            .iter()
            .cloned()
            .zip(vectors)
            .map(|(chunk, vector)| EmbeddedChunk::new(chunk, vector))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::HashingEmbedder;
    use crate::store::InMemoryVectorStore;

    fn collection() -> (Arc<InMemoryVectorStore>, Collection) {
        let store = Arc::new(InMemoryVectorStore::new());
        let handle = Collection::open("docs", store.clone(), Arc::new(HashingEmbedder::new(64)));
        (store, handle)
    }

    #[tokio::test]
    async fn test_create_then_add() {
        let (store, handle) = collection();
        assert!(!handle.exists().await.unwrap());

        handle
            .create_with(&[Chunk::new("supplier security", 1, 1, "doc.pdf")])
            .await
            .unwrap();
        handle
            .add_chunks(&[Chunk::new("incident response", 2, 2, "doc.pdf")])
            .await
            .unwrap();

        assert!(handle.exists().await.unwrap());
        assert_eq!(handle.count().await.unwrap(), 2);
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn test_similarity_search_prefers_matching_text() {
        let (_, handle) = collection();
        handle
            .create_with(&[
                Chunk::new("office plants need watering", 1, 1, "doc.pdf"),
                Chunk::new("supplier security assessments", 2, 2, "doc.pdf"),
            ])
            .await
            .unwrap();

        let hits = handle
            .similarity_search("supplier security", 1)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk.chunk_id, 2);
    }
}
