// file: src/retriever.rs
// description: exact-reference and similarity retrieval over an indexed document
// reference: literal substring scan or embedding nearest-neighbour lookup

use crate::config::RetrievalConfig;
use crate::error::{PipelineError, Result};
use crate::models::{Chunk, RetrievalResult, RetrievalStrategy, ScoredChunk};
use crate::store::Collection;
use tracing::{debug, info};

pub struct Retriever {
    collection: Collection,
    fallback_to_similarity: bool,
}

impl Retriever {
    pub fn new(collection: Collection, config: &RetrievalConfig) -> Self {
        Self {
            collection,
            fallback_to_similarity: config.fallback_to_similarity,
        }
    }

    /// Picks the mode: exact when a reference was extracted, similarity otherwise.
    pub async fn retrieve(
        &self,
        question: &str,
        reference: Option<&str>,
        chunks: &[Chunk],
        k: usize,
    ) -> Result<RetrievalResult> {
        let Some(reference) = reference else {
            return self.similarity(question, k).await;
        };

        let result = Self::exact_reference(chunks, reference);
        if result.is_empty() && self.fallback_to_similarity {
            info!(
                "No chunk contains '{}', falling back to similarity search",
                reference
            );
            return self.similarity(question, k).await;
        }

        Ok(result)
    }

    /// Every chunk containing `reference` literally, in document order.
    pub fn exact_reference(chunks: &[Chunk], reference: &str) -> RetrievalResult {
        let hits: Vec<ScoredChunk> = chunks
            .iter()
            .filter(|chunk| chunk.contains(reference))
            .cloned()
            .map(ScoredChunk::literal)
            .collect();

        info!(
            "Exact search for '{}' matched {} chunks",
            reference,
            hits.len()
        );

        RetrievalResult::new(
            RetrievalStrategy::ExactReference {
                reference: reference.to_string(),
            },
            hits,
        )
    }

    /// Top `k` chunks by descending similarity to `question`.
    pub async fn similarity(&self, question: &str, k: usize) -> Result<RetrievalResult> {
        let strategy = RetrievalStrategy::Similarity { k };
        if k == 0 {
            debug!("k is 0, skipping similarity search");
            return Ok(RetrievalResult::new(strategy, Vec::new()));
        }

        let hits = self
            .collection
            .similarity_search(question, k)
            .await
            .map_err(PipelineError::Retrieval)?;

        info!(
            "Similarity search on '{}' returned {} chunks",
            self.collection.name(),
            hits.len()
        );

        Ok(RetrievalResult::new(strategy, hits))
    }
}
