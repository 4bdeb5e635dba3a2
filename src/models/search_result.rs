// file: src/models/search_result.rs
// description: Retrieval result models with similarity scores
// reference: Used for exact-reference and vector similarity search results

use crate::models::Chunk;
use crate::utils::Validator;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,

    /// Similarity score (higher is more similar). `None` for literal matches.
    pub score: Option<f32>,

    /// Optional: Distance metric reported by the store (lower is more similar)
    pub distance: Option<f32>,
}

impl ScoredChunk {
    pub fn scored(chunk: Chunk, score: f32, distance: Option<f32>) -> Self {
        Self {
            chunk,
            score: Some(score),
            distance,
        }
    }

    pub fn literal(chunk: Chunk) -> Self {
        Self {
            chunk,
            score: None,
            distance: None,
        }
    }

    /// Format as a summary string for display
    pub fn format_summary(&self, max_content_len: usize) -> String {
        let content_preview = Validator::truncate_text(&self.chunk.text, max_content_len);

        let score = match self.score {
            Some(score) => format!("Score: {:.4}", score),
            None => "Exact match".to_string(),
        };

        format!(
            "{} | Chunk {} ({}, page {})\n{}\n",
            score, self.chunk.chunk_id, self.chunk.source, self.chunk.page_number, content_preview
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetrievalStrategy {
    ExactReference { reference: String },
    Similarity { k: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub strategy: RetrievalStrategy,
    pub hits: Vec<ScoredChunk>,
}

impl RetrievalResult {
    pub fn new(strategy: RetrievalStrategy, hits: Vec<ScoredChunk>) -> Self {
        Self { strategy, hits }
    }

    pub fn chunks(&self) -> Vec<&Chunk> {
        self.hits.iter().map(|hit| &hit.chunk).collect()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}
