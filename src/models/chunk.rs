// file: src/models/chunk.rs
// description: text chunk model with citation metadata and stable row ids
// reference: internal data structures

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub page_number: u32,
    /// Sequential and 1-based across the whole document.
    pub chunk_id: u64,
    pub source: String,
}

impl Chunk {
    pub fn new(
        text: impl Into<String>,
        page_number: u32,
        chunk_id: u64,
        source: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            page_number,
            chunk_id,
            source: source.into(),
        }
    }

    /// Stable identifier used as the row key in the vector store.
    pub fn point_id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.source.as_bytes());
        hasher.update(self.chunk_id.to_le_bytes());
        hasher.update(self.text.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.text.contains(needle)
    }
}

/// A chunk paired with the vector the embedding service produced for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedChunk {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

impl EmbeddedChunk {
    pub fn new(chunk: Chunk, vector: Vec<f32>) -> Self {
        Self { chunk, vector }
    }

    pub fn dimensions(&self) -> usize {
        self.vector.len()
    }
}
