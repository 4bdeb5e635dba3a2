// file: src/embeddings/hashing.rs
// description: deterministic local feature-hashing embedder for offline runs and tests
// reference: hashing trick over lowercase word tokens

use crate::embeddings::EmbeddingClient;
use crate::error::BackendResult;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

/// Maps each lowercase alphanumeric token to a signed bucket and
/// L2-normalises the result. Stable across runs and platforms, so vectors
/// written to a persistent collection stay comparable with later queries.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let digest = Sha256::digest(token.to_lowercase().as_bytes());
            let mut bucket_bytes = [0u8; 8];
            bucket_bytes.copy_from_slice(&digest[..8]);
            let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimensions as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

#[async_trait]
impl EmbeddingClient for HashingEmbedder {
    fn provider(&self) -> &str {
        "hashing"
    }

    async fn embed(&self, texts: &[String]) -> BackendResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn test_embedding_is_deterministic_and_normalised() {
        let embedder = HashingEmbedder::new(64);
        let first = embedder.embed_text("Supplier security controls");
        let second = embedder.embed_text("supplier SECURITY controls");

        assert_eq!(first.len(), 64);
        assert_eq!(first, second);
        assert!((cosine(&first, &first) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_related_text_scores_higher() {
        let embedder = HashingEmbedder::new(256);
        let query = embedder.embed_text("digital signatures protect code integrity");
        let related = embedder.embed_text("Digital signatures must be used to protect code integrity");
        let unrelated = embedder.embed_text("The cafeteria opens at noon on weekdays");

        assert!(cosine(&query, &related) > cosine(&query, &unrelated));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::new(8);
        assert!(embedder.embed_text("").iter().all(|v| *v == 0.0));
    }

    #[tokio::test]
    async fn test_embed_batch_preserves_order() {
        let embedder = HashingEmbedder::new(16);
        let texts = vec!["alpha".to_string(), "beta".to_string()];
        let vectors = embedder.embed(&texts).await.unwrap();

        assert_eq!(vectors[0], embedder.embed_text("alpha"));
        assert_eq!(vectors[1], embedder.embed_text("beta"));
    }
}
