// file: src/embeddings/mod.rs
// description: embedding service clients and provider selection
// reference: internal module structure

pub mod hashing;
pub mod huggingface;
pub mod openai;

pub use hashing::HashingEmbedder;
pub use huggingface::HuggingFaceEmbeddingClient;
pub use openai::OpenAiEmbeddingClient;

use crate::config::{EmbeddingConfig, EmbeddingProvider};
use crate::error::{BackendError, BackendResult, Result};
use crate::utils::Validator;
use async_trait::async_trait;
use std::sync::Arc;

/// Text to fixed-length vector.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    fn provider(&self) -> &str;

    /// Embeds `texts` in one request; output order matches input order.
    async fn embed(&self, texts: &[String]) -> BackendResult<Vec<Vec<f32>>>;

    async fn embed_query(&self, text: &str) -> BackendResult<Vec<f32>> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| BackendError::decode(self.provider(), "no embedding returned for query"))
    }
}

/// Builds the embedding client named in the configuration.
///
/// Remote providers fail with a configuration error when no API key is set.
pub fn build_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingClient>> {
    if let Some(base_url) = &config.base_url {
        Validator::validate_url(base_url)?;
    }

    let client: Arc<dyn EmbeddingClient> = match config.provider {
        EmbeddingProvider::HuggingFace => {
            let key = config.require_api_key()?;
            Arc::new(HuggingFaceEmbeddingClient::new(
                key.clone(),
                config.model.clone(),
                config.base_url.clone(),
            ))
        }
        EmbeddingProvider::OpenAi => {
            let key = config.require_api_key()?;
            Arc::new(OpenAiEmbeddingClient::new(
                key.clone(),
                config.model.clone(),
                config.base_url.clone(),
            ))
        }
        EmbeddingProvider::Hashing => Arc::new(HashingEmbedder::new(config.dimensions)),
    };

    Ok(client)
}

pub(crate) fn ensure_count(
    provider: &str,
    expected: usize,
    vectors: Vec<Vec<f32>>,
) -> BackendResult<Vec<Vec<f32>>> {
    if vectors.len() != expected {
        return Err(BackendError::decode(
            provider,
            format!("expected {} embeddings, received {}", expected, vectors.len()),
        ));
    }
    Ok(vectors)
}
