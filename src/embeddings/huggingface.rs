// file: src/embeddings/huggingface.rs
// description: Hugging Face inference feature-extraction client
// reference: https://huggingface.co/docs/inference-providers/tasks/feature-extraction

use crate::config::SecretString;
use crate::embeddings::{EmbeddingClient, ensure_count};
use crate::error::BackendResult;
use crate::http::{join_url, send_json};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://router.huggingface.co/hf-inference/models";
const SERVICE: &str = "huggingface";

#[derive(Debug, Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a [String],
}

/// Sentence-transformer models return one pooled vector per input; plain
/// encoders return one vector per token.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeatureExtractionResponse {
    Pooled(Vec<Vec<f32>>),
    TokenLevel(Vec<Vec<Vec<f32>>>),
}

impl FeatureExtractionResponse {
    fn into_vectors(self) -> Vec<Vec<f32>> {
        match self {
            FeatureExtractionResponse::Pooled(vectors) => vectors,
            FeatureExtractionResponse::TokenLevel(per_input) => {
                per_input.into_iter().map(mean_pool).collect()
            }
        }
    }
}

fn mean_pool(tokens: Vec<Vec<f32>>) -> Vec<f32> {
    let Some(width) = tokens.first().map(Vec::len) else {
        return Vec::new();
    };

    let mut pooled = vec![0.0f32; width];
    for token in &tokens {
        for (slot, value) in pooled.iter_mut().zip(token) {
            *slot += value;
        }
    }

    let count = tokens.len() as f32;
    pooled.iter_mut().for_each(|v| *v /= count);
    pooled
}

pub struct HuggingFaceEmbeddingClient {
    client: Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

impl HuggingFaceEmbeddingClient {
    pub fn new(api_key: SecretString, model: String, base_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    pub fn endpoint(&self) -> String {
        join_url(
            &self.base_url,
            &format!("{}/pipeline/feature-extraction", self.model),
        )
    }
}

#[async_trait]
impl EmbeddingClient for HuggingFaceEmbeddingClient {
    fn provider(&self) -> &str {
        SERVICE
    }

    async fn embed(&self, texts: &[String]) -> BackendResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Requesting {} embeddings from {}", texts.len(), self.model);

        let request = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose())
            .json(&FeatureExtractionRequest { inputs: texts });

        let response: FeatureExtractionResponse = send_json(SERVICE, request).await?;
        ensure_count(SERVICE, texts.len(), response.into_vectors())
    }
}
