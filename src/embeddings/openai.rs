// file: src/embeddings/openai.rs
// description: OpenAI-compatible embeddings API client (OpenAI, Groq, local gateways)
// reference: https://platform.openai.com/docs/api-reference/embeddings

use crate::config::SecretString;
use crate::embeddings::{EmbeddingClient, ensure_count};
use crate::error::BackendResult;
use crate::http::{join_url, send_json};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const SERVICE: &str = "openai";

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [String],
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

pub struct OpenAiEmbeddingClient {
    client: Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

impl OpenAiEmbeddingClient {
    pub fn new(api_key: SecretString, model: String, base_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    pub fn endpoint(&self) -> String {
        join_url(&self.base_url, "embeddings")
    }
}

#[async_trait]
impl EmbeddingClient for OpenAiEmbeddingClient {
    fn provider(&self) -> &str {
        SERVICE
    }

    async fn embed(&self, texts: &[String]) -> BackendResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            "Requesting {} embeddings from {} ({})",
            texts.len(),
            self.endpoint(),
            self.model
        );

        let request = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose())
            .json(&EmbeddingRequest {
                input: texts,
                model: &self.model,
            });

        let response: EmbeddingResponse = send_json(SERVICE, request).await?;
        ensure_count(SERVICE, texts.len(), order_by_index(response.data))
    }
}

fn order_by_index(mut data: Vec<EmbeddingData>) -> Vec<Vec<f32>> {
    data.sort_by_key(|item| item.index);
    data.into_iter().map(|item| item.embedding).collect()
}
