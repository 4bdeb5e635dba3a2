// file: src/llm/gemini.rs
// description: Gemini generateContent client and response adapter
// reference: https://ai.google.dev/api/generate-content

use crate::config::SecretString;
use crate::error::BackendResult;
use crate::http::{join_url, send_json};
use crate::llm::{LanguageModel, ResponseAdapter, non_empty_str};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const SERVICE: &str = "gemini";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

pub struct GeminiClient {
    client: Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

impl GeminiClient {
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
            &format!("v1beta/models/{}:generateContent", self.model),
        )
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    fn provider(&self) -> &str {
        SERVICE
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> BackendResult<Value> {
        debug!(
            "Sending {} char prompt to {}",
            prompt.chars().count(),
            self.model
        );

        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        };

        let request = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose())
            .json(&body);

        send_json(SERVICE, request).await
    }

    fn response_adapter(&self) -> &dyn ResponseAdapter {
        &GeminiAdapter
    }
}

/// Probes, in order: a top-level `text`, a nested `response.text`, the
/// concatenated `candidates[0].content.parts[*].text`, then `content[0].text`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeminiAdapter;

impl ResponseAdapter for GeminiAdapter {
    fn extract_text(&self, response: &Value) -> Option<String> {
        non_empty_str(response, "/text")
            .or_else(|| non_empty_str(response, "/response/text"))
            .or_else(|| candidate_parts_text(response))
            .or_else(|| non_empty_str(response, "/content/0/text"))
    }
}

fn candidate_parts_text(response: &Value) -> Option<String> {
    let parts = response
        .pointer("/candidates/0/content/parts")?
        .as_array()?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
