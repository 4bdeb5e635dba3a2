// file: src/llm/openai.rs
// description: OpenAI-compatible chat completions client (Groq, OpenAI, local gateways)
// reference: https://platform.openai.com/docs/api-reference/chat

use crate::config::SecretString;
use crate::error::BackendResult;
use crate::http::{join_url, send_json};
use crate::llm::{LanguageModel, ResponseAdapter, non_empty_str};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const SERVICE: &str = "chat-completions";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

pub struct ChatCompletionClient {
    client: Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

impl ChatCompletionClient {
    pub fn new(api_key: SecretString, model: String, base_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    pub fn endpoint(&self) -> String {
        join_url(&self.base_url, "chat/completions")
    }
}

#[async_trait]
impl LanguageModel for ChatCompletionClient {
    fn provider(&self) -> &str {
        SERVICE
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> BackendResult<Value> {
        debug!(
            "Sending {} char prompt to {} at {}",
            prompt.chars().count(),
            self.model,
            self.endpoint()
        );

        let request = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose())
            .json(&ChatRequest {
                model: &self.model,
                messages: vec![ChatMessage {
                    role: "user",
                    content: prompt,
                }],
            });

        send_json(SERVICE, request).await
    }

    fn response_adapter(&self) -> &dyn ResponseAdapter {
        &ChatCompletionAdapter
    }
}

/// Probes `choices[0].message.content`, the legacy `choices[0].text`, then
/// the responses-API `output_text`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatCompletionAdapter;

impl ResponseAdapter for ChatCompletionAdapter {
    fn extract_text(&self, response: &Value) -> Option<String> {
        non_empty_str(response, "/choices/0/message/content")
            .or_else(|| non_empty_str(response, "/choices/0/text"))
            .or_else(|| non_empty_str(response, "/output_text"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_default_endpoint_targets_groq() {
        let client = ChatCompletionClient::new(
            SecretString::new("gsk"),
            "openai/gpt-oss-120b".to_string(),
            None,
        );
        assert_eq!(
            client.endpoint(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
    }

    #[test]
    fn test_extracts_message_content() {
        let response = json!({
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": "NONE" } }]
        });
        assert_eq!(
            ChatCompletionAdapter.extract_text(&response).as_deref(),
            Some("NONE")
        );
    }

    #[test]
    fn test_falls_back_to_legacy_shapes() {
        assert_eq!(
            ChatCompletionAdapter
                .extract_text(&json!({ "choices": [{ "text": "legacy" }] }))
                .as_deref(),
            Some("legacy")
        );
        assert_eq!(
            ChatCompletionAdapter
                .extract_text(&json!({ "output_text": "responses api" }))
                .as_deref(),
            Some("responses api")
        );
    }

    #[test]
    fn test_null_content_yields_none() {
        let response = json!({ "choices": [{ "message": { "content": null } }] });
        assert_eq!(ChatCompletionAdapter.extract_text(&response), None);
    }
}
