// file: src/llm/mod.rs
// description: language model clients and response text extraction
// reference: internal module structure

pub mod gemini;
pub mod openai;

pub use gemini::{GeminiAdapter, GeminiClient};
pub use openai::{ChatCompletionAdapter, ChatCompletionClient};

use crate::config::{LlmConfig, LlmProvider};
use crate::error::{BackendResult, Result};
use crate::utils::Validator;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Pulls the generated text out of a raw provider response.
///
/// Providers (and SDK versions) disagree on where the text lives, so each
/// adapter checks the shapes it knows and returns the first non-empty one.
pub trait ResponseAdapter: Send + Sync {
    fn extract_text(&self, response: &Value) -> Option<String>;
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn provider(&self) -> &str;

    fn model_id(&self) -> &str;

    /// Sends one prompt and returns the raw JSON response.
    async fn generate(&self, prompt: &str) -> BackendResult<Value>;

    fn response_adapter(&self) -> &dyn ResponseAdapter;
}

/// Generates and extracts text in one call. `Ok(None)` means the model
/// answered but no known response shape carried any text.
pub async fn complete(model: &dyn LanguageModel, prompt: &str) -> BackendResult<Option<String>> {
    let response = model.generate(prompt).await?;
    Ok(model.response_adapter().extract_text(&response))
}

pub fn build_llm(config: &LlmConfig) -> Result<Arc<dyn LanguageModel>> {
    if let Some(base_url) = &config.base_url {
        Validator::validate_url(base_url)?;
    }

    let key = config.require_api_key()?.clone();
    let model: Arc<dyn LanguageModel> = match config.provider {
        LlmProvider::Gemini => Arc::new(GeminiClient::new(
            key,
            config.model.clone(),
            config.base_url.clone(),
        )),
        LlmProvider::OpenAi => Arc::new(ChatCompletionClient::new(
            key,
            config.model.clone(),
            config.base_url.clone(),
        )),
    };

    Ok(model)
}

/// Returns the trimmed string at `pointer` when it is present and non-blank.
pub(crate) fn non_empty_str(response: &Value, pointer: &str) -> Option<String> {
    response
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::SecretString;
    use crate::error::BackendError;
    use serde_json::json;
    use std::sync::Mutex;

    type Responder = Box<dyn Fn(&str) -> BackendResult<String> + Send + Sync>;

    /// Test model answering every prompt through a closure and recording
    /// the prompts it saw.
    pub(crate) struct ScriptedModel {
        responder: Responder,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        pub(crate) fn new(
            responder: impl Fn(&str) -> BackendResult<String> + Send + Sync + 'static,
        ) -> Self {
            Self {
                responder: Box::new(responder),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn replying(text: &str) -> Self {
            let text = text.to_string();
            Self::new(move |_| Ok(text.clone()))
        }

        pub(crate) fn failing() -> Self {
            Self::new(|_| Err(BackendError::transport("scripted", "connection refused")))
        }

        pub(crate) fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        fn provider(&self) -> &str {
            "scripted"
        }

        fn model_id(&self) -> &str {
            "scripted-1"
        }

        async fn generate(&self, prompt: &str) -> BackendResult<Value> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let text = (self.responder)(prompt)?;
            Ok(json!({ "text": text }))
        }

        fn response_adapter(&self) -> &dyn ResponseAdapter {
            &GeminiAdapter
        }
    }

    #[tokio::test]
    async fn test_complete_extracts_text() {
        let model = ScriptedModel::replying("  hello  ");
        let text = complete(&model, "hi").await.unwrap();
        assert_eq!(text.as_deref(), Some("hello"));
        assert_eq!(model.prompts(), vec!["hi".to_string()]);
    }

    #[tokio::test]
    async fn test_complete_blank_reply_is_none() {
        let model = ScriptedModel::replying("   ");
        assert_eq!(complete(&model, "hi").await.unwrap(), None);
    }

    #[test]
    fn test_build_llm_requires_key() {
        let mut config = LlmConfig {
            provider: LlmProvider::Gemini,
            model: "gemini-2.5-flash".to_string(),
            base_url: None,
            api_key: None,
        };
        assert!(build_llm(&config).is_err());

        config.api_key = Some(SecretString::new("token"));
        let model = build_llm(&config).unwrap();
        assert_eq!(model.provider(), "gemini");
        assert_eq!(model.model_id(), "gemini-2.5-flash");
    }

    #[test]
    fn test_build_llm_rejects_bad_base_url() {
        let config = LlmConfig {
            provider: LlmProvider::OpenAi,
            model: "llama-3.3-70b-versatile".to_string(),
            base_url: Some("not a url".to_string()),
            api_key: Some(SecretString::new("token")),
        };
        assert!(build_llm(&config).is_err());
    }
}
