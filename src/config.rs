// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{PipelineError, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub document: DocumentConfig,
    pub pipeline: PipelineConfig,
    pub vector_store: VectorStoreConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentConfig {
    pub path: PathBuf,
}

/// Immutable knobs shared by the chunker, indexer and retriever.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PipelineConfig {
    pub collection_name: String,
    pub batch_size: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub default_k: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            collection_name: "pdf-qa-documents-v1".to_string(),
            batch_size: 20,
            chunk_size: 1500,
            chunk_overlap: 500,
            default_k: 15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    LanceDb,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VectorStoreConfig {
    pub backend: StoreBackend,
    pub uri: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    HuggingFace,
    OpenAi,
    Hashing,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Only used by the local hashing embedder.
    #[serde(default = "default_hashing_dimensions")]
    pub dimensions: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Gemini,
    OpenAi,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<SecretString>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalConfig {
    /// Ask the model for a reference number before retrieving.
    pub reference_lookup: bool,
    /// Use similarity search when an extracted reference matches no chunk.
    pub fallback_to_similarity: bool,
    /// Require `[Source: <file>, Page: <page>]` on every bullet point.
    pub strict_citations: bool,
}

fn default_hashing_dimensions() -> usize {
    384
}

/// API key wrapper that never prints its value.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString(***)")
    }
}

impl EmbeddingConfig {
    fn conventional_key_vars(&self) -> &'static [&'static str] {
        match self.provider {
            EmbeddingProvider::HuggingFace => &["HF_API_KEY", "HUGGINGFACEHUB_API_TOKEN"],
            EmbeddingProvider::OpenAi => &["OPENAI_API_KEY", "GROQ_API_KEY"],
            EmbeddingProvider::Hashing => &[],
        }
    }

    /// Returns the API key for remote providers, failing if none was configured.
    pub fn require_api_key(&self) -> Result<&SecretString> {
        match &self.api_key {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(PipelineError::Config(format!(
                "embedding provider {:?} requires an API key (set PDF_QA__EMBEDDING__API_KEY or one of {:?})",
                self.provider,
                self.conventional_key_vars()
            ))),
        }
    }
}

impl LlmConfig {
    fn conventional_key_vars(&self) -> &'static [&'static str] {
        match self.provider {
            LlmProvider::Gemini => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
            LlmProvider::OpenAi => &["GROQ_API_KEY", "OPENAI_API_KEY"],
        }
    }

    pub fn require_api_key(&self) -> Result<&SecretString> {
        match &self.api_key {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(PipelineError::Config(format!(
                "LLM provider {:?} requires an API key (set PDF_QA__LLM__API_KEY or one of {:?})",
                self.provider,
                self.conventional_key_vars()
            ))),
        }
    }
}

impl Config {
    /// Layers built-in defaults, the TOML file and `PDF_QA__*` variables.
    ///
    /// An explicit `path` must exist; without one `config/default.toml` is
    /// read when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let defaults = config::Config::try_from(&Self::built_in())
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let file = match path {
            Some(path) => config::File::from(path),
            None => config::File::from(Path::new(DEFAULT_CONFIG_PATH)).required(false),
        };

        let builder = config::Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("PDF_QA")
                    .separator("__")
                    .try_parsing(true),
            );

        let settings = builder
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let mut config: Config = settings
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        config.resolve_secrets(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Built-in defaults with API keys taken from the conventional variables.
    pub fn default_config() -> Self {
        dotenv().ok();

        let mut config = Self::built_in();
        config.resolve_secrets(|name| std::env::var(name).ok());
        config
    }

    fn built_in() -> Self {
        Self {
            document: DocumentConfig {
                path: PathBuf::from("./Product.pdf"),
            },
            pipeline: PipelineConfig::default(),
            vector_store: VectorStoreConfig {
                backend: StoreBackend::LanceDb,
                uri: "data/lancedb".to_string(),
            },
            embedding: EmbeddingConfig {
                provider: EmbeddingProvider::HuggingFace,
                model: "BAAI/bge-large-en-v1.5".to_string(),
                base_url: None,
                api_key: None,
                dimensions: default_hashing_dimensions(),
            },
            llm: LlmConfig {
                provider: LlmProvider::Gemini,
                model: "gemini-2.5-flash".to_string(),
                base_url: None,
                api_key: None,
            },
            retrieval: RetrievalConfig {
                reference_lookup: true,
                fallback_to_similarity: false,
                strict_citations: false,
            },
        }
    }

    /// Fills missing API keys from the conventional provider variables.
    pub fn resolve_secrets<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let find = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| lookup(name))
                .find(|value| !value.trim().is_empty())
                .map(SecretString::new)
        };

        if self.embedding.api_key.as_ref().is_none_or(|k| k.is_empty()) {
            self.embedding.api_key = find(self.embedding.conventional_key_vars());
        }

        if self.llm.api_key.as_ref().is_none_or(|k| k.is_empty()) {
            self.llm.api_key = find(self.llm.conventional_key_vars());
        }
    }

    pub fn validate(&self) -> Result<()> {
        let pipeline = &self.pipeline;

        if pipeline.collection_name.trim().is_empty() {
            return Err(PipelineError::Config(
                "collection_name must not be empty".to_string(),
            ));
        }

        if pipeline.batch_size == 0 {
            return Err(PipelineError::Config(
                "batch_size must be greater than 0".to_string(),
            ));
        }

        if pipeline.chunk_size == 0 {
            return Err(PipelineError::Config(
                "chunk_size must be greater than 0".to_string(),
            ));
        }

        if pipeline.chunk_overlap >= pipeline.chunk_size {
            return Err(PipelineError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                pipeline.chunk_overlap, pipeline.chunk_size
            )));
        }

        if self.embedding.provider == EmbeddingProvider::Hashing && self.embedding.dimensions == 0
        {
            return Err(PipelineError::Config(
                "embedding.dimensions must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
