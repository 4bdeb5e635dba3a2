// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod chunker;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod generator;
mod http;
pub mod indexer;
pub mod llm;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod reference;
pub mod retriever;
pub mod store;
pub mod utils;

pub use chunker::{Chunker, RecursiveSplitter};
pub use config::{Config, PipelineConfig, RetrievalConfig, SecretString};
pub use embeddings::{EmbeddingClient, HashingEmbedder, build_embedder};
pub use error::{BackendError, PipelineError, Result};
pub use generator::{AnswerGenerator, PromptOptions};
pub use indexer::{IndexReport, Indexer};
pub use llm::{LanguageModel, ResponseAdapter, build_llm};
pub use loader::PdfLoader;
pub use models::{Answer, Chunk, Page, Query, RetrievalResult, RetrievalStrategy, ScoredChunk};
pub use pipeline::{AskOptions, CollectionStats, PreparedDocument, QaOutcome, QaPipeline};
pub use reference::ReferenceExtractor;
pub use retriever::Retriever;
pub use store::{Collection, InMemoryVectorStore, LanceDbStore, VectorStore};
pub use utils::{OperationTimer, PerformanceMetrics, Validator};
