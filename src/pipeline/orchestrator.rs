// file: src/pipeline/orchestrator.rs
// description: coordinates loading, chunking, indexing and per-question answering
// reference: orchestrates the asynchronous question-answering workflow

use crate::chunker::Chunker;
use crate::config::Config;
use crate::embeddings::{EmbeddingClient, build_embedder};
use crate::error::{PipelineError, Result};
use crate::generator::{AnswerGenerator, PromptOptions};
use crate::indexer::{IndexReport, Indexer};
use crate::llm::{LanguageModel, build_llm};
use crate::loader::PdfLoader;
use crate::models::{Answer, Chunk, Page, Query, RetrievalResult};
use crate::reference::ReferenceExtractor;
use crate::retriever::Retriever;
use crate::store::{VectorStore, open_store};
use crate::utils::{OperationTimer, Validator};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Per-question overrides of the configured defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AskOptions {
    pub k: Option<usize>,
    pub strict_citations: Option<bool>,
    pub reference_lookup: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct PreparedDocument {
    pub pages: usize,
    pub chunks: usize,
    pub index: IndexReport,
}

/// Everything one question produced.
#[derive(Debug, Clone)]
pub struct QaOutcome {
    pub question: Query,
    pub reference: Option<String>,
    pub retrieval: RetrievalResult,
    pub answer: Answer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionStats {
    pub collection: String,
    pub backend: String,
    pub exists: bool,
    pub vectors: usize,
}

/// The two model-backed stages; absent when the pipeline only indexes or searches.
struct Answerer {
    model_id: String,
    reference_extractor: ReferenceExtractor,
    generator: AnswerGenerator,
}

pub struct QaPipeline {
    config: Config,
    store: Arc<dyn VectorStore>,
    loader: PdfLoader,
    chunker: Chunker,
    indexer: Indexer,
    retriever: Retriever,
    answerer: Option<Answerer>,
    chunks: Option<Vec<Chunk>>,
}

impl QaPipeline {
    /// Builds every collaborator named in `config`, including the language model.
    pub async fn from_config(config: Config) -> Result<Self> {
        let model = build_llm(&config.llm)?;
        Ok(Self::retrieval_only(config).await?.with_model(model))
    }

    /// Store and embedder only; enough for `prepare`, `search` and `stats`.
    pub async fn retrieval_only(config: Config) -> Result<Self> {
        let store = open_store(&config.vector_store).await?;
        let embedder = build_embedder(&config.embedding)?;
        Self::with_components(config, store, embedder)
    }

    pub fn with_components(
        config: Config,
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingClient>,
    ) -> Result<Self> {
        let chunker = Chunker::new(&config.pipeline)?;
        let indexer = Indexer::new(&config.pipeline, store.clone(), embedder)?;
        let retriever = Retriever::new(indexer.collection().clone(), &config.retrieval);

        info!(
            "Pipeline ready: store={}, collection={}",
            store.backend(),
            config.pipeline.collection_name
        );

        Ok(Self {
            loader: PdfLoader::new(),
            chunker,
            indexer,
            retriever,
            store,
            config,
            answerer: None,
            chunks: None,
        })
    }

    pub fn with_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        info!("Answering with {} ({})", model.model_id(), model.provider());
        self.answerer = Some(Answerer {
            model_id: model.model_id().to_string(),
            reference_extractor: ReferenceExtractor::new(model.clone()),
            generator: AnswerGenerator::new(model),
        });
        self
    }

    pub fn with_progress(mut self, show_progress: bool, colored: bool) -> Self {
        self.indexer = self.indexer.with_progress(show_progress, colored);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Loads and chunks the configured document and makes sure it is indexed.
    ///
    /// Chunks are kept in memory for exact-reference lookups; the collection
    /// is only written when it does not exist yet.
    pub async fn prepare(&mut self) -> Result<PreparedDocument> {
        let path = self.config.document.path.clone();
        let loader = self.loader.clone();

        let timer = OperationTimer::new("load");
        let pages = load_off_runtime(path, move |path| loader.load(path)).await?;
        timer.finish();

        if pages.iter().all(|page| page.is_blank()) {
            warn!(
                "No extractable text in {}",
                self.config.document.path.display()
            );
        }

        let chunks = self.chunker.chunk_pages(&pages);
        let index = self.indexer.index(&chunks).await?;

        let prepared = PreparedDocument {
            pages: pages.len(),
            chunks: chunks.len(),
            index,
        };
        self.chunks = Some(chunks);
        Ok(prepared)
    }

    /// Answers one question. Requires a prior `prepare`.
    pub async fn ask(&self, question: &str, options: AskOptions) -> Result<QaOutcome> {
        Validator::validate_question(question)?;
        let chunks = self.chunks.as_deref().ok_or_else(|| {
            PipelineError::Validation("document not prepared; call prepare() first".to_string())
        })?;

        let answerer = self.answerer.as_ref().ok_or_else(|| {
            PipelineError::Config("no language model configured for answering".to_string())
        })?;

        let k = options.k.unwrap_or(self.config.pipeline.default_k);
        let lookup = options
            .reference_lookup
            .unwrap_or(self.config.retrieval.reference_lookup);
        let prompt_options = PromptOptions {
            strict_citations: options
                .strict_citations
                .unwrap_or(self.config.retrieval.strict_citations),
        };

        let timer = OperationTimer::new("ask");

        let reference = if lookup {
            answerer.reference_extractor.extract(question).await
        } else {
            debug!("Reference lookup disabled");
            None
        };

        let retrieval = self
            .retriever
            .retrieve(question, reference.as_deref(), chunks, k)
            .await?;

        let answer = answerer
            .generator
            .generate(question, &retrieval.chunks(), prompt_options)
            .await?;

        timer.finish();
        debug!("Answered with {}", answerer.model_id);

        Ok(QaOutcome {
            question: Query::new(question),
            reference,
            retrieval,
            answer,
        })
    }

    /// Similarity search only, without calling the language model.
    pub async fn search(&self, query: &str, k: usize) -> Result<RetrievalResult> {
        Validator::validate_question(query)?;
        self.retriever.similarity(query, k).await
    }

    pub async fn stats(&self) -> Result<CollectionStats> {
        let collection = self.indexer.collection();
        let to_error = |source| PipelineError::Index {
            collection: collection.name().to_string(),
            source,
        };

        let exists = collection.exists().await.map_err(to_error)?;
        let vectors = if exists {
            collection.count().await.map_err(to_error)?
        } else {
            0
        };

        Ok(CollectionStats {
            collection: collection.name().to_string(),
            backend: self.store.backend().to_string(),
            exists,
            vectors,
        })
    }
}

/// Runs the blocking PDF read on the blocking pool. A panicked or cancelled
/// read is reported as a load failure of `path`.
async fn load_off_runtime<F>(path: PathBuf, load: F) -> Result<Vec<Page>>
where
    F: FnOnce(&Path) -> Result<Vec<Page>> + Send + 'static,
{
    let task_path = path.clone();
    tokio::task::spawn_blocking(move || load(&task_path))
        .await
        .map_err(|e| PipelineError::Load {
            path,
            message: format!("loading task failed: {}", e),
        })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EmbeddingProvider, StoreBackend};
    use crate::embeddings::HashingEmbedder;
    use crate::generator::build_context;
    use crate::llm::tests::ScriptedModel;
    use crate::loader::pdf::tests::write_sample_pdf;
    use crate::models::RetrievalStrategy;
    use crate::store::InMemoryVectorStore;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const PAGES: [&str; 3] = [
        "1.1 Scope of this policy covers all staff",
        "6.7 Supplier Security requires vendor assessments",
        "8.2 Incident reporting must happen within one day",
    ];

    fn test_config(pdf: &Path) -> Config {
        let mut config = Config::default_config();
        config.document.path = pdf.to_path_buf();
        config.vector_store.backend = StoreBackend::Memory;
        config.embedding.provider = EmbeddingProvider::Hashing;
        config.embedding.dimensions = 64;
        config.pipeline.collection_name = "policy-test".to_string();
        config.pipeline.default_k = 2;
        config
    }

    /// Replies "6.7" or NONE to reference prompts and echoes the cited page
    /// of the first context chunk for answer prompts.
    fn policy_model(reference_reply: &'static str) -> Arc<ScriptedModel> {
        Arc::new(ScriptedModel::new(move |prompt| {
            if prompt.starts_with("You classify questions") {
                return Ok(reference_reply.to_string());
            }
            let page = prompt
                .split("CHUNK 1 (")
                .nth(1)
                .and_then(|rest| rest.split("Page: ").nth(1))
                .and_then(|rest| rest.split(')').next())
                .unwrap_or("none");
            Ok(format!("See the supplier section (Page: {})", page))
        }))
    }

    fn fixture(dir: &TempDir) -> std::path::PathBuf {
        let pdf = dir.path().join("policy.pdf");
        write_sample_pdf(&pdf, &PAGES);
        pdf
    }

    #[tokio::test]
    async fn test_reference_question_uses_exact_retrieval() {
        let dir = TempDir::new().unwrap();
        let pdf = fixture(&dir);
        let model = policy_model("6.7");

        let mut pipeline = QaPipeline::with_components(
            test_config(&pdf),
            Arc::new(InMemoryVectorStore::new()),
            Arc::new(HashingEmbedder::new(64)),
        )
        .unwrap()
        .with_model(model.clone());

        let prepared = pipeline.prepare().await.unwrap();
        assert_eq!(prepared.pages, 3);
        assert_eq!(prepared.chunks, 3);

        let outcome = pipeline
            .ask("what does 6.7 say?", AskOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome.reference.as_deref(), Some("6.7"));
        assert_eq!(
            outcome.retrieval.strategy,
            RetrievalStrategy::ExactReference {
                reference: "6.7".to_string()
            }
        );
        assert!(!outcome.retrieval.is_empty());
        assert!(outcome.retrieval.chunks().iter().all(|c| c.page_number == 2));
        assert!(outcome.answer.text.contains("Page: 2"));
        assert_eq!(model.prompts().len(), 2);
    }

    #[tokio::test]
    async fn test_question_without_reference_uses_top_k_similarity() {
        let dir = TempDir::new().unwrap();
        let pdf = fixture(&dir);
        let model = policy_model("NONE");

        let mut pipeline = QaPipeline::with_components(
            test_config(&pdf),
            Arc::new(InMemoryVectorStore::new()),
            Arc::new(HashingEmbedder::new(64)),
        )
        .unwrap()
        .with_model(model.clone());
        pipeline.prepare().await.unwrap();

        let outcome = pipeline
            .ask("how fast must incidents be reported?", AskOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome.reference, None);
        assert_eq!(outcome.retrieval.strategy, RetrievalStrategy::Similarity { k: 2 });
        assert_eq!(outcome.retrieval.len(), 2);

        let context = build_context(&outcome.retrieval.chunks());
        let prompts = model.prompts();
        let answer_prompt = prompts.last().unwrap();
        assert!(answer_prompt.contains(&context));
        assert_eq!(answer_prompt.matches("CHUNK ").count(), 2);
    }

    #[tokio::test]
    async fn test_second_prepare_reuses_index() {
        let dir = TempDir::new().unwrap();
        let pdf = fixture(&dir);
        let store = Arc::new(InMemoryVectorStore::new());

        let mut pipeline = QaPipeline::with_components(
            test_config(&pdf),
            store.clone(),
            Arc::new(HashingEmbedder::new(64)),
        )
        .unwrap()
        .with_model(policy_model("NONE"));

        let first = pipeline.prepare().await.unwrap();
        let second = pipeline.prepare().await.unwrap();

        assert!(!first.index.reused);
        assert!(second.index.reused);
        assert_eq!(store.write_count(), 1);

        let stats = pipeline.stats().await.unwrap();
        assert_eq!(
            stats,
            CollectionStats {
                collection: "policy-test".to_string(),
                backend: "memory".to_string(),
                exists: true,
                vectors: 3,
            }
        );
    }

    #[tokio::test]
    async fn test_ask_before_prepare_is_rejected() {
        let dir = TempDir::new().unwrap();
        let pipeline = QaPipeline::with_components(
            test_config(&dir.path().join("policy.pdf")),
            Arc::new(InMemoryVectorStore::new()),
            Arc::new(HashingEmbedder::new(64)),
        )
        .unwrap()
        .with_model(policy_model("NONE"));

        let err = pipeline
            .ask("anything", AskOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
    }

    #[tokio::test]
    async fn test_missing_pdf_is_load_error() {
        let dir = TempDir::new().unwrap();
        let mut pipeline = QaPipeline::with_components(
            test_config(&dir.path().join("absent.pdf")),
            Arc::new(InMemoryVectorStore::new()),
            Arc::new(HashingEmbedder::new(64)),
        )
        .unwrap()
        .with_model(policy_model("NONE"));

        assert!(matches!(
            pipeline.prepare().await,
            Err(PipelineError::Load { .. })
        ));
    }

    #[tokio::test]
    async fn test_panicked_load_is_load_error() {
        let err = load_off_runtime(PathBuf::from("policy.pdf"), |_| -> Result<Vec<Page>> {
            panic!("corrupt xref")
        })
        .await
        .unwrap_err();

        match err {
            PipelineError::Load { path, message } => {
                assert_eq!(path, PathBuf::from("policy.pdf"));
                assert!(message.contains("loading task failed"));
            }
            other => panic!("expected a load error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ask_without_model_is_config_error() {
        let dir = TempDir::new().unwrap();
        let pdf = fixture(&dir);
        let mut pipeline = QaPipeline::with_components(
            test_config(&pdf),
            Arc::new(InMemoryVectorStore::new()),
            Arc::new(HashingEmbedder::new(64)),
        )
        .unwrap();
        pipeline.prepare().await.unwrap();

        let hits = pipeline.search("supplier security", 1).await.unwrap();
        assert_eq!(hits.len(), 1);

        let err = pipeline
            .ask("what does 6.7 say?", AskOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
