// file: src/indexer.rs
// description: builds a collection once by embedding chunks in fixed-size batches
// reference: create with the first batch, append the rest, reuse when present

use crate::config::PipelineConfig;
use crate::embeddings::EmbeddingClient;
use crate::error::{BackendError, PipelineError, Result};
use crate::models::Chunk;
use crate::pipeline::progress::ProgressTracker;
use crate::store::{Collection, VectorStore};
use crate::utils::OperationTimer;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionStatus {
    pub exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexReport {
    pub collection: String,
    /// True when the collection already existed and nothing was written.
    pub reused: bool,
    pub batches_written: usize,
    pub chunks_written: usize,
}

pub struct Indexer {
    collection: Collection,
    batch_size: usize,
    show_progress: bool,
    colored: bool,
}

impl Indexer {
    pub fn new(
        config: &PipelineConfig,
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingClient>,
    ) -> Result<Self> {
        if config.batch_size == 0 {
            return Err(PipelineError::Config(
                "batch_size must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            collection: Collection::open(config.collection_name.clone(), store, embedder),
            batch_size: config.batch_size,
            show_progress: false,
            colored: false,
        })
    }

    pub fn with_progress(mut self, show_progress: bool, colored: bool) -> Self {
        self.show_progress = show_progress;
        self.colored = colored;
        self
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub async fn ensure_collection(&self) -> Result<CollectionStatus> {
        let exists = self
            .collection
            .exists()
            .await
            .map_err(|e| self.index_error(e))?;
        Ok(CollectionStatus { exists })
    }

    /// Makes sure every chunk is embedded in the collection exactly once.
    ///
    /// An existing collection is reused as-is. Otherwise chunks are written in
    /// batches; a failing batch aborts the run and earlier batches stay written.
    pub async fn index(&self, chunks: &[Chunk]) -> Result<IndexReport> {
        let name = self.collection.name().to_string();

        if self.ensure_collection().await?.exists {
            info!("Collection '{}' already exists, reusing it", name);
            return Ok(IndexReport {
                collection: name,
                reused: true,
                batches_written: 0,
                chunks_written: 0,
            });
        }

        let batches: Vec<&[Chunk]> = chunks.chunks(self.batch_size).collect();
        let Some((first, rest)) = batches.split_first() else {
            warn!("No chunks to index, collection '{}' not created", name);
            return Ok(IndexReport {
                collection: name,
                reused: false,
                batches_written: 0,
                chunks_written: 0,
            });
        };

        info!(
            "Indexing {} chunks into '{}' in {} batches of up to {}",
            chunks.len(),
            name,
            batches.len(),
            self.batch_size
        );

        let timer = OperationTimer::new("index");
        let progress = ProgressTracker::new(batches.len(), self.show_progress, self.colored);

        let outcome = async {
            self.create_with_first_batch(first).await?;
            progress.batch_written(first.len());
            self.append_remaining_batches(rest, &progress).await
        }
        .await;

        if let Err(e) = outcome {
            let stats = progress.get_stats();
            progress.abandon(format!(
                "failed after {} of {} batches",
                stats.batches_written,
                batches.len()
            ));
            return Err(e);
        }

        progress.finish();
        let stats = progress.get_stats();
        let metrics = timer.finish_with_count(stats.chunks_written);
        info!(
            "Indexed {} chunks in {} batches ({:.1} chunks/s)",
            stats.chunks_written, stats.batches_written, metrics.throughput
        );

        Ok(IndexReport {
            collection: name,
            reused: false,
            batches_written: stats.batches_written,
            chunks_written: stats.chunks_written,
        })
    }

    async fn create_with_first_batch(&self, batch: &[Chunk]) -> Result<()> {
        debug!(
            "Creating collection '{}' with first batch of {} chunks",
            self.collection.name(),
            batch.len()
        );
        self.collection
            .create_with(batch)
            .await
            .map_err(|e| self.index_error(e))
    }

    async fn append_remaining_batches(
        &self,
        batches: &[&[Chunk]],
        progress: &ProgressTracker,
    ) -> Result<()> {
        for (i, batch) in batches.iter().enumerate() {
            debug!(
                "Appending batch {} ({} chunks) to '{}'",
                i + 2,
                batch.len(),
                self.collection.name()
            );
            self.collection
                .add_chunks(batch)
                .await
                .map_err(|e| self.index_error(e))?;
            progress.batch_written(batch.len());
        }
        Ok(())
    }

    fn index_error(&self, source: BackendError) -> PipelineError {
        PipelineError::Index {
            collection: self.collection.name().to_string(),
            source,
        }
    }
}
