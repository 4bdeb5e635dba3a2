// file: src/chunker/page_chunker.rs
// description: page-aware chunker assigning document-wide sequential chunk ids
// reference: per-page recursive splitting with citation metadata

use crate::chunker::splitter::{RecursiveSplitter, char_len};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::models::{Chunk, Page};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct Chunker {
    splitter: RecursiveSplitter,
}

impl Chunker {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        Self::with_sizes(config.chunk_size, config.chunk_overlap)
    }

    pub fn with_sizes(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(PipelineError::Config(
                "chunk_size must be greater than 0".to_string(),
            ));
        }

        if chunk_overlap >= chunk_size {
            return Err(PipelineError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            splitter: RecursiveSplitter::new(chunk_size, chunk_overlap),
        })
    }

    /// Splits every page independently; chunk ids keep counting across pages.
    pub fn chunk_pages(&self, pages: &[Page]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut next_id: u64 = 1;

        for page in pages {
            for text in self.split_page(page) {
                chunks.push(Chunk::new(text, page.page_number, next_id, page.source.clone()));
                next_id += 1;
            }
        }

        info!("Created {} chunks from {} pages", chunks.len(), pages.len());
        chunks
    }

    fn split_page(&self, page: &Page) -> Vec<String> {
        if page.is_blank() {
            debug!("Page {} is blank, skipping", page.page_number);
            return Vec::new();
        }

        if char_len(&page.text) <= self.splitter.chunk_size() {
            return vec![page.text.clone()];
        }

        self.splitter.split_text(&page.text)
    }
}
