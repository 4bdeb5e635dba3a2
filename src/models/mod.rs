// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod answer;
pub mod chunk;
pub mod page;
pub mod search_result;

pub use answer::{Answer, Query};
pub use chunk::{Chunk, EmbeddedChunk};
pub use page::Page;
pub use search_result::{RetrievalResult, RetrievalStrategy, ScoredChunk};
