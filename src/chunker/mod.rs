// file: src/chunker/mod.rs
// description: text chunking module exports
// reference: internal module structure

pub mod page_chunker;
pub mod splitter;

pub use page_chunker::Chunker;
pub use splitter::{DEFAULT_SEPARATORS, RecursiveSplitter};
