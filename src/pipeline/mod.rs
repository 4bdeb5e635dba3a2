// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: pipeline orchestration

mod orchestrator;
pub mod progress;

pub use orchestrator::{AskOptions, CollectionStats, PreparedDocument, QaOutcome, QaPipeline};
pub use progress::{BatchStats, ProgressTracker};
