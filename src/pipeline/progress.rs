// file: src/pipeline/progress.rs
// description: progress tracking for batched indexing runs
// reference: uses indicatif for progress bars and tracks batch metrics

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub batches_written: usize,
    pub chunks_written: usize,
}

pub struct ProgressTracker {
    bar: ProgressBar,
    batches_written: AtomicUsize,
    chunks_written: AtomicUsize,
}

impl ProgressTracker {
    /// A tracker over `total_batches`; draws nothing unless `visible`.
    pub fn new(total_batches: usize, visible: bool, colored: bool) -> Self {
        let bar = if visible {
            create_progress_bar(total_batches as u64, colored)
        } else {
            ProgressBar::hidden()
        };

        Self {
            bar,
            batches_written: AtomicUsize::new(0),
            chunks_written: AtomicUsize::new(0),
        }
    }

    pub fn batch_written(&self, chunks: usize) {
        let batches = self.batches_written.fetch_add(1, Ordering::SeqCst) + 1;
        let total_chunks = self.chunks_written.fetch_add(chunks, Ordering::SeqCst) + chunks;
        self.bar.inc(1);
        self.bar
            .set_message(format!("batches: {} | chunks: {}", batches, total_chunks));
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("Indexing complete");
    }

    pub fn abandon(&self, message: String) {
        self.bar.abandon_with_message(message);
    }

    pub fn get_stats(&self) -> BatchStats {
        BatchStats {
            batches_written: self.batches_written.load(Ordering::SeqCst),
            chunks_written: self.chunks_written.load(Ordering::SeqCst),
        }
    }
}

fn create_progress_bar(total: u64, colored: bool) -> ProgressBar {
    let bar = ProgressBar::new(total);
    let (template, chars) = if colored {
        (
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
            "█▓▒░",
        )
    } else {
        (
            "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({eta}) {msg}",
            "=>-",
        )
    };

    let style = ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars(chars);
    bar.set_style(style);
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_tracker_counts_batches() {
        let tracker = ProgressTracker::new(3, false, false);

        tracker.batch_written(20);
        tracker.batch_written(5);
        tracker.finish();

        let stats = tracker.get_stats();
        assert_eq!(stats.batches_written, 2);
        assert_eq!(stats.chunks_written, 25);
    }
}
