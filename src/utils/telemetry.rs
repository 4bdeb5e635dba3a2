// file: src/utils/telemetry.rs
// description: Stage timing and throughput reporting for the qa pipeline
// reference: tracing spans and structured log fields

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::info;

/// Logs the start and end of one pipeline stage (load, chunk, index, ...).
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        info!(stage = operation, "Starting");
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn finish(self) -> Duration {
        let elapsed = self.elapsed();
        info!(
            stage = %self.operation,
            "Completed in {:.2}s",
            elapsed.as_secs_f64()
        );
        elapsed
    }

    pub fn finish_with_count(self, count: usize) -> PerformanceMetrics {
        let metrics = PerformanceMetrics::new(&self.operation, count, self.elapsed());
        info!(stage = %self.operation, "{}", metrics.format());
        metrics
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub operation: String,
    pub count: usize,
    pub duration_ms: u64,
    pub throughput: f64, // items per second
}

impl PerformanceMetrics {
    pub fn new(operation: &str, count: usize, duration: Duration) -> Self {
        let duration_secs = duration.as_secs_f64();
        let throughput = if duration_secs > 0.0 {
            count as f64 / duration_secs
        } else {
            0.0
        };

        Self {
            operation: operation.to_string(),
            count,
            duration_ms: duration.as_millis() as u64,
            throughput,
        }
    }

    pub fn format(&self) -> String {
        format!(
            "{}: {} items in {}ms ({:.2} items/sec)",
            self.operation, self.count, self.duration_ms, self.throughput
        )
    }
}
