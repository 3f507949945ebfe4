//! Engine configuration.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::utils::{DispatchError, DispatchResult};

fn default_worker_count() -> usize {
    let cpu_count = num_cpus::get();
    // Use 90% of CPUs, minimum of 2 workers
    ((cpu_count * 9) / 10).max(2)
}

/// Configuration for a dispatch engine.
///
/// Worker count and queue capacity are fixed at construction; the pool is
/// never resized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of worker threads
    #[serde(rename = "workerCount", default = "default_worker_count")]
    pub worker_count: usize,
    /// Queue capacity limit; `None` means unbounded
    #[serde(rename = "queueCapacity", default)]
    pub queue_capacity: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let worker_count = default_worker_count();
        debug!("Defaulting to {} workers (based on {} CPU cores)", worker_count, num_cpus::get());
        Self {
            worker_count,
            queue_capacity: None,
        }
    }
}

impl EngineConfig {
    /// Creates a config with an explicit worker count and no capacity limit.
    pub fn with_workers(worker_count: usize) -> Self {
        Self {
            worker_count,
            queue_capacity: None,
        }
    }

    /// Sets the queue capacity limit.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    /// Validates the positive-integer contract on both parameters.
    pub fn validate(&self) -> DispatchResult<()> {
        if self.worker_count == 0 {
            return Err(DispatchError::validation("Worker count must be at least 1"));
        }
        if self.queue_capacity == Some(0) {
            return Err(DispatchError::validation(
                "Queue capacity must be at least 1 (use None for unbounded)",
            ));
        }
        Ok(())
    }
}
