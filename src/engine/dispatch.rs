//! The engine facade: dispatcher plus lifecycle management.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::engine::config::EngineConfig;
use crate::engine::handle::{Waiter, completion};
use crate::engine::queue::BoundedQueue;
use crate::engine::worker::{Job, Transform, worker_loop};
use crate::utils::{DispatchError, DispatchResult};

/// Fixed pool of worker threads consuming jobs from a shared bounded queue.
///
/// `P` is the payload type, `R` the per-item result; the transformation
/// between them is a function value supplied at construction and entirely
/// opaque to the engine. Construction spawns the workers; [`stop`](Self::stop)
/// or drop shuts them down, draining already-queued jobs first.
pub struct Engine<P, R> {
    queue: Arc<BoundedQueue<Job<P, R>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_count: usize,
}

impl<P: Send + 'static, R: Send + 'static> Engine<P, R> {
    /// Validates `config`, then spawns the worker pool.
    ///
    /// If any thread fails to spawn, the already-spawned workers are shut
    /// down before the error is returned.
    pub fn new<F>(config: EngineConfig, transform: F) -> DispatchResult<Self>
    where
        F: Fn(P) -> R + Send + Sync + 'static,
    {
        config.validate()?;

        let queue = Arc::new(BoundedQueue::with_capacity(config.queue_capacity));
        let transform: Arc<Transform<P, R>> = Arc::new(transform);
        let mut workers = Vec::with_capacity(config.worker_count);

        for id in 0..config.worker_count {
            let spawned = thread::Builder::new()
                .name(format!("dispatch-worker-{}", id))
                .spawn({
                    let queue = queue.clone();
                    let transform = transform.clone();
                    move || worker_loop(id, queue, transform)
                });
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    queue.close();
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(DispatchError::worker(format!(
                        "Failed to spawn worker {}: {}",
                        id, e
                    )));
                }
            }
        }

        info!(
            "Engine started with {} workers (queue capacity: {})",
            config.worker_count,
            config
                .queue_capacity
                .map_or_else(|| "unbounded".to_string(), |c| c.to_string())
        );

        Ok(Self {
            queue,
            workers: Mutex::new(workers),
            worker_count: config.worker_count,
        })
    }

    /// Submits a batch of payloads and returns one waiter per payload,
    /// index-for-index with the input.
    ///
    /// The whole batch is pushed as one atomic group. This call blocks only
    /// on queue admission (backpressure), never on completion; results may
    /// complete in any order and must be correlated through each waiter.
    /// Fails with [`DispatchError::Stopped`] once the engine has been
    /// stopped.
    pub fn submit(&self, payloads: impl IntoIterator<Item = P>) -> DispatchResult<Vec<Waiter<R>>> {
        let mut jobs = Vec::new();
        let mut waiters = Vec::new();
        for payload in payloads {
            let (completer, waiter) = completion();
            jobs.push(Job {
                payload,
                completion: completer,
            });
            waiters.push(waiter);
        }
        debug!("Submitting batch of {} jobs", jobs.len());
        self.queue.push_all(jobs)?;
        Ok(waiters)
    }

    /// Stops the engine: closes the queue and joins every worker.
    ///
    /// Already-queued jobs are still processed before the workers exit
    /// (graceful drain). Idempotent and safe to call from multiple threads;
    /// exactly one caller performs the broadcast and the joins. Dropping the
    /// engine invokes the same shutdown implicitly.
    pub fn stop(&self) {
        self.shutdown();
    }

    fn shutdown(&self) {
        if self.queue.close() {
            info!("Stopping engine; {} jobs left to drain", self.queue.len());
        }

        let handles: Vec<_> = self.workers.lock().drain(..).collect();
        for handle in handles {
            let name = handle.thread().name().unwrap_or("worker").to_string();
            if handle.join().is_err() {
                // The transform panicked on this thread. Its in-flight job
                // is abandoned and any waiter on it fails fast.
                warn!("{} panicked before shutdown", name);
            }
        }
    }

    /// Number of worker threads, fixed at construction.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Jobs currently queued (excluding in-flight jobs).
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Whether [`stop`](Self::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.queue.is_closed()
    }
}

impl<P, R> Drop for Engine<P, R> {
    fn drop(&mut self) {
        if self.queue.close() {
            debug!("Engine dropped without explicit stop; shutting down");
        }
        for handle in self.workers.lock().drain(..) {
            let _ = handle.join();
        }
    }
}
