//! Worker loop shared by every thread in the pool.

use std::sync::Arc;

use tracing::debug;

use crate::engine::handle::Completer;
use crate::engine::queue::BoundedQueue;

/// One unit of work paired with its completion handle.
///
/// Owned by the dispatcher until enqueued, by the queue until popped, then
/// by exactly one worker until the completion is set.
pub(crate) struct Job<P, R> {
    pub payload: P,
    pub completion: Completer<R>,
}

/// Per-item transformation supplied by the embedding program.
pub(crate) type Transform<P, R> = dyn Fn(P) -> R + Send + Sync;

/// Consume-process-complete loop.
///
/// Workers are symmetric and interchangeable: no job is pinned to a thread,
/// so load balances across heterogeneous per-job costs. The loop exits only
/// when the queue reports closed-and-drained, which guarantees every
/// already-pushed job is processed before shutdown finishes.
pub(crate) fn worker_loop<P, R>(
    id: usize,
    queue: Arc<BoundedQueue<Job<P, R>>>,
    transform: Arc<Transform<P, R>>,
) {
    debug!("Worker {} started", id);
    let mut processed = 0usize;

    while let Some(job) = queue.pop() {
        let result = (*transform)(job.payload);
        if let Err(e) = job.completion.complete(result) {
            // Exactly one worker owns each job; a second completion means
            // the engine's invariants are broken. Fail fast.
            panic!("Worker {}: {}", id, e);
        }
        processed += 1;
    }

    debug!("Worker {} exiting after {} jobs", id, processed);
}
