//! Concurrency properties of the dispatch engine: completion accounting,
//! backpressure, drain-on-shutdown, and shutdown idempotence.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use image_dispatch::{DispatchError, Engine, EngineConfig};

#[test]
fn scenario_four_workers_capacity_ten() {
    // Pool size 4, capacity 10, batch of 4 payloads: every waiter returns a
    // result traceable to its origin index, and no two results collide.
    let engine = Engine::new(
        EngineConfig::with_workers(4).with_queue_capacity(10),
        |i: usize| (i, format!("processed-{}", i)),
    )
    .unwrap();

    let waiters = engine.submit(vec![1, 2, 3, 4]).unwrap();
    assert_eq!(waiters.len(), 4);

    let mut origins = Vec::new();
    for (slot, waiter) in waiters.iter().enumerate() {
        let (origin, text) = waiter.wait();
        assert_eq!(origin, slot + 1);
        assert_eq!(text, format!("processed-{}", origin));
        origins.push(origin);
    }
    origins.sort_unstable();
    origins.dedup();
    assert_eq!(origins.len(), 4, "two results shared an origin index");
}

#[test]
fn no_lost_jobs_across_task_kinds() {
    let labels = ["detection", "segmentation", "depth", "pose"];
    let completions = Arc::new(AtomicUsize::new(0));

    let engine = Engine::new(EngineConfig::with_workers(2), {
        let completions = completions.clone();
        move |label: &'static str| {
            completions.fetch_add(1, Ordering::SeqCst);
            format!("{}-done", label)
        }
    })
    .unwrap();

    let waiters = engine.submit(labels).unwrap();
    for (label, waiter) in labels.iter().zip(&waiters) {
        assert_eq!(waiter.wait(), format!("{}-done", label));
    }
    assert_eq!(completions.load(Ordering::SeqCst), labels.len());
}

#[test]
fn submit_blocks_on_admission_not_completion() {
    let engine = Engine::new(EngineConfig::with_workers(2), |i: u32| {
        thread::sleep(Duration::from_millis(300));
        i
    })
    .unwrap();

    let waiters = engine.submit(vec![1, 2]).unwrap();
    // submit returned while both transforms are still sleeping
    assert!(waiters.iter().all(|w| !w.is_ready()));
    assert_eq!(waiters[0].wait(), 1);
    assert_eq!(waiters[1].wait(), 2);
}

#[test]
fn backpressure_never_exceeds_capacity() {
    // One worker, gated so jobs only finish when we send a token.
    let (tx, rx) = mpsc::channel::<()>();
    let rx = Arc::new(Mutex::new(rx));

    let engine = Arc::new(
        Engine::new(EngineConfig::with_workers(1).with_queue_capacity(3), {
            let rx = rx.clone();
            move |i: u32| {
                rx.lock().unwrap().recv().unwrap();
                i
            }
        })
        .unwrap(),
    );

    // First job is popped by the worker and parks on the gate; the next
    // three fill the queue to its capacity.
    let first = engine.submit(vec![0]).unwrap();
    thread::sleep(Duration::from_millis(50));
    let filler = engine.submit(vec![1, 2, 3]).unwrap();
    assert_eq!(engine.queue_len(), 3);

    // A group of two cannot be admitted while 3 + 2 > 3.
    let producer = {
        let engine = engine.clone();
        thread::spawn(move || engine.submit(vec![4, 5]).unwrap())
    };
    thread::sleep(Duration::from_millis(100));
    assert!(!producer.is_finished(), "push admitted past capacity");
    assert!(engine.queue_len() <= 3);

    // Freeing two slots satisfies the admission predicate.
    tx.send(()).unwrap();
    tx.send(()).unwrap();
    let blocked = producer.join().unwrap();
    assert!(engine.queue_len() <= 3);

    // Release everything and check nothing was lost or duplicated.
    for _ in 0..4 {
        tx.send(()).unwrap();
    }
    let mut results: Vec<u32> = first
        .iter()
        .chain(&filler)
        .chain(&blocked)
        .map(|w| w.wait())
        .collect();
    results.sort_unstable();
    assert_eq!(results, vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn stop_drains_queued_jobs_before_workers_exit() {
    let engine = Engine::new(EngineConfig::with_workers(1), |i: u32| {
        thread::sleep(Duration::from_millis(20));
        i * 2
    })
    .unwrap();

    let waiters = engine.submit((0..10).collect::<Vec<_>>()).unwrap();
    // Most of the batch is still queued when stop is called; stop joins the
    // workers, which keep pulling until the queue is drained.
    engine.stop();

    for (i, waiter) in waiters.iter().enumerate() {
        assert_eq!(waiter.try_wait(), Some(i as u32 * 2), "job {} was abandoned", i);
    }
}

#[test]
fn stop_is_idempotent_across_threads() {
    let engine = Arc::new(Engine::new(EngineConfig::with_workers(4), |i: u32| i).unwrap());
    let waiters = engine.submit(vec![1, 2, 3]).unwrap();

    let stoppers: Vec<_> = (0..4)
        .map(|_| {
            let engine = engine.clone();
            thread::spawn(move || engine.stop())
        })
        .collect();
    for stopper in stoppers {
        stopper.join().unwrap();
    }
    engine.stop(); // and once more from this thread

    for waiter in &waiters {
        assert!(waiter.is_ready());
    }
    assert!(engine.is_stopped());
}

#[test]
fn submit_after_stop_is_rejected() {
    let engine = Engine::new(EngineConfig::with_workers(1), |i: u32| i).unwrap();
    engine.stop();
    match engine.submit(vec![1]) {
        Err(DispatchError::Stopped(_)) => {}
        other => panic!("expected Stopped error, got {:?}", other.map(|w| w.len())),
    }
}

#[test]
fn empty_submit_follows_the_same_stop_contract() {
    let engine = Engine::new(EngineConfig::with_workers(1), |i: u32| i).unwrap();
    // While running, an empty batch is a harmless no-op.
    assert!(engine.submit(Vec::new()).unwrap().is_empty());

    engine.stop();
    assert!(matches!(
        engine.submit(Vec::new()),
        Err(DispatchError::Stopped(_))
    ));
}

#[test]
fn completion_order_is_independent_of_submission_order() {
    let engine = Engine::new(
        EngineConfig::with_workers(2),
        |(name, delay_ms): (&'static str, u64)| {
            thread::sleep(Duration::from_millis(delay_ms));
            name
        },
    )
    .unwrap();

    // A is slow, B is fast; both start immediately on separate workers.
    let waiters = engine.submit(vec![("A", 400), ("B", 10)]).unwrap();
    let b = waiters[1].wait();
    assert_eq!(b, "B");
    assert!(
        !waiters[0].is_ready(),
        "slow job finished before the fast one was observed"
    );
    assert_eq!(waiters[0].wait(), "A");
}

#[test]
fn zero_worker_config_is_rejected() {
    let result = Engine::new(EngineConfig::with_workers(0), |i: u32| i);
    assert!(matches!(result, Err(DispatchError::Validation(_))));
}

#[test]
fn drop_without_stop_joins_workers() {
    let counter = Arc::new(AtomicUsize::new(0));
    let waiters = {
        let engine = Engine::new(EngineConfig::with_workers(2), {
            let counter = counter.clone();
            move |i: u32| {
                counter.fetch_add(1, Ordering::SeqCst);
                i
            }
        })
        .unwrap();
        engine.submit(vec![1, 2, 3, 4]).unwrap()
        // engine dropped here without an explicit stop
    };

    // Implicit shutdown drained the queue before joining.
    assert_eq!(counter.load(Ordering::SeqCst), 4);
    for waiter in &waiters {
        assert!(waiter.is_ready());
    }
}
