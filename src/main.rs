// Demo driver for the dispatch engine: runs the pipelined and the
// batch-synchronous mode against the letterbox transform.
// The lib.rs file serves as the public API for external consumers.

use std::thread;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use tracing::{debug, info};

#[cfg(feature = "benchmarking")]
use image_dispatch::ThroughputTimer;
use image_dispatch::{
    Engine, EngineConfig, Frame, FramePathSequence, LetterboxSettings, SyntheticSource,
    drain_source, process_frame, tagged_output_path,
};

/// Demo configuration, optionally loaded from a JSON file passed as the
/// first argument.
#[derive(Debug, Default, Clone, Deserialize)]
struct DemoConfig {
    #[serde(default)]
    engine: EngineConfig,
    #[serde(default)]
    letterbox: LetterboxSettings,
}

fn load_config() -> anyhow::Result<DemoConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path))?;
            let config: DemoConfig = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse config file {}", path))?;
            info!("Loaded config from {}", path);
            Ok(config)
        }
        None => Ok(DemoConfig::default()),
    }
}

/// Pipelined mode: submit one group, then poll the waiters while the main
/// thread stays free for other work.
fn run_pipelined(engine: &Engine<Frame, Frame>) -> anyhow::Result<()> {
    info!("--- Pipelined mode ---");
    let sources: Vec<String> = (0..20)
        .map(|i| format!("data/source/img_{:02}.jpg", i))
        .collect();
    let frames: Vec<Frame> = (0..20)
        .map(|i| Frame::solid(640, 480, [(i * 12) as u8, 64, 200]))
        .collect();
    let waiters = engine.submit(frames)?;

    let mut done = vec![false; waiters.len()];
    while done.iter().any(|d| !d) {
        for (i, waiter) in waiters.iter().enumerate() {
            if done[i] {
                continue;
            }
            if let Some(result) = waiter.try_wait() {
                done[i] = true;
                info!(
                    "{} letterboxed to {}x{} ({})",
                    sources[i],
                    result.width(),
                    result.height(),
                    tagged_output_path(&sources[i], "results", "letterbox", "png").display()
                );
            }
        }
        if done.iter().any(|d| !d) {
            debug!("Main thread doing other work while results arrive");
            thread::sleep(Duration::from_millis(20));
        }
    }
    Ok(())
}

/// Batch-synchronous mode: drain a synthetic frame stream batch by batch.
fn run_batched(engine: &Engine<Frame, Frame>) -> anyhow::Result<()> {
    info!("--- Batch-synchronous mode ---");
    let mut source = SyntheticSource::new(320, 240, 100);
    let paths = FramePathSequence::new("results");

    #[cfg(feature = "benchmarking")]
    let mut timer = ThroughputTimer::start();

    let processed = drain_source(engine, &mut source, 32, |result| {
        debug!(
            "Drained frame ({}x{}) -> {}",
            result.width(),
            result.height(),
            paths.next().display()
        );
    })?;

    #[cfg(feature = "benchmarking")]
    {
        timer.record_frames(processed);
        info!("\n=== Batch Throughput Report ===\n{}", timer.finish());
    }

    info!("Batch-synchronous run processed {} frames", processed);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_file(false)         // Remove file path
        .with_line_number(false)  // Remove line numbers
        .with_thread_ids(false)   // Remove thread IDs
        .with_thread_names(false) // Remove thread names
        .with_target(false)       // Remove module path
        .with_ansi(true)          // Keep colored output
        .with_writer(std::io::stdout)
        .compact();               // Use compact formatter instead of pretty

    subscriber.init();

    info!("=== Dispatch Demo Starting ===");

    let config = load_config()?;
    config.letterbox.validate()?;
    let settings = config.letterbox.clone();

    let engine = Engine::new(config.engine, move |frame| process_frame(frame, &settings))?;

    run_pipelined(&engine)?;
    run_batched(&engine)?;

    engine.stop();
    info!("=== Demo complete ===");
    Ok(())
}
