//! Throughput measurement for batch runs.

use serde::Serialize;
use std::fmt;
use std::time::Instant;
use tracing::warn;

/// Wall-clock timer accumulating processed-frame counts.
pub struct ThroughputTimer {
    started: Instant,
    frame_count: usize,
}

impl ThroughputTimer {
    /// Starts timing now.
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            frame_count: 0,
        }
    }

    /// Records `frames` completed frames.
    pub fn record_frames(&mut self, frames: usize) {
        if frames == 0 {
            warn!("Recording zero frames");
        }
        self.frame_count += frames;
    }

    /// Stops timing and produces the report.
    pub fn finish(self) -> ThroughputReport {
        let elapsed = self.started.elapsed().as_secs_f64();
        let frames_per_sec = if elapsed > 0.0 {
            self.frame_count as f64 / elapsed
        } else {
            0.0
        };
        let avg_per_frame_ms = if self.frame_count > 0 {
            elapsed * 1000.0 / self.frame_count as f64
        } else {
            0.0
        };
        ThroughputReport {
            frame_count: self.frame_count,
            total_time_ms: (elapsed * 1000.0) as u64,
            frames_per_sec,
            avg_per_frame_ms,
        }
    }
}

/// Result of a timed batch run.
#[derive(Debug, Clone, Serialize)]
pub struct ThroughputReport {
    /// Frames processed across all batches
    #[serde(rename = "frameCount")]
    pub frame_count: usize,
    /// Total wall-clock time in milliseconds
    #[serde(rename = "totalTimeMs")]
    pub total_time_ms: u64,
    /// Throughput in frames per second
    #[serde(rename = "framesPerSec")]
    pub frames_per_sec: f64,
    /// Average wall-clock time per frame in milliseconds
    #[serde(rename = "avgPerFrameMs")]
    pub avg_per_frame_ms: f64,
}

impl fmt::Display for ThroughputReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Frames:     {}", self.frame_count)?;
        writeln!(f, "Total time: {}ms", self.total_time_ms)?;
        writeln!(f, "Per frame:  {:.2}ms", self.avg_per_frame_ms)?;
        write!(f, "Throughput: {:.1} frames/s", self.frames_per_sec)
    }
}
