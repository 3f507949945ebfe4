//! Batch-synchronous draining of a frame stream.
//!
//! The upstream source (a capture device, a decoded video) yields frames one
//! at a time and must be consumed batch by batch: submit a full batch, wait
//! for every result, then collect the next batch.

use tracing::{debug, info};

use crate::engine::Engine;
use crate::processing::frame::Frame;
use crate::utils::{DispatchError, DispatchResult};

/// A stream of frames consumed by [`drain_source`].
pub trait FrameSource {
    /// Next frame, or `None` once the stream is exhausted.
    fn next_frame(&mut self) -> Option<Frame>;
}

/// Fixed-length source of generated frames, a stand-in for video capture.
///
/// Frames cycle through distinct solid colors so results remain traceable to
/// their origin.
pub struct SyntheticSource {
    width: u32,
    height: u32,
    remaining: usize,
    produced: usize,
}

impl SyntheticSource {
    /// Zero dimensions are clamped to 1, matching [`Frame::solid`].
    pub fn new(width: u32, height: u32, frame_count: usize) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            remaining: frame_count,
            produced: 0,
        }
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> Option<Frame> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let shade = (self.produced % 256) as u8;
        self.produced += 1;
        Some(Frame::solid(self.width, self.height, [shade, 128, 255 - shade]))
    }
}

/// Drains `source` through `engine` in synchronous batches of `batch_size`.
///
/// Each completed result is handed to `on_result` before the next batch is
/// collected; a final short batch is still submitted. Returns the number of
/// frames processed.
pub fn drain_source<S, R>(
    engine: &Engine<Frame, R>,
    source: &mut S,
    batch_size: usize,
    mut on_result: impl FnMut(R),
) -> DispatchResult<usize>
where
    S: FrameSource,
    R: Clone + Send + 'static,
{
    if batch_size == 0 {
        return Err(DispatchError::validation("Batch size must be at least 1"));
    }

    let mut total = 0usize;
    loop {
        let mut batch = Vec::with_capacity(batch_size);
        while batch.len() < batch_size {
            match source.next_frame() {
                Some(frame) => batch.push(frame),
                None => break,
            }
        }
        if batch.is_empty() {
            break;
        }
        let short_batch = batch.len() < batch_size;

        debug!("Draining batch of {} frames", batch.len());
        let waiters = engine.submit(batch)?;
        for waiter in &waiters {
            on_result(waiter.wait());
        }
        total += waiters.len();

        if short_batch {
            break;
        }
    }

    info!("Source drained: {} frames processed", total);
    Ok(total)
}
