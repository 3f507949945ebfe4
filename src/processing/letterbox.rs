//! Letterbox resize: the per-frame transformation used by the demos.
//!
//! This is a collaborator of the engine, not part of it; any
//! `Fn(P) -> R + Send + Sync` works in its place.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::processing::frame::Frame;
use crate::utils::{DispatchError, DispatchResult};

/// Target canvas for letterboxed frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LetterboxSettings {
    /// Target canvas width in pixels
    #[serde(rename = "targetWidth")]
    pub target_width: u32,
    /// Target canvas height in pixels
    #[serde(rename = "targetHeight")]
    pub target_height: u32,
}

impl Default for LetterboxSettings {
    fn default() -> Self {
        Self {
            target_width: 800,
            target_height: 800,
        }
    }
}

impl LetterboxSettings {
    pub fn validate(&self) -> DispatchResult<()> {
        if self.target_width == 0 || self.target_height == 0 {
            return Err(DispatchError::validation("Target dimensions must be non-zero"));
        }
        Ok(())
    }
}

/// Scales `frame` to fit the target canvas with its aspect ratio preserved
/// (nearest-neighbor) and centers it on a black background.
pub fn letterbox(frame: &Frame, settings: &LetterboxSettings) -> Frame {
    let target_w = settings.target_width;
    let target_h = settings.target_height;

    let scale = f32::min(
        target_w as f32 / frame.width() as f32,
        target_h as f32 / frame.height() as f32,
    );
    let new_w = ((frame.width() as f32 * scale) as u32).clamp(1, target_w);
    let new_h = ((frame.height() as f32 * scale) as u32).clamp(1, target_h);

    let x_off = (target_w - new_w) / 2;
    let y_off = (target_h - new_h) / 2;
    debug!(
        "Letterboxing {}x{} -> {}x{} at ({}, {}) on {}x{}",
        frame.width(), frame.height(), new_w, new_h, x_off, y_off, target_w, target_h
    );

    let mut canvas = Frame::solid(target_w, target_h, [0, 0, 0]);
    for y in 0..new_h {
        let src_y = ((y as f32 / scale) as u32).min(frame.height() - 1);
        for x in 0..new_w {
            let src_x = ((x as f32 / scale) as u32).min(frame.width() - 1);
            canvas.set_pixel(x + x_off, y + y_off, frame.pixel(src_x, src_y));
        }
    }
    canvas
}

/// The full per-frame transform: letterbox onto the target canvas, then
/// convert the BGR capture ordering to RGB.
pub fn process_frame(frame: Frame, settings: &LetterboxSettings) -> Frame {
    let mut result = letterbox(&frame, settings);
    result.swap_red_blue();
    result
}
