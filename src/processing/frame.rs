//! Frame payloads flowing through the engine.

use tracing::warn;

use crate::utils::{DispatchError, DispatchResult};

/// Bytes per pixel: interleaved 3-channel, 8 bits each.
pub const CHANNELS: usize = 3;

/// An owned interleaved 3-channel 8-bit pixel buffer.
///
/// Channel order is whatever the producing side used (capture pipelines
/// typically hand over BGR); the engine itself never interprets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Frame {
    /// Wraps an existing pixel buffer.
    ///
    /// Fails if the buffer length does not match `width * height * 3`.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> DispatchResult<Self> {
        let expected = width as usize * height as usize * CHANNELS;
        if pixels.len() != expected {
            return Err(DispatchError::validation(format!(
                "Pixel buffer length {} does not match {}x{}x{} = {}",
                pixels.len(),
                width,
                height,
                CHANNELS,
                expected
            )));
        }
        if width == 0 || height == 0 {
            return Err(DispatchError::validation("Frame dimensions must be non-zero"));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Creates a frame filled with a single color.
    ///
    /// Zero dimensions are clamped to 1 so the frame stays a valid
    /// transform input.
    pub fn solid(width: u32, height: u32, color: [u8; 3]) -> Self {
        if width == 0 || height == 0 {
            warn!("Zero frame dimension {}x{}, clamping to 1", width, height);
        }
        let width = width.max(1);
        let height = height.max(1);
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * CHANNELS);
        for _ in 0..count {
            pixels.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// Reads the pixel at (`x`, `y`). Coordinates must be in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = self.offset(x, y);
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }

    /// Writes the pixel at (`x`, `y`). Coordinates must be in bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) {
        let i = self.offset(x, y);
        self.pixels[i..i + CHANNELS].copy_from_slice(&color);
    }

    /// Swaps the first and third channel of every pixel (BGR <-> RGB).
    pub fn swap_red_blue(&mut self) {
        for pixel in self.pixels.chunks_exact_mut(CHANNELS) {
            pixel.swap(0, 2);
        }
    }
}
