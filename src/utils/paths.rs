//! Output path construction for processed frames.
//!
//! Pure path math: no file is created or checked here. Writing output, if
//! any, belongs to the embedding program.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Generates sequential, zero-padded output paths for a frame stream.
///
/// Each call to [`next`](Self::next) yields `frame_000000.png`,
/// `frame_000001.png`, ... under the configured directory. The counter is
/// atomic, so paths stay unique when multiple threads name frames
/// concurrently.
#[derive(Debug)]
pub struct FramePathSequence {
    dir: PathBuf,
    index: AtomicUsize,
}

impl FramePathSequence {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            index: AtomicUsize::new(0),
        }
    }

    /// Returns the next unique path in the sequence.
    pub fn next(&self) -> PathBuf {
        let index = self.index.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!("frame_{:06}.png", index))
    }
}

/// Re-roots `input` into `output_dir`, appending `tag` to the file stem and
/// replacing the extension.
///
/// `tagged_output_path("data/source/car.jpg", "results", "letterbox", "png")`
/// yields `results/car_letterbox.png`. An input without a file stem keeps
/// only the tag as its name.
pub fn tagged_output_path(
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    tag: &str,
    extension: &str,
) -> PathBuf {
    let input = input.as_ref();
    let name = match input.file_stem().and_then(|s| s.to_str()) {
        Some(stem) => format!("{}_{}.{}", stem, tag, extension),
        None => format!("{}.{}", tag, extension),
    };
    output_dir.as_ref().join(name)
}
