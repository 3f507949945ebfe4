// Module declarations in dependency order
#[cfg(feature = "benchmarking")]
pub mod benchmarking;
pub mod engine;
pub mod processing;
pub mod utils;

// Public exports for external consumers
pub use engine::{BoundedQueue, Completer, DoubleCompletion, Engine, EngineConfig, Waiter, completion};
pub use processing::{Frame, FrameSource, LetterboxSettings, SyntheticSource, drain_source, process_frame};
pub use utils::{DispatchError, DispatchResult, FramePathSequence, tagged_output_path};
#[cfg(feature = "benchmarking")]
pub use benchmarking::{ThroughputReport, ThroughputTimer};

// This library file is the public API for consuming the crate as a library.
// The demo entry point is in main.rs.
