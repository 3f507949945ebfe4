pub mod error;
pub mod paths;

pub use error::{DispatchError, DispatchResult};
pub use paths::{FramePathSequence, tagged_output_path};
