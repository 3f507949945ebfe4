pub mod frame;
pub mod letterbox;
pub mod stream;

pub use frame::Frame;
pub use letterbox::{LetterboxSettings, letterbox, process_frame};
pub use stream::{FrameSource, SyntheticSource, drain_source};
