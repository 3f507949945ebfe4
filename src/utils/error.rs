//! Error types for the dispatch engine.
//!
//! Provides a small error hierarchy using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for the dispatch engine.
///
/// Synchronization-layer contract violations (double completion, abandoned
/// handles) are deliberately *not* represented here: those fail fast at the
/// point of violation instead of being propagated.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Submission attempted after the engine has been stopped
    #[error("Engine stopped: {0}")]
    Stopped(String),

    /// Worker thread management failed
    #[error("Worker error: {0}")]
    Worker(String),

    /// Configuration or input validation failed
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Convenience result type for engine operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

// Helper methods for error creation
impl DispatchError {
    pub fn stopped<T: Into<String>>(msg: T) -> Self {
        Self::Stopped(msg.into())
    }

    pub fn worker<T: Into<String>>(msg: T) -> Self {
        Self::Worker(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        Self::Validation(msg.into())
    }
}
