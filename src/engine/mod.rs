mod config;
mod dispatch;
mod handle;
mod queue;
mod worker;

pub use config::EngineConfig;
pub use dispatch::Engine;
pub use handle::{Completer, DoubleCompletion, Waiter, completion};
pub use queue::BoundedQueue;
