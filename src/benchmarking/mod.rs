pub mod metrics;

pub use metrics::{ThroughputReport, ThroughputTimer};
