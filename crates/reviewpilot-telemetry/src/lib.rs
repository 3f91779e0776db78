//! ReviewPilot Telemetry
//!
//! Latency bookkeeping for the intelligence pipeline.
//!
//! Provides:
//! - Per-operation latency windows with bounded memory
//! - avg/min/max/count summaries for health reporting
//! - Histogram emission through the `metrics` facade

pub mod metrics;

pub use crate::metrics::{MetricsCollector, Operation, OperationStats, Timer, DEFAULT_WINDOW};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::metrics::{MetricsCollector, Operation, OperationStats};
}
