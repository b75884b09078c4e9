//! frerlab-core: trace parsing and sequence-integrity metrics.
//!
//! The pure data layer of the sweep harness:
//! - Reads scavetool CSV vector exports into named time series
//! - Computes out-of-order / duplicate ratios and inter-arrival quartiles
//! - Renders the metric tables the CLI prints
//!
//! Subprocess and filesystem orchestration live in `frerlab-sweep`.

pub mod error;
pub mod metrics;
pub mod report;
pub mod telemetry;
pub mod trace;

pub use error::{Result, TraceError};
pub use metrics::{
    compute_integrity, compute_intervals, interval_stats, IntervalStats, SequenceIntegrity,
};
pub use report::{IntegrityReport, IntegrityRow, IntervalReport, IntervalRow};
pub use telemetry::init_tracing;
pub use trace::{read_vector, VectorSeries};

/// frerlab version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
