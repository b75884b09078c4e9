//! frerlab-sweep: the sweep-and-measure pipeline.
//!
//! Drives the external FRER simulator through a jitter sweep:
//! - Patches one field of the simulation configuration per point and
//!   guarantees the original bytes come back on every exit path
//! - Runs the simulator and the vector export tool as blocking,
//!   sequential subprocess calls
//! - Correlates each run to its result artifact and extracts a per-point
//!   sequence-number trace
//!
//! Trace parsing and metrics live in `frerlab-core`; this crate hands the
//! extracted traces off without reading them.

pub mod artifact;
pub mod config;
pub mod error;
pub mod export;
pub mod runner;
pub mod sweep;

pub use artifact::locate_result;
pub use config::{ConfigDocument, RestoreGuard};
pub use error::{Result, SweepError};
pub use export::ScaveTool;
pub use runner::{RunOutput, SimCommand};
pub use sweep::{run_sweep, SweepPlan, SweepPoint, DEFAULT_JITTER_KEY};
