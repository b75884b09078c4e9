//! Jitter sweep orchestration.
//!
//! One sweep point at a time: patch the configuration, run the simulator,
//! wait for the result writes to flush, locate the new artifact, export its
//! sequence-number vector. The shared configuration document and results
//! directory are mutated in place, so points are strictly sequential. The
//! pre-sweep configuration bytes are written back on every exit path.

use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::artifact::locate_result;
use crate::config::{ConfigDocument, RestoreGuard};
use crate::error::Result;
use crate::export::ScaveTool;
use crate::runner::SimCommand;

/// Qualified name of the merger jitter parameter in the FRER model.
pub const DEFAULT_JITTER_KEY: &str = "*.s2.bridging.streamRelay.merger.jitter";

/// Filter selecting the sequence-number vector for per-point export.
const SEQNUM_FILTER: &str = "name =~ \"seqNum:vector\"";

/// Parameter sweep description.
#[derive(Debug, Clone)]
pub struct SweepPlan {
    /// Qualified config key of the swept jitter parameter.
    pub jitter_key: String,
    /// Closed set of jitter values to sweep, in milliseconds.
    pub jitter_ms: RangeInclusive<u32>,
    /// Directory the simulator drops result artifacts into.
    pub results_dir: PathBuf,
    /// Prefix for per-point trace names.
    pub prefix: String,
    /// Settling delay between run completion and artifact lookup, letting
    /// the simulator's writes flush (subprocess completion is the only
    /// ordering guarantee the external tool gives).
    pub settle: Duration,
}

impl SweepPlan {
    /// The conventional sweep: jitter 0..=10 ms on the merger parameter.
    pub fn new(results_dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            jitter_key: DEFAULT_JITTER_KEY.to_string(),
            jitter_ms: 0..=10,
            results_dir: results_dir.into(),
            prefix: prefix.into(),
            settle: Duration::from_secs(1),
        }
    }
}

/// One completed sweep point. Bound sequentially: the artifact after the
/// run, the trace after the export; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct SweepPoint {
    /// Jitter value this point ran with, in milliseconds.
    pub jitter_ms: u32,
    /// Result artifact the run produced.
    pub artifact: PathBuf,
    /// Per-point sequence-number trace, named to embed the jitter value.
    pub trace: PathBuf,
}

/// Run the full sweep.
///
/// Any failure aborts the remaining points; traces already exported stay
/// on disk. The configuration document named by `sim.ini_path` is restored
/// to its pre-sweep bytes before this returns, success or failure. When a
/// point fails and the restore write also fails, the point's error
/// propagates and the restore failure is logged.
pub async fn run_sweep(
    sim: &SimCommand,
    scavetool: &ScaveTool,
    plan: &SweepPlan,
) -> Result<Vec<SweepPoint>> {
    let baseline = ConfigDocument::load(&sim.ini_path)?;
    let guard = RestoreGuard::new(&baseline);

    let outcome = sweep_points(sim, scavetool, plan, &baseline).await;

    let restore_result = guard.restore();
    match &restore_result {
        Ok(()) => info!(ini = %sim.ini_path.display(), "restored original configuration"),
        Err(e) => warn!(ini = %sim.ini_path.display(), error = %e, "configuration restore failed"),
    }

    let points = outcome?;
    restore_result?;
    Ok(points)
}

/// The sweep loop proper. Runs with the restore guard armed in the caller.
async fn sweep_points(
    sim: &SimCommand,
    scavetool: &ScaveTool,
    plan: &SweepPlan,
    baseline: &ConfigDocument,
) -> Result<Vec<SweepPoint>> {
    let mut points = Vec::new();

    for jitter in plan.jitter_ms.clone() {
        info!(jitter_ms = jitter, "sweep point start");

        // Patch against the baseline, never against a previous patch.
        let patched = baseline.patched(&plan.jitter_key, &format!("{jitter}ms"))?;
        baseline.persist(&patched)?;

        let run = sim.run().await?;
        debug!(
            jitter_ms = jitter,
            duration_ms = run.duration_ms,
            stdout = %run.stdout,
            stderr = %run.stderr,
            "simulator finished"
        );

        sleep(plan.settle).await;

        let artifact = locate_result(&plan.results_dir, None)?;
        let trace_name = format!("{}_J{}_seqNum.csv", plan.prefix, jitter);
        let trace = scavetool.export(SEQNUM_FILTER, &trace_name, &artifact).await?;

        info!(jitter_ms = jitter, trace = %trace.display(), "sweep point complete");
        points.push(SweepPoint {
            jitter_ms: jitter,
            artifact,
            trace,
        });
    }

    Ok(points)
}
