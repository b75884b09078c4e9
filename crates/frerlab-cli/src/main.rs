//! frerlab: the FRER simulation sweep harness.
//!
//! ## Commands
//!
//! - `run`: one simulator invocation, optionally exporting the standard
//!   vector set to CSV
//! - `sweep`: sweep the merger jitter parameter, extracting a per-point
//!   sequence-number trace
//! - `report integrity`: out-of-order / duplicate ratio table over
//!   exported traces
//! - `report intervals`: inter-arrival quartile table over exported traces

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::time::sleep;
use tracing::{info, Level};

use frerlab_core::{
    compute_integrity, init_tracing, interval_stats, read_vector, IntegrityReport, IntegrityRow,
    IntervalReport, IntervalRow,
};
use frerlab_sweep::{
    locate_result, run_sweep, ScaveTool, SimCommand, SweepPlan, DEFAULT_JITTER_KEY,
};

/// Vector carrying received sequence numbers.
const SEQNUM_VECTOR: &str = "seqNum:vector";

/// Vector carrying per-packet reception timestamps.
const JITTER_VECTOR: &str = "packetJitter:vector";

#[derive(Parser)]
#[command(name = "frerlab")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Drive FRER simulations and measure stream integrity", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Simulator layout flags shared by `run` and `sweep`.
#[derive(Args, Clone)]
struct SimArgs {
    /// Path to the FRER simulator binary
    #[arg(long, default_value = "./FRER")]
    binary: PathBuf,

    /// INET installation root
    #[arg(long, default_value = "../inet4.5")]
    inet_root: PathBuf,

    /// Simulation directory holding omnetpp.ini and results/
    #[arg(long, default_value = "simulations")]
    sim_dir: PathBuf,

    /// Path to the scavetool binary used for vector export
    #[arg(long, default_value = "opp_scavetool")]
    scavetool: PathBuf,
}

impl SimArgs {
    fn command(&self) -> SimCommand {
        SimCommand::from_layout(&self.binary, &self.inet_root, &self.sim_dir)
    }

    fn results_dir(&self) -> PathBuf {
        self.sim_dir.join("results")
    }

    fn scavetool(&self) -> ScaveTool {
        ScaveTool::new(&self.scavetool)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run one simulation, optionally exporting the standard vector set
    Run {
        #[command(flatten)]
        sim: SimArgs,

        /// Export vectors to CSV after the run (requires --prefix)
        #[arg(long)]
        export: bool,

        /// Prefix for exported CSV names (e.g. baseline, dynamicHL)
        #[arg(long)]
        prefix: Option<String>,

        /// Explicit result artifact to export instead of the newest one
        #[arg(long)]
        vec_filename: Option<String>,
    },

    /// Sweep the merger jitter parameter over a closed range
    Sweep {
        #[command(flatten)]
        sim: SimArgs,

        /// First jitter value, in milliseconds
        #[arg(long, default_value_t = 0)]
        from: u32,

        /// Last jitter value, in milliseconds (inclusive)
        #[arg(long, default_value_t = 10)]
        to: u32,

        /// Prefix for per-point trace names
        #[arg(long, default_value = "dynamicHL")]
        prefix: String,

        /// Qualified config key of the swept parameter
        #[arg(long, default_value = DEFAULT_JITTER_KEY)]
        jitter_key: String,

        /// Settling delay after each run, in milliseconds
        #[arg(long, default_value_t = 1000)]
        settle_ms: u64,
    },

    /// Tabulate metrics from exported traces
    Report {
        #[command(subcommand)]
        kind: ReportKind,
    },
}

#[derive(Subcommand)]
enum ReportKind {
    /// Out-of-order and duplicate ratios per scenario
    Integrity {
        /// Directory holding the exported CSV traces
        #[arg(long, default_value = "simulations/results")]
        dir: PathBuf,

        /// Sweep prefix; adds a <prefix>_J<j> row for each jitter value
        #[arg(long, default_value = "dynamicHL")]
        prefix: String,

        /// First jitter value of the sweep
        #[arg(long, default_value_t = 0)]
        from: u32,

        /// Last jitter value of the sweep (inclusive)
        #[arg(long, default_value_t = 10)]
        to: u32,

        /// Additional fixed scenarios (reads <name>_seqNum.csv)
        #[arg(long)]
        scenario: Vec<String>,

        /// Also write the report as pretty JSON to this path
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Inter-arrival quartiles (µs) per scenario
    Intervals {
        /// Directory holding the exported CSV traces
        #[arg(long, default_value = "simulations/results")]
        dir: PathBuf,

        /// Scenarios to include (reads <name>_packetJitter.csv)
        #[arg(long, default_values_t = default_jitter_scenarios())]
        scenario: Vec<String>,

        /// Also write the report as pretty JSON to this path
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn default_jitter_scenarios() -> Vec<String> {
    vec![
        "baseline".to_string(),
        "dynamicHL".to_string(),
        "sorting".to_string(),
        "shaping".to_string(),
    ]
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    match cli.command {
        Commands::Run {
            sim,
            export,
            prefix,
            vec_filename,
        } => cmd_run(sim, export, prefix, vec_filename).await,
        Commands::Sweep {
            sim,
            from,
            to,
            prefix,
            jitter_key,
            settle_ms,
        } => cmd_sweep(sim, from, to, prefix, jitter_key, settle_ms).await,
        Commands::Report { kind } => match kind {
            ReportKind::Integrity {
                dir,
                prefix,
                from,
                to,
                scenario,
                output,
            } => cmd_report_integrity(&dir, &prefix, from, to, &scenario, output.as_deref()),
            ReportKind::Intervals {
                dir,
                scenario,
                output,
            } => cmd_report_intervals(&dir, &scenario, output.as_deref()),
        },
    }
}

async fn cmd_run(
    sim: SimArgs,
    export: bool,
    prefix: Option<String>,
    vec_filename: Option<String>,
) -> Result<()> {
    let export_prefix = match (export, prefix) {
        (true, None) => bail!("--export requires --prefix"),
        (true, Some(prefix)) => Some(prefix),
        (false, _) => None,
    };

    let run = sim.command().run().await.context("simulation run failed")?;
    print!("{}", run.stdout);
    info!(duration_ms = run.duration_ms, "simulation complete");

    let Some(prefix) = export_prefix else {
        info!("skipping CSV export (pass --export to enable)");
        return Ok(());
    };

    // let the simulator's result writes flush before looking
    sleep(Duration::from_secs(1)).await;

    let vec_file = locate_result(&sim.results_dir(), vec_filename.as_deref())
        .context("no exportable result artifact")?;
    let written = sim
        .scavetool()
        .export_scenario(&prefix, &vec_file)
        .await
        .context("vector export failed")?;

    for path in written {
        println!("exported {}", path.display());
    }
    Ok(())
}

async fn cmd_sweep(
    sim: SimArgs,
    from: u32,
    to: u32,
    prefix: String,
    jitter_key: String,
    settle_ms: u64,
) -> Result<()> {
    if from > to {
        bail!("--from ({from}) must not exceed --to ({to})");
    }

    let plan = SweepPlan {
        jitter_key,
        jitter_ms: from..=to,
        settle: Duration::from_millis(settle_ms),
        ..SweepPlan::new(sim.results_dir(), prefix)
    };

    let points = run_sweep(&sim.command(), &sim.scavetool(), &plan)
        .await
        .context("sweep aborted")?;

    println!("sweep complete: {} point(s)", points.len());
    for point in points {
        println!("  jitter {:>2} ms -> {}", point.jitter_ms, point.trace.display());
    }
    Ok(())
}

fn cmd_report_integrity(
    dir: &Path,
    prefix: &str,
    from: u32,
    to: u32,
    scenarios: &[String],
    output: Option<&Path>,
) -> Result<()> {
    let mut rows = Vec::new();

    for jitter in from..=to {
        let label = format!("{prefix}_J{jitter}");
        rows.push(integrity_row(dir, &label, &format!("{label}_seqNum.csv"))?);
    }
    for name in scenarios {
        rows.push(integrity_row(dir, name, &format!("{name}_seqNum.csv"))?);
    }

    let report = IntegrityReport::new(rows);
    print!("{}", report.render_table());
    write_json(output, &report.to_json()?)
}

fn integrity_row(dir: &Path, label: &str, file_name: &str) -> Result<IntegrityRow> {
    let path = dir.join(file_name);
    let series = read_vector(&path, SEQNUM_VECTOR)
        .with_context(|| format!("reading {}", path.display()))?;
    let metrics = compute_integrity(&series.values_as_sequence())
        .with_context(|| format!("integrity metrics for {label}"))?;
    Ok(IntegrityRow {
        scenario: label.to_string(),
        metrics,
    })
}

fn cmd_report_intervals(dir: &Path, scenarios: &[String], output: Option<&Path>) -> Result<()> {
    let mut rows = Vec::new();

    for name in scenarios {
        let path = dir.join(format!("{name}_packetJitter.csv"));
        let series = read_vector(&path, JITTER_VECTOR)
            .with_context(|| format!("reading {}", path.display()))?;
        // reception timestamps are in seconds; quartiles reported in µs
        let stats = interval_stats(&series.times, 1e6)
            .with_context(|| format!("interval statistics for {name}"))?;
        rows.push(IntervalRow::new(name, &stats));
    }

    let report = IntervalReport::new(rows);
    print!("{}", report.render_table());
    write_json(output, &report.to_json()?)
}

fn write_json(output: Option<&Path>, json: &str) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "wrote JSON report");
    }
    Ok(())
}
