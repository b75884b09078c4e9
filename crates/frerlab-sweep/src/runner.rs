//! Simulator invocation.
//!
//! The simulator is an opaque external binary with a fixed command-line
//! contract. It is run as a single blocking call per sweep point; its
//! stdout/stderr are captured for diagnostics but never interpreted.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, SweepError};

/// Module trees excluded from NED loading on every run. These pull
/// optional INET features (emulation, OSG visualisation, z3 scheduling,
/// lwIP) the FRER model never references.
const EXCLUDED_MODULES: &[&str] = &[
    "inet.applications.voipstream",
    "inet.common.selfdoc",
    "inet.emulation",
    "inet.examples.emulation",
    "inet.examples.voipstream",
    "inet.linklayer.configurator.gatescheduling.z3",
    "inet.showcases.emulation",
    "inet.showcases.visualizer.osg",
    "inet.transportlayer.tcp_lwip",
    "inet.visualizer.osg",
];

/// One fully-specified simulator invocation.
#[derive(Debug, Clone)]
pub struct SimCommand {
    /// Path to the simulator binary.
    pub binary: PathBuf,
    /// NED search path entries (`-n`, ':'-joined).
    pub ned_paths: Vec<PathBuf>,
    /// Module trees excluded from NED loading (`-x`, ';'-joined).
    pub excluded_modules: Vec<String>,
    /// Image resource path (`--image-path=`).
    pub image_path: PathBuf,
    /// Extension library to load (`-l`).
    pub library: PathBuf,
    /// Configuration document handed to the simulator.
    pub ini_path: PathBuf,
    /// Working directory for the invocation.
    pub work_dir: PathBuf,
}

impl SimCommand {
    /// Build the standard invocation from the sample layout the FRER model
    /// ships with: the binary next to its sources, `omnetpp.ini` under
    /// `sim_dir`, and an INET checkout at `inet_root`.
    pub fn from_layout(binary: impl Into<PathBuf>, inet_root: &Path, sim_dir: &Path) -> Self {
        let binary = binary.into();
        let src_dir = binary
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            ned_paths: vec![
                sim_dir.to_path_buf(),
                src_dir.clone(),
                inet_root.join("examples"),
                inet_root.join("showcases"),
                inet_root.join("src"),
                inet_root.join("tests/validation"),
                inet_root.join("tests/networks"),
                inet_root.join("tutorials"),
            ],
            excluded_modules: EXCLUDED_MODULES.iter().map(|s| s.to_string()).collect(),
            image_path: inet_root.join("images"),
            library: inet_root.join("src/INET"),
            ini_path: sim_dir.join("omnetpp.ini"),
            work_dir: src_dir,
            binary,
        }
    }
}

/// Captured output of a completed simulator run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Captured stdout, forwarded for diagnostics.
    pub stdout: String,
    /// Captured stderr, forwarded for diagnostics.
    pub stderr: String,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl SimCommand {
    /// Run the simulator to completion.
    ///
    /// Blocks until the process exits; there is no timeout and no retry.
    /// A non-zero exit becomes [`SweepError::SimulationFailed`] carrying
    /// the captured output.
    pub async fn run(&self) -> Result<RunOutput> {
        let ned_arg = self
            .ned_paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(":");
        let x_arg = self.excluded_modules.join(";");

        debug!(
            binary = %self.binary.display(),
            ini = %self.ini_path.display(),
            "invoking simulator"
        );

        let start = Instant::now();
        let output = Command::new(&self.binary)
            .arg("-u")
            .arg("Cmdenv")
            .arg("-n")
            .arg(&ned_arg)
            .arg("-x")
            .arg(&x_arg)
            .arg(format!("--image-path={}", self.image_path.display()))
            .arg("-l")
            .arg(&self.library)
            .arg(&self.ini_path)
            .current_dir(&self.work_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?
            .wait_with_output()
            .await?;

        let duration_ms = start.elapsed().as_millis() as u64;
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            return Err(SweepError::SimulationFailed {
                exit_code: output.status.code().unwrap_or(-1),
                stdout,
                stderr,
            });
        }

        Ok(RunOutput {
            stdout,
            stderr,
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stub_command(binary: &str) -> SimCommand {
        SimCommand {
            binary: PathBuf::from(binary),
            ned_paths: vec![PathBuf::from("a"), PathBuf::from("b")],
            excluded_modules: vec!["x.y".to_string(), "x.z".to_string()],
            image_path: PathBuf::from("images"),
            library: PathBuf::from("lib/INET"),
            ini_path: PathBuf::from("omnetpp.ini"),
            work_dir: PathBuf::from("."),
        }
    }

    #[test]
    fn test_from_layout_paths() {
        let cmd = SimCommand::from_layout(
            "/opt/frer/src/FRER",
            Path::new("/opt/inet4.5"),
            Path::new("/opt/frer/simulations"),
        );
        assert_eq!(cmd.work_dir, PathBuf::from("/opt/frer/src"));
        assert_eq!(cmd.ini_path, PathBuf::from("/opt/frer/simulations/omnetpp.ini"));
        assert_eq!(cmd.image_path, PathBuf::from("/opt/inet4.5/images"));
        assert_eq!(cmd.library, PathBuf::from("/opt/inet4.5/src/INET"));
        assert_eq!(cmd.ned_paths[0], PathBuf::from("/opt/frer/simulations"));
        assert!(cmd.ned_paths.contains(&PathBuf::from("/opt/inet4.5/src")));
        assert!(!cmd.excluded_modules.is_empty());
    }

    #[tokio::test]
    async fn test_run_success_captures_output() {
        // echo prints the whole argument vector and exits 0
        let result = stub_command("echo").run().await.expect("run failed");
        assert!(result.stdout.contains("Cmdenv"));
    }

    #[tokio::test]
    async fn test_run_nonzero_exit_surfaced() {
        match stub_command("false").run().await {
            Err(SweepError::SimulationFailed { exit_code, .. }) => assert_ne!(exit_code, 0),
            other => panic!("expected SimulationFailed, got {other:?}"),
        }
    }
}
