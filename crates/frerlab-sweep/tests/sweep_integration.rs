//! Integration tests for the sweep pipeline with stub external tools.
//!
//! The simulator and the export tool are replaced by shell scripts: the
//! "simulator" records the patched jitter line it was run with and drops a
//! fresh `.vec` artifact, the "scavetool" writes its destination file.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;

use frerlab_sweep::{run_sweep, ScaveTool, SimCommand, SweepError, SweepPlan};

const INI: &str = "[General]\n\
    network = FrerNetwork\n\
    *.s2.bridging.streamRelay.merger.jitter = 0ms\n\
    *.s2.bridging.streamRelay.merger.historyLength = 8\n";

struct Fixture {
    _dir: TempDir,
    root: PathBuf,
    ini_path: PathBuf,
    results_dir: PathBuf,
    calls_log: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = dir.path().to_path_buf();
        let results_dir = root.join("results");
        fs::create_dir(&results_dir).expect("mkdir results");
        let ini_path = root.join("omnetpp.ini");
        fs::write(&ini_path, INI).expect("write ini");
        Self {
            calls_log: root.join("calls.log"),
            _dir: dir,
            root,
            ini_path,
            results_dir,
        }
    }

    fn write_script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.root.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
        let mut perms = fs::metadata(&path).expect("metadata").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("chmod");
        path
    }

    /// Stub simulator: logs the patched jitter line, drops a new artifact.
    /// `pre` runs first and can abort (to model a failing run).
    fn sim_binary(&self, pre: &str) -> PathBuf {
        let body = format!(
            r#"for a in "$@"; do ini="$a"; done
grep jitter "$ini" >> "{log}"
{pre}
n=$(ls "{results}"/*.vec 2>/dev/null | wc -l)
: > "{results}/General-#$n.vec""#,
            log = self.calls_log.display(),
            results = self.results_dir.display(),
        );
        self.write_script("FRER", &body)
    }

    fn scavetool(&self) -> ScaveTool {
        let body = r#"echo "run,type,module,name,vectime,vecvalue" > "$5""#;
        ScaveTool::new(self.write_script("scavetool", body))
    }

    fn sim_command(&self, binary: PathBuf) -> SimCommand {
        SimCommand {
            binary,
            ned_paths: vec![self.root.clone()],
            excluded_modules: vec!["inet.emulation".to_string()],
            image_path: self.root.join("images"),
            library: self.root.join("INET"),
            ini_path: self.ini_path.clone(),
            work_dir: self.root.clone(),
        }
    }

    fn plan(&self, last_jitter: u32) -> SweepPlan {
        SweepPlan {
            jitter_ms: 0..=last_jitter,
            settle: Duration::from_millis(10),
            ..SweepPlan::new(&self.results_dir, "dynamicHL")
        }
    }

    fn ini_bytes(&self) -> String {
        fs::read_to_string(&self.ini_path).expect("read ini")
    }
}

fn assert_restored(fixture: &Fixture) {
    assert_eq!(fixture.ini_bytes(), INI, "config must be byte-identical");
}

#[tokio::test]
async fn test_sweep_completes_and_restores_config() {
    let fixture = Fixture::new();
    let sim = fixture.sim_command(fixture.sim_binary(""));
    let scavetool = fixture.scavetool();

    let points = run_sweep(&sim, &scavetool, &fixture.plan(2))
        .await
        .expect("sweep failed");

    assert_eq!(points.len(), 3);
    for (point, jitter) in points.iter().zip(0u32..) {
        assert_eq!(point.jitter_ms, jitter);
        assert!(point.artifact.exists());
        assert_eq!(
            point.trace,
            fixture.results_dir.join(format!("dynamicHL_J{jitter}_seqNum.csv"))
        );
        assert!(point.trace.exists());
    }

    // each point ran against a freshly patched config
    let calls = fs::read_to_string(&fixture.calls_log).expect("calls log");
    for jitter in 0..=2 {
        assert!(
            calls.contains(&format!("merger.jitter = {jitter}ms")),
            "missing patched value {jitter}ms in:\n{calls}"
        );
    }

    assert_restored(&fixture);
}

#[tokio::test]
async fn test_sweep_restores_config_after_mid_sweep_failure() {
    let fixture = Fixture::new();
    // abort the run once the patched jitter reaches 1ms
    let sim = fixture.sim_command(
        fixture.sim_binary(r#"grep -q "jitter = 1ms" "$ini" && exit 3"#),
    );
    let scavetool = fixture.scavetool();

    match run_sweep(&sim, &scavetool, &fixture.plan(2)).await {
        Err(SweepError::SimulationFailed { exit_code, .. }) => assert_eq!(exit_code, 3),
        other => panic!("expected SimulationFailed, got {other:?}"),
    }

    assert_restored(&fixture);

    // the point completed before the failure keeps its trace
    assert!(fixture.results_dir.join("dynamicHL_J0_seqNum.csv").exists());
    assert!(!fixture.results_dir.join("dynamicHL_J1_seqNum.csv").exists());
}

#[tokio::test]
async fn test_sweep_fails_when_no_artifact_produced() {
    let fixture = Fixture::new();
    // "simulator" that exits cleanly without writing any result
    let body = format!(
        r#"for a in "$@"; do ini="$a"; done
grep jitter "$ini" >> "{log}""#,
        log = fixture.calls_log.display()
    );
    let binary = fixture.write_script("FRER", &body);
    let sim = fixture.sim_command(binary);
    let scavetool = fixture.scavetool();

    match run_sweep(&sim, &scavetool, &fixture.plan(1)).await {
        Err(SweepError::NoResultArtifact { dir }) => assert_eq!(dir, fixture.results_dir),
        other => panic!("expected NoResultArtifact, got {other:?}"),
    }

    assert_restored(&fixture);
}

#[tokio::test]
async fn test_sweep_missing_config_key_fails_before_any_run() {
    let fixture = Fixture::new();
    let sim = fixture.sim_command(fixture.sim_binary(""));
    let scavetool = fixture.scavetool();

    let plan = SweepPlan {
        jitter_key: "*.s9.no.such.key".to_string(),
        ..fixture.plan(1)
    };

    match run_sweep(&sim, &scavetool, &plan).await {
        Err(SweepError::ConfigKeyNotFound { .. }) => {}
        other => panic!("expected ConfigKeyNotFound, got {other:?}"),
    }

    assert_restored(&fixture);
    assert!(!fixture.calls_log.exists(), "simulator must not have run");
}
