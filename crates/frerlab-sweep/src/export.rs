//! Vector export via the external scavetool.
//!
//! The export tool turns a binary `.vec` result artifact into the CSV
//! trace format `frerlab-core` reads. It is invoked once per exported
//! vector with a named-field filter expression; the destination always
//! sits next to the source artifact.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::info;

use crate::error::{Result, SweepError};

/// The standard vector set exported for every scenario run.
const SCENARIO_VECTORS: &[(&str, &str)] = &[
    ("historyLength:vector", "historyLength"),
    ("seqNum:vector", "seqNum"),
];

/// Handle to the external export tool.
#[derive(Debug, Clone)]
pub struct ScaveTool {
    /// Path to the scavetool binary.
    pub binary: PathBuf,
}

impl Default for ScaveTool {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("opp_scavetool"),
        }
    }
}

impl ScaveTool {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Export the vectors matching `filter` from `vec_path` into a CSV
    /// named `output_name` in the artifact's directory.
    ///
    /// Returns the destination path on success. A non-zero exit becomes
    /// [`SweepError::ExtractionFailed`] with the tool's captured stderr;
    /// the caller decides whether that aborts the sweep; it is never
    /// retried here.
    pub async fn export(&self, filter: &str, output_name: &str, vec_path: &Path) -> Result<PathBuf> {
        let output_path = vec_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(output_name);

        let output = Command::new(&self.binary)
            .arg("export")
            .arg("--filter")
            .arg(filter)
            .arg("-o")
            .arg(&output_path)
            .arg(vec_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?
            .wait_with_output()
            .await?;

        if !output.status.success() {
            return Err(SweepError::ExtractionFailed {
                exit_code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        info!(
            source = %vec_path.display(),
            dest = %output_path.display(),
            "exported vector CSV"
        );
        Ok(output_path)
    }

    /// Export the standard scenario vector set under `prefix`
    /// (`<prefix>_historyLength.csv`, `<prefix>_seqNum.csv`).
    pub async fn export_scenario(&self, prefix: &str, vec_path: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(SCENARIO_VECTORS.len());
        for (vector, stem) in SCENARIO_VECTORS {
            let filter = format!("name =~ \"{vector}\"");
            let output_name = format!("{prefix}_{stem}.csv");
            written.push(self.export(&filter, &output_name, vec_path).await?);
        }
        Ok(written)
    }
}
