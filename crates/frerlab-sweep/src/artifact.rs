//! Result artifact discovery.
//!
//! The simulator drops result files into a shared directory and names them
//! with an incrementing run index; correlating a run to its artifact means
//! picking the newest file after the run completes. This is a plain
//! directory query each time; nothing is cached, the whole point is to
//! observe what the run just wrote.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{Result, SweepError};

/// Extension the simulator gives vector result files.
const RESULT_EXTENSION: &str = "vec";

/// Locate the result artifact for the run that just completed.
///
/// With `explicit`, the name is accepted if it resolves as given or by file
/// name relative to `results_dir`; anything else is
/// [`SweepError::ResultNotFound`]. Without it, the newest `.vec` file by
/// modification time wins, with lexicographic filename order breaking ties
/// (the simulator's naming embeds an incrementing run index, so later runs
/// sort later). An empty directory is [`SweepError::NoResultArtifact`].
pub fn locate_result(results_dir: &Path, explicit: Option<&str>) -> Result<PathBuf> {
    if let Some(name) = explicit {
        let candidate = PathBuf::from(name);
        if candidate.exists() {
            return Ok(candidate);
        }
        if let Some(file_name) = candidate.file_name() {
            let in_results = results_dir.join(file_name);
            if in_results.exists() {
                return Ok(in_results);
            }
        }
        return Err(SweepError::ResultNotFound {
            name: name.to_string(),
        });
    }

    let mut candidates: Vec<(SystemTime, String, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(results_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(RESULT_EXTENSION) {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        let name = entry.file_name().to_string_lossy().into_owned();
        candidates.push((modified, name, path));
    }

    candidates.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    candidates
        .pop()
        .map(|(_, _, path)| path)
        .ok_or_else(|| SweepError::NoResultArtifact {
            dir: results_dir.to_path_buf(),
        })
}
