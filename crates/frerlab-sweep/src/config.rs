//! Configuration document patching and guaranteed restoration.
//!
//! The sweep owns the on-disk configuration for its whole duration. All
//! patches are derived from the baseline text captured at load time, so
//! each sweep point rewrites exactly one field and leaves every other byte
//! of the document intact. [`RestoreGuard`] writes the baseline back
//! exactly once, on every exit path.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::warn;

use crate::error::{Result, SweepError};

/// In-memory copy of the simulation configuration text.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    path: PathBuf,
    text: String,
}

impl ConfigDocument {
    /// Load the document from disk.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let text = fs::read_to_string(&path)?;
        Ok(Self { path, text })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Return the document text with the value of `key` replaced.
    ///
    /// `key` is the qualified parameter name left of `=` (glob characters
    /// and all); the replacement covers the whole value token including its
    /// unit suffix. Matches the first occurrence only; the document
    /// contract is that the key appears on exactly one line.
    pub fn patched(&self, key: &str, value: &str) -> Result<String> {
        let pattern = format!(r"({}\s*=\s*)\S+", regex::escape(key));
        let re = Regex::new(&pattern).expect("escaped key forms a valid pattern");

        if !re.is_match(&self.text) {
            return Err(SweepError::ConfigKeyNotFound {
                key: key.to_string(),
                path: self.path.clone(),
            });
        }

        let patched = re.replace(&self.text, |caps: &regex::Captures| {
            format!("{}{}", &caps[1], value)
        });
        Ok(patched.into_owned())
    }

    /// Write `text` to the document's path.
    pub fn persist(&self, text: &str) -> Result<()> {
        fs::write(&self.path, text)?;
        Ok(())
    }
}

/// Scoped restore of a configuration document.
///
/// Holds the pre-sweep text and writes it back exactly once: explicitly
/// via [`RestoreGuard::restore`] (the normal path, where a write failure
/// is reported), or best-effort on drop if the sweep unwinds first.
#[derive(Debug)]
pub struct RestoreGuard {
    path: PathBuf,
    baseline: String,
    restored: bool,
}

impl RestoreGuard {
    /// Capture the restoration baseline from a loaded document.
    pub fn new(doc: &ConfigDocument) -> Self {
        Self {
            path: doc.path().to_path_buf(),
            baseline: doc.text().to_string(),
            restored: false,
        }
    }

    /// Write the baseline bytes back and disarm the drop restore.
    pub fn restore(mut self) -> Result<()> {
        self.restored = true;
        fs::write(&self.path, &self.baseline)?;
        Ok(())
    }
}

impl Drop for RestoreGuard {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(e) = fs::write(&self.path, &self.baseline) {
            warn!(
                path = %self.path.display(),
                error = %e,
                "failed to restore configuration document"
            );
        }
    }
}
