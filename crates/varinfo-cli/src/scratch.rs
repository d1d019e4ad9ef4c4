//! Scratch artifacts owned by one run.
//!
//! The probe example file, model file, readable model dump, prediction sink,
//! and audit capture are all transient: they live in one temporary directory
//! that is removed on every exit path (success, parse error, external-process
//! failure). Keep mode persists the directory instead and logs its location.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::info;

/// A run's scratch directory and the well-known artifact paths inside it.
#[derive(Debug)]
pub struct Scratch {
    dir: Option<TempDir>,
    root: PathBuf,
    keep: bool,
}

impl Scratch {
    /// Creates a fresh scratch directory. With `keep` set, the directory
    /// survives the run and its path is logged on drop.
    pub fn new(keep: bool) -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("varinfo-").tempdir()?;
        let root = dir.path().to_path_buf();
        Ok(Self {
            dir: Some(dir),
            root,
            keep,
        })
    }

    /// Root of the scratch directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The dense probe example file handed to the auditor.
    pub fn probe_path(&self) -> PathBuf {
        self.root.join("probe.ex")
    }

    /// The trained model file.
    pub fn model_path(&self) -> PathBuf {
        self.root.join("model.vw")
    }

    /// The trainer's human-readable weight dump.
    pub fn readable_model_path(&self) -> PathBuf {
        self.root.join("model.readable.txt")
    }

    /// Prediction sink for the audit pass.
    pub fn predictions_path(&self) -> PathBuf {
        self.root.join("predictions.txt")
    }

    /// Captured audit text, mirrored to disk for diagnosis.
    pub fn audit_capture_path(&self) -> PathBuf {
        self.root.join("audit.txt")
    }

    /// All artifact paths, for reporting in keep mode.
    pub fn artifact_paths(&self) -> Vec<PathBuf> {
        vec![
            self.probe_path(),
            self.model_path(),
            self.readable_model_path(),
            self.predictions_path(),
            self.audit_capture_path(),
        ]
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        if self.keep {
            if let Some(dir) = self.dir.take() {
                let root = dir.keep();
                info!(path = %root.display(), "scratch artifacts kept");
            }
        }
        // Otherwise TempDir removes the directory when it drops.
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scratch_removed_on_drop() {
        let root;
        {
            let scratch = Scratch::new(false).unwrap();
            root = scratch.root().to_path_buf();
            std::fs::write(scratch.probe_path(), "1 |a x:1\n").unwrap();
            assert!(root.exists());
        }
        assert!(!root.exists());
    }

    #[test]
    fn test_scratch_kept_in_keep_mode() {
        let root;
        {
            let scratch = Scratch::new(true).unwrap();
            root = scratch.root().to_path_buf();
            std::fs::write(scratch.probe_path(), "1 |a x:1\n").unwrap();
        }
        assert!(root.exists());
        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_artifacts_live_under_root() {
        let scratch = Scratch::new(false).unwrap();
        for path in scratch.artifact_paths() {
            assert!(path.starts_with(scratch.root()));
        }
    }
}
