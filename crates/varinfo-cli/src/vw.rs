//! External vw trainer/auditor driver.
//!
//! Both collaborators run as synchronous child processes, each invoked once
//! and waited to completion. A non-zero exit status is fatal for the whole
//! run; the failing command line is echoed in the error so the operator can
//! re-run it by hand.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};
use varinfo_core::pipeline::{Auditor, PipelineError, Result, Trainer};

use crate::scratch::Scratch;

/// Drives the external `vw` executable for both training and auditing.
#[derive(Debug, Clone)]
pub struct VwDriver {
    bin: PathBuf,
    model: PathBuf,
    readable_model: PathBuf,
    predictions: PathBuf,
    audit_capture: PathBuf,
}

impl VwDriver {
    /// Creates a driver writing its artifacts into `scratch`.
    pub fn new(bin: PathBuf, scratch: &Scratch) -> Self {
        Self {
            bin,
            model: scratch.model_path(),
            readable_model: scratch.readable_model_path(),
            predictions: scratch.predictions_path(),
            audit_capture: scratch.audit_capture_path(),
        }
    }

    fn run(&self, command: &mut Command) -> Result<std::process::Output> {
        let rendered = render_command(command);
        debug!(command = %rendered, "running external command");
        let output = command.output().map_err(|source| PipelineError::Spawn {
            command: rendered.clone(),
            source,
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PipelineError::ExternalCommand {
                command: rendered,
                detail: format!("{}; stderr: {}", output.status, stderr.trim()),
            });
        }
        Ok(output)
    }
}

impl Trainer for VwDriver {
    fn train(&self, corpus: &Path, vw_args: &[String]) -> Result<PathBuf> {
        let mut command = Command::new(&self.bin);
        command
            .arg("-d")
            .arg(corpus)
            .args(vw_args)
            .arg("-f")
            .arg(&self.model)
            .arg("--readable_model")
            .arg(&self.readable_model)
            .arg("--quiet");
        self.run(&mut command)?;
        Ok(self.model.clone())
    }
}

impl Auditor for VwDriver {
    fn audit(&self, model: &Path, probe: &Path) -> Result<String> {
        let mut command = Command::new(&self.bin);
        command
            .arg("-t")
            .arg("-i")
            .arg(model)
            .arg("-d")
            .arg(probe)
            .arg("--audit")
            .arg("-p")
            .arg(&self.predictions)
            .arg("--quiet");
        let output = self.run(&mut command)?;
        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        // Mirror the audit text for post-mortem inspection; failing to do so
        // must not fail the run.
        if let Err(error) = std::fs::write(&self.audit_capture, &text) {
            warn!(path = %self.audit_capture.display(), %error, "could not mirror audit capture");
        }
        Ok(text)
    }
}

fn render_command(command: &Command) -> String {
    let mut rendered = command.get_program().to_string_lossy().into_owned();
    for arg in command.get_args() {
        rendered.push(' ');
        rendered.push_str(&arg.to_string_lossy());
    }
    rendered
}

// =============================================================================
// Tests
// =============================================================================
