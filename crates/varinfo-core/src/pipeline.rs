//! Pipeline orchestration over injected trainer/auditor capabilities.
//!
//! The whole run is a strict linear sequence: scan the corpus into the
//! catalog, expand pairs, finalize, resolve the ordered label list, write the
//! probe file, train, audit, parse the audit, score, render. No step runs out
//! of order and any failure aborts the run; there is no retry or partial
//! re-entry, and no partial report is emitted on failure.
//!
//! The external trainer and auditor are modeled as capability traits so tests
//! can substitute an in-process model for the real executable.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::audit::{parse_audit_stream, AuditError};
use crate::catalog::{FeatureCatalog, NamespaceFilter};
use crate::options::{RankOrder, VwOptions};
use crate::probe::render_probe_lines;
use crate::record::{parse_record, LabelSet, RecordError};
use crate::report::render_report;
use crate::score::score_features;

/// Label list used when no multi-class labels are in play.
const SINGLE_LABEL: &str = "1";

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Reading the training corpus failed.
    #[error("failed to read training corpus: {0}")]
    CorpusIo(#[source] io::Error),

    /// A corpus line failed to parse.
    #[error("corpus line {line}: {source}")]
    Record {
        /// 1-based line number of the offending record.
        line: usize,
        /// The underlying parse error.
        source: RecordError,
    },

    /// The audit stream violated its protocol.
    #[error(transparent)]
    Audit(#[from] AuditError),

    /// Writing the probe example file failed.
    #[error("failed to write probe example file {path:?}: {source}")]
    ProbeIo {
        /// Probe file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// An external command could not be spawned.
    #[error("failed to run external command ({command}): {source}")]
    Spawn {
        /// The rendered command line.
        command: String,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// An external command exited with a non-zero status.
    #[error("external command failed ({command}): {detail}")]
    ExternalCommand {
        /// The rendered command line, echoed for diagnosis.
        command: String,
        /// Exit status and captured stderr.
        detail: String,
    },

    /// Writing the final report failed.
    #[error("failed to write report: {0}")]
    ReportIo(#[source] io::Error),
}

/// Result type for pipeline runs.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Trains a model from a corpus file with forwarded trainer arguments,
/// returning the model path.
pub trait Trainer {
    /// Runs the training collaborator to completion.
    fn train(&self, corpus: &Path, vw_args: &[String]) -> Result<PathBuf>;
}

/// Audits a model against a probe example file, returning the two-line-per-
/// example audit text.
pub trait Auditor {
    /// Runs the auditing collaborator to completion.
    fn audit(&self, model: &Path, probe: &Path) -> Result<String>;
}

/// Everything a run needs beyond the corpus itself.
#[derive(Debug, Clone, Default)]
pub struct AnalysisConfig {
    /// Arguments forwarded verbatim to the trainer.
    pub vw_args: Vec<String>,
    /// Settings extracted from the forwarded arguments.
    pub options: VwOptions,
    /// Ranking configuration.
    pub rank: RankOrder,
}

/// Runs the full analysis pipeline, writing the report to `out`.
///
/// `corpus` must be the decoded line stream of the file at `corpus_path`; the
/// caller owns decompression and the lifetime of `probe_path`.
pub fn run_analysis(
    corpus_path: &Path,
    corpus: impl BufRead,
    config: &AnalysisConfig,
    probe_path: &Path,
    trainer: &dyn Trainer,
    auditor: &dyn Auditor,
    out: &mut dyn Write,
) -> Result<()> {
    let filter = NamespaceFilter::new(config.options.ignore.clone(), config.options.keep.clone());
    let mut catalog = FeatureCatalog::new(filter);
    let mut labels = LabelSet::new();

    let mut records = 0usize;
    for (index, line) in corpus.lines().enumerate() {
        let line = line.map_err(PipelineError::CorpusIo)?;
        if line.trim().is_empty() {
            continue;
        }
        let record = parse_record(&line).map_err(|source| PipelineError::Record {
            line: index + 1,
            source,
        })?;
        if config.options.multiclass() {
            labels.observe(&record.label_field);
        }
        catalog.ingest(&record);
        records += 1;
    }
    catalog.expand_pairs(&config.options.pairs);
    catalog.finalize();
    info!(
        records,
        namespaces = catalog.namespace_count(),
        features = catalog.feature_count(),
        "corpus scan complete"
    );

    let label_list: Vec<String> = if config.options.multiclass() && !labels.is_empty() {
        labels.ordered_labels()
    } else {
        vec![SINGLE_LABEL.to_string()]
    };
    debug!(labels = label_list.len(), "label order resolved");

    let probe_lines = render_probe_lines(&catalog, &label_list, config.options.multiclass());
    let mut probe_text = probe_lines.join("\n");
    probe_text.push('\n');
    fs::write(probe_path, probe_text).map_err(|source| PipelineError::ProbeIo {
        path: probe_path.to_path_buf(),
        source,
    })?;

    let model = trainer.train(corpus_path, &config.vw_args)?;
    info!(model = %model.display(), "training complete");
    let audit_text = auditor.audit(&model, probe_path)?;

    let outcome = parse_audit_stream(&audit_text, &label_list, config.options.multiclass())?;
    info!(features = outcome.observed.len(), "audit parsed");

    let reports = score_features(&catalog, &outcome, &config.rank);
    render_report(&reports, config.options.multiclass(), out).map_err(PipelineError::ReportIo)
}

// =============================================================================
// Tests
// =============================================================================
