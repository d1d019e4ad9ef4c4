//! Run orchestration for the `varinfo` binary.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use varinfo_core::options::{RankOrder, VwOptions};
use varinfo_core::pipeline::{run_analysis, AnalysisConfig};

use crate::corpus::open_corpus;
use crate::scratch::Scratch;
use crate::vw::VwDriver;
use crate::Cli;

/// Executes one full analysis run: corpus scan, probe generation, external
/// train/audit, scoring, and report printing.
pub fn run(cli: &Cli) -> Result<()> {
    let mut forwarded = cli.vw_args.clone();
    let corpus_path = PathBuf::from(
        forwarded
            .pop()
            .context("missing training corpus path (it must be the last argument)")?,
    );

    // Unsupported configurations fail here, before any corpus parsing.
    let options = VwOptions::from_args(&forwarded)?;
    let rank = RankOrder::parse(&cli.order)?;
    info!(
        corpus = %corpus_path.display(),
        multiclass = options.multiclass(),
        pairs = options.pairs.len(),
        "starting analysis"
    );

    let scratch = Scratch::new(cli.keep_temp).context("failed to create scratch directory")?;
    let driver = VwDriver::new(cli.vw_bin.clone(), &scratch);
    let reader = open_corpus(&corpus_path)
        .with_context(|| format!("failed to open training corpus {}", corpus_path.display()))?;

    let config = AnalysisConfig {
        vw_args: forwarded,
        options,
        rank,
    };

    let stdout = io::stdout();
    run_analysis(
        &corpus_path,
        reader,
        &config,
        &scratch.probe_path(),
        &driver,
        &driver,
        &mut stdout.lock(),
    )?;

    if cli.keep_temp {
        for path in scratch.artifact_paths() {
            info!(path = %path.display(), "keeping scratch artifact");
        }
    }
    Ok(())
}
