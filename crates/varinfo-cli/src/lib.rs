//! varinfo CLI library.
//!
//! The `varinfo` binary wires the varinfo-core engine to the external `vw`
//! trainer/auditor: it parses its own flags, forwards everything else to vw,
//! owns the scratch artifacts of a run, and prints the ranked feature table.
//!
//! # Example
//!
//! ```bash
//! # Report feature ranges, weights, and relative scores for a corpus
//! varinfo train.vw
//!
//! # Forward vw options after `--`; the corpus path comes last
//! varinfo -- -q ab --oaa 3 train.vw.gz
//!
//! # Keep the probe/model/audit artifacts for inspection
//! varinfo -K -- --loss_function logistic train.vw
//! ```

pub mod app;
pub mod corpus;
pub mod scratch;
pub mod vw;

use std::path::PathBuf;

use clap::Parser;

/// varinfo - feature-importance reporting for vw-style linear models
///
/// Trains a model on the given corpus via the external trainer, audits a
/// synthetic probe example per label, and reports per-feature value range,
/// learned weight, and normalized relative score.
#[derive(Parser, Debug, Clone)]
#[command(name = "varinfo")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Keep the scratch artifacts (probe, model, audit capture) and log
    /// their paths instead of removing them
    #[arg(short = 'K', long = "keep-temp")]
    pub keep_temp: bool,

    /// Rank order selector; leading 'a' reports absolute percentages
    #[arg(short = 'O', long = "order", default_value = "")]
    pub order: String,

    /// Trainer/auditor executable
    #[arg(long = "vw-bin", env = "VARINFO_VW_BIN", default_value = "vw")]
    pub vw_bin: PathBuf,

    /// Arguments forwarded verbatim to the trainer, followed by the training
    /// corpus path (use `--` before any forwarded flags)
    #[arg(
        trailing_var_arg = true,
        allow_hyphen_values = true,
        required = true,
        value_name = "VW-ARGS/CORPUS"
    )]
    pub vw_args: Vec<String>,
}

/// Result type alias for CLI operations.
pub type CliResult<T> = anyhow::Result<T>;
