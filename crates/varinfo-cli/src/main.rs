//! varinfo - feature-importance reporting for vw-style linear models.
//!
//! Scans a namespaced sparse training corpus, trains a model through the
//! external trainer, audits one dense probe example per label, and prints a
//! ranked table of feature ranges, weights, and relative scores.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use varinfo_cli::{app, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::from_default_env()
                .add_directive(format!("varinfo_core={level}").parse()?)
                .add_directive(format!("varinfo_cli={level}").parse()?),
        )
        .init();

    app::run(&cli)
}
