//! pfind - find-style directory search
//!
//! Entry point for the CLI application.

use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use pfind::{CliArgs, Invocation};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    setup_logging();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse();
    let invocation = Invocation::try_from(args).context("invalid expression")?;

    // Flushed per line so a failed write is charged to its own entry.
    let stdout = std::io::stdout();
    let mut out = std::io::LineWriter::new(stdout.lock());

    let results = pfind::search()
        .invocation(invocation)
        .run(&mut out)
        .context("walk failed")?;

    if let Err(e) = out.flush() {
        tracing::warn!("flushing output failed: {e}");
    }

    debug!(
        matches = results.matches,
        entries = results.stats.total(),
        per_sec = results.stats.entries_per_sec,
        elapsed_ms = results.stats.duration.as_millis() as u64,
        "done"
    );

    Ok(())
}

/// Diagnostics go to stderr; stdout carries only matched entries.
fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .without_time()
        .init();
}
