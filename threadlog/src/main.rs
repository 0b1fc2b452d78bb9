//! threadlog - split interleaved process logs into per-thread logs
//!
//! Reads every raw process log in the input directory, writes one log file
//! per thread to the output directory, then reports:
//! - which threads were active between `--t1` and `--t2`
//! - the peak number of concurrent threads and when it occurred
//! - the mean and standard deviation of thread runtimes
//!
//! Uses XDG Base Directory specification for file locations:
//! - Logs: $XDG_STATE_HOME/threadlog/threadlog.log (~/.local/state/threadlog/threadlog.log)
//! - Config: $XDG_CONFIG_HOME/threadlog/config.toml (~/.config/threadlog/config.toml)

mod output;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::{ArgAction, Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use threadlog_core::analytics::ThreadReport;
use threadlog_core::ingest::{IngestCoordinator, SegmentTracker};
use threadlog_core::{parse_timestamp, Config};

use crate::output::{print_json, print_text};

#[derive(Parser)]
#[command(name = "threadlog")]
#[command(about = "Re-cluster interleaved process logs into per-thread logs and query thread lifetimes")]
#[command(version)]
struct Args {
    /// Directory of raw process logs (overrides config)
    #[arg(short, long, value_name = "DIR")]
    input: Option<PathBuf>,

    /// Directory for per-thread logs (overrides config)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Glob pattern selecting raw files in the input directory (overrides config)
    #[arg(long, value_name = "GLOB")]
    pattern: Option<String>,

    /// Start of the active-thread window, e.g. "2020-08-09 18:59:25,200"
    #[arg(long, value_parser = parse_cli_timestamp, default_value = "2020-08-09 18:59:25,200")]
    t1: NaiveDateTime,

    /// End of the active-thread window, e.g. "2020-08-09 18:59:25,300"
    #[arg(long, value_parser = parse_cli_timestamp, default_value = "2020-08-09 18:59:25,300")]
    t2: NaiveDateTime,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Config file (defaults to the XDG config path)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output (print each file as it is ingested)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn parse_cli_timestamp(text: &str) -> std::result::Result<NaiveDateTime, String> {
    parse_timestamp(text)
        .map_err(|e| format!("{e}; expected format YYYY-MM-DD HH:MM:SS,mmm"))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("failed to load configuration")?;

    // Initialize logging
    let _log_guard =
        threadlog_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!("threadlog starting");

    let mut ingest = config.ingest.clone();
    if let Some(input) = args.input.clone() {
        ingest.input_dir = input;
    }
    if let Some(output) = args.output.clone() {
        ingest.output_dir = output;
    }
    if let Some(pattern) = args.pattern.clone() {
        ingest.pattern = pattern;
    }
    ingest.validate().context("invalid ingest settings")?;

    let mut tracker = SegmentTracker::new(&ingest.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            ingest.output_dir.display()
        )
    })?;
    let coordinator = IngestCoordinator::new(&ingest.input_dir, ingest.pattern.as_str());

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("invalid progress bar template")?
            .progress_chars("#>-"),
    );

    let ingest_result = coordinator.ingest_all_with_progress(&mut tracker, |current, total, path| {
        if current == 0 {
            pb.set_length(total as u64);
        }
        pb.set_position(current as u64);
        pb.set_message(
            path.file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("...")
                .to_string(),
        );
        if args.verbose > 0 {
            pb.println(format!("Ingesting {}", path.display()));
        }
    });
    pb.finish_and_clear();

    // Release every output file before reporting, even if discovery failed.
    let close_result = tracker.close_all();
    let ingest_result = ingest_result.with_context(|| {
        format!(
            "failed to read input directory {}",
            coordinator.input_dir().display()
        )
    })?;
    close_result.context("failed to flush thread logs")?;

    let unterminated = tracker.unterminated_threads();
    if !unterminated.is_empty() {
        tracing::warn!(
            count = unterminated.len(),
            threads = ?unterminated,
            "Threads without an end marker are excluded from queries"
        );
    }

    let threads = tracker.finished_threads();
    let report = ThreadReport::build(&threads, args.t1, args.t2).with_unterminated(unterminated);

    tracing::info!(
        files_processed = ingest_result.files_processed,
        files_failed = ingest_result.files_failed,
        lines_ingested = ingest_result.lines_ingested,
        threads = threads.len(),
        "Ingestion complete"
    );

    match args.format {
        Format::Text => print_text(&ingest_result, &report, tracker.output_dir()),
        Format::Json => print_json(&ingest_result, &report)?,
    }

    if ingest_result.has_errors() {
        anyhow::bail!(
            "{} of {} file(s) failed to ingest",
            ingest_result.files_failed,
            ingest_result.files_failed + ingest_result.files_processed
        );
    }

    Ok(())
}
