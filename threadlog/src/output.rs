//! Report rendering for the threadlog CLI.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use threadlog_core::analytics::ThreadReport;
use threadlog_core::{format_timestamp, IngestResult};

/// Top-level JSON document.
#[derive(Serialize)]
struct JsonOutput<'a> {
    ingest: &'a IngestResult,
    report: &'a ThreadReport,
}

pub fn print_json(ingest: &IngestResult, report: &ThreadReport) -> Result<()> {
    let doc = JsonOutput { ingest, report };
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

pub fn print_text(ingest: &IngestResult, report: &ThreadReport, output_dir: &Path) {
    println!(
        "Ingested {} line(s) from {} file(s) into {}",
        ingest.lines_ingested,
        ingest.files_processed + ingest.files_failed,
        output_dir.display()
    );

    // Query 1
    println!(
        "\nActive threads between {} and {}:",
        format_timestamp(&report.window_start),
        format_timestamp(&report.window_end)
    );
    if report.active.is_empty() {
        println!("  (none)");
    } else {
        println!("{:<16}{:<16}Logs Filepath", "Thread ID", "Process ID");
        for span in &report.active {
            println!(
                "{:<16}{:<16}{}",
                span.thread_id,
                span.process_id,
                span.output_path.display()
            );
        }
    }

    // Query 2
    match &report.peak {
        Some(peak) => println!(
            "\nPeak concurrency: {} thread(s), first reached at {}",
            peak.count,
            format_timestamp(&peak.epoch)
        ),
        None => println!("\nPeak concurrency: no finished threads"),
    }

    // Query 3
    match &report.runtime {
        Some(stats) => println!(
            "Thread runtime: avg={:.3} ms stdev={:.3} ms over {} thread(s)",
            stats.mean_ms, stats.stdev_ms, stats.count
        ),
        None => println!("Thread runtime: no finished threads"),
    }

    if !report.unterminated.is_empty() {
        println!(
            "\nExcluded {} thread(s) without an end marker: {}",
            report.unterminated.len(),
            report.unterminated.join(", ")
        );
    }

    if !ingest.errors.is_empty() {
        eprintln!("\nErrors:");
        for (path, error) in &ingest.errors {
            eprintln!("  {}: {}", path.display(), error);
        }
    }
}
