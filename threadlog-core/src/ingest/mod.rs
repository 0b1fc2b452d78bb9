//! Ingestion layer for raw process logs
//!
//! This module turns a directory of interleaved process logs into one output
//! file per thread.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐     ┌──────────────────────┐
//! │  Process logs   │ ──► │ IngestCoordinator│ ──► │   SegmentTracker     │
//! │ (input_dir/*)   │     │  line by line    │     │ output_dir/pid-tid.log│
//! └─────────────────┘     └──────────────────┘     └──────────────────────┘
//!                               │
//!                               ▼
//!                         parse_line()
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use threadlog_core::ingest::{IngestCoordinator, SegmentTracker};
//!
//! let coordinator = IngestCoordinator::new("./rawlogs", "*");
//! let mut tracker = SegmentTracker::new("./mergedlogs")?;
//!
//! let result = coordinator.ingest_all(&mut tracker)?;
//! tracker.close_all()?;
//! println!("Ingested {} lines from {} files", result.lines_ingested, result.files_processed);
//! ```

mod parser;
mod tracker;

pub use parser::parse_line;
pub use tracker::SegmentTracker;

use crate::error::{Error, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Result of ingesting every discovered file.
#[derive(Debug, Default, Serialize)]
pub struct IngestResult {
    /// Number of files ingested to the end
    pub files_processed: usize,
    /// Number of files abandoned at a failing line
    pub files_failed: usize,
    /// Number of records written, including those from failed files
    pub lines_ingested: usize,
    /// Errors encountered (file path → error message)
    pub errors: Vec<(PathBuf, String)>,
}

impl IngestResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Result of ingesting a single file.
#[derive(Debug)]
pub struct FileIngestResult {
    /// Path to the ingested file
    pub path: PathBuf,
    /// Number of records written to thread segments
    pub lines_ingested: usize,
}

/// Drives the parser and tracker over a directory of process logs.
///
/// Files are ingested one at a time, lines strictly in file order. A failing
/// line aborts its file only; lines already written stay written.
pub struct IngestCoordinator {
    input_dir: PathBuf,
    pattern: String,
}

impl IngestCoordinator {
    /// Create a coordinator over `input_dir`, selecting files by glob `pattern`.
    pub fn new(input_dir: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            input_dir: input_dir.into(),
            pattern: pattern.into(),
        }
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    /// Discover raw log files, sorted by path.
    ///
    /// Only regular files directly matching the pattern are returned.
    pub fn discover_files(&self) -> Result<Vec<PathBuf>> {
        if !self.input_dir.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("input directory not found: {}", self.input_dir.display()),
            )));
        }

        // The directory is matched literally; only the pattern is a glob.
        let escaped_dir = glob::Pattern::escape(&self.input_dir.to_string_lossy());
        let full_pattern = PathBuf::from(escaped_dir).join(&self.pattern);
        let pattern_str = full_pattern.to_string_lossy();

        let entries =
            glob::glob(&pattern_str).map_err(|e| Error::Pattern(format!("{}: {}", self.pattern, e)))?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!(error = %e, "Unreadable path during discovery");
                    None
                }
            })
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        tracing::info!(
            input_dir = %self.input_dir.display(),
            count = files.len(),
            "Discovered raw log files"
        );

        Ok(files)
    }

    /// Ingest all discovered files.
    pub fn ingest_all(&self, tracker: &mut SegmentTracker) -> Result<IngestResult> {
        self.ingest_all_with_progress(tracker, |_, _, _| {})
    }

    /// Ingest all discovered files with progress callback.
    ///
    /// The callback receives `(current_file_index, total_files, file_path)` before
    /// each file is processed. Only discovery failures are returned as `Err`;
    /// per-file failures land in [`IngestResult::errors`].
    pub fn ingest_all_with_progress<F>(
        &self,
        tracker: &mut SegmentTracker,
        mut on_progress: F,
    ) -> Result<IngestResult>
    where
        F: FnMut(usize, usize, &Path),
    {
        let files = self.discover_files()?;
        let total = files.len();
        let mut result = IngestResult::default();

        for (i, path) in files.iter().enumerate() {
            on_progress(i, total, path);

            let mut written = 0;
            match ingest_lines(path, tracker, &mut written) {
                Ok(file_result) => {
                    result.files_processed += 1;
                    tracing::debug!(
                        path = %file_result.path.display(),
                        lines = file_result.lines_ingested,
                        "File ingested"
                    );
                }
                Err(e) => {
                    result.files_failed += 1;
                    tracing::error!(path = %path.display(), error = %e, "File ingestion aborted");
                    result.errors.push((path.clone(), e.to_string()));
                }
            }
            result.lines_ingested += written;
        }

        Ok(result)
    }

    /// Ingest a single file.
    ///
    /// Returns the first failing line as [`Error::Line`]; lines before it have
    /// already been written to their thread segments.
    pub fn ingest_file(&self, path: &Path, tracker: &mut SegmentTracker) -> Result<FileIngestResult> {
        let mut written = 0;
        ingest_lines(path, tracker, &mut written)
    }
}

/// Read `path` line by line, parse each line and hand it to `tracker`.
///
/// Every line must match the grammar; a blank line is a parse error like any
/// other malformed line.
///
/// `written` counts records accepted by the tracker, so callers can still
/// account for partial progress when an error is returned.
fn ingest_lines(
    path: &Path,
    tracker: &mut SegmentTracker,
    written: &mut usize,
) -> Result<FileIngestResult> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    for (idx, line) in reader.lines().enumerate() {
        let at_line = |source: Error| Error::Line {
            path: path.to_path_buf(),
            line_no: idx + 1,
            source: Box::new(source),
        };

        let line = line.map_err(|e| at_line(Error::Io(e)))?;
        let record = parse_line(&line).map_err(at_line)?;
        tracker.write(&record).map_err(at_line)?;
        *written += 1;
    }

    Ok(FileIngestResult {
        path: path.to_path_buf(),
        lines_ingested: *written,
    })
}
