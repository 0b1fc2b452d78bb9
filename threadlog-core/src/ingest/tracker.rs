//! Per-thread segment tracking
//!
//! [`SegmentTracker`] demultiplexes a stream of [`LogRecord`]s into one output
//! file per thread id while the records are still arriving.
//!
//! ## Segment lifecycle
//!
//! ```text
//!            **START**              any record            **END**
//!   Absent ────────────► Open ───────────────────► Open ──────────► Closed
//!      │                                                               │
//!      └── other message: InvalidThreadStart          any record: ThreadClosed
//! ```
//!
//! A segment's output file is opened when its start marker arrives and is
//! flushed, synced and released when its end marker arrives or when
//! [`SegmentTracker::close_all`] is called.

use crate::error::{Error, Result};
use crate::types::{LogRecord, ThreadSpan, OUTPUT_EXTENSION};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// State for one thread id.
#[derive(Debug)]
struct ThreadSegment {
    process_id: String,
    started_at: NaiveDateTime,
    /// Set exactly when the end marker has been written
    ended_at: Option<NaiveDateTime>,
    output_path: PathBuf,
    line_count: usize,
    /// Present while the segment is open and its file not yet released
    writer: Option<BufWriter<File>>,
}

impl ThreadSegment {
    fn append(&mut self, record: &LogRecord) -> Result<()> {
        let writer = match self.writer.take() {
            Some(writer) => writer,
            None => {
                // Released by close_all() before the end marker arrived.
                let file = File::options()
                    .append(true)
                    .open(&self.output_path)
                    .map_err(|source| self.write_error(source))?;
                BufWriter::new(file)
            }
        };
        let writer = self.writer.insert(writer);

        writeln!(writer, "{}", record).map_err(|source| Error::Write {
            path: self.output_path.clone(),
            source,
        })?;
        self.line_count += 1;
        Ok(())
    }

    /// Flush buffered lines, sync the file to disk and drop the handle.
    fn release(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|source| self.write_error(source))?;
            writer
                .get_ref()
                .sync_all()
                .map_err(|source| self.write_error(source))?;
        }
        Ok(())
    }

    fn write_error(&self, source: std::io::Error) -> Error {
        Error::Write {
            path: self.output_path.clone(),
            source,
        }
    }

    fn is_closed(&self) -> bool {
        self.ended_at.is_some()
    }
}

/// Splits interleaved records into per-thread output files.
///
/// The tracker is an owned value: construct one per run and pass it to the
/// ingestor by `&mut`. Records for one thread id must be written in the order
/// they appear in the input.
///
/// ## Example
///
/// ```rust,no_run
/// use threadlog_core::ingest::{parse_line, SegmentTracker};
///
/// let mut tracker = SegmentTracker::new("./mergedlogs")?;
/// tracker.write(&parse_line("7:42::main 2020-08-09 18:59:25,200 - **START**")?)?;
/// tracker.write(&parse_line("7:42::main 2020-08-09 18:59:25,450 - **END**")?)?;
/// tracker.close_all()?;
///
/// assert_eq!(tracker.finished_threads().len(), 1);
/// # Ok::<(), threadlog_core::Error>(())
/// ```
#[derive(Debug)]
pub struct SegmentTracker {
    output_dir: PathBuf,
    segments: HashMap<String, ThreadSegment>,
    /// Output file → thread id that owns it
    claimed_paths: HashMap<PathBuf, String>,
}

impl SegmentTracker {
    /// Create a tracker writing into `output_dir`, creating the directory if needed.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir)?;

        tracing::debug!(output_dir = %output_dir.display(), "Segment tracker ready");

        Ok(Self {
            output_dir,
            segments: HashMap::new(),
            claimed_paths: HashMap::new(),
        })
    }

    /// Directory the per-thread files are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Output file for a `(process, thread)` pair: `<output_dir>/<pid>-<tid>.log`.
    pub fn output_path_for(&self, process_id: &str, thread_id: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}-{}.{}", process_id, thread_id, OUTPUT_EXTENSION))
    }

    /// Route one record to its thread's segment.
    ///
    /// Fails without touching any segment when:
    /// - the thread is new and the record is not a start marker,
    /// - the thread has already seen its end marker,
    /// - the thread id is already owned by a different process,
    /// - the thread's output file is already owned by another thread id
    ///   (`a-b:c` and `a:b-c` both name `a-b-c.log`).
    pub fn write(&mut self, record: &LogRecord) -> Result<()> {
        let segment = match self.segments.get_mut(&record.thread_id) {
            Some(segment) => segment,
            None => return self.open_segment(record),
        };

        if segment.process_id != record.process_id {
            return Err(Error::ThreadIdCollision {
                thread_id: record.thread_id.clone(),
                existing: segment.process_id.clone(),
                incoming: record.process_id.clone(),
            });
        }
        if segment.is_closed() {
            return Err(Error::ThreadClosed {
                thread_id: record.thread_id.clone(),
            });
        }

        segment.append(record)?;

        if record.is_end() {
            segment.ended_at = Some(record.timestamp);
            segment.release()?;
            tracing::trace!(
                thread_id = %record.thread_id,
                lines = segment.line_count,
                "Thread segment closed"
            );
        }

        Ok(())
    }

    fn open_segment(&mut self, record: &LogRecord) -> Result<()> {
        if !record.is_start() {
            return Err(Error::InvalidThreadStart {
                thread_id: record.thread_id.clone(),
                message: record.message.clone(),
            });
        }

        let output_path = self.output_path_for(&record.process_id, &record.thread_id);
        if let Some(owner) = self.claimed_paths.get(&output_path) {
            return Err(Error::OutputPathCollision {
                path: output_path,
                thread_id: record.thread_id.clone(),
                owner: owner.clone(),
            });
        }

        let file = File::create(&output_path).map_err(|source| Error::Write {
            path: output_path.clone(),
            source,
        })?;

        let mut segment = ThreadSegment {
            process_id: record.process_id.clone(),
            started_at: record.timestamp,
            ended_at: None,
            output_path,
            line_count: 0,
            writer: Some(BufWriter::new(file)),
        };
        segment.append(record)?;

        tracing::trace!(
            thread_id = %record.thread_id,
            path = %segment.output_path.display(),
            "Thread segment opened"
        );

        self.claimed_paths
            .insert(segment.output_path.clone(), record.thread_id.clone());
        self.segments.insert(record.thread_id.clone(), segment);
        Ok(())
    }

    /// Flush, sync and release every output file that is still open.
    ///
    /// Segments without an end marker stay unterminated; no end time is
    /// invented for them. Calling this with nothing open is a no-op.
    pub fn close_all(&mut self) -> Result<()> {
        let mut first_err = None;
        for (thread_id, segment) in &mut self.segments {
            if segment.writer.is_none() {
                continue;
            }
            tracing::debug!(thread_id = %thread_id, "Releasing open thread segment");
            if let Err(e) = segment.release() {
                tracing::warn!(thread_id = %thread_id, error = %e, "Failed to release thread segment");
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Number of thread ids seen so far.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Closed segments, sorted by start time then thread id.
    pub fn finished_threads(&self) -> Vec<ThreadSpan> {
        let mut spans: Vec<ThreadSpan> = self
            .segments
            .iter()
            .filter_map(|(thread_id, seg)| {
                seg.ended_at.map(|ended_at| ThreadSpan {
                    thread_id: thread_id.clone(),
                    process_id: seg.process_id.clone(),
                    output_path: seg.output_path.clone(),
                    started_at: seg.started_at,
                    ended_at,
                    line_count: seg.line_count,
                })
            })
            .collect();
        spans.sort_by(|a, b| {
            a.started_at
                .cmp(&b.started_at)
                .then_with(|| a.thread_id.cmp(&b.thread_id))
        });
        spans
    }

    /// Thread ids whose end marker never arrived, sorted.
    pub fn unterminated_threads(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .segments
            .iter()
            .filter(|(_, seg)| !seg.is_closed())
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }
}
