//! Core domain types for threadlog
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Process log** | One raw input file, written by a single process, with lines from many threads interleaved |
//! | **Thread id** | Identifier of a logical unit of work inside a process log (not an OS thread of this tool) |
//! | **Segment** | The reconstructed, ordered sequence of lines belonging to one thread id |
//! | **Marker** | A reserved message payload ([`START_MARKER`], [`END_MARKER`]) delimiting a segment |
//! | **Epoch** | The timestamp at which peak concurrency was observed |

use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Message payload that opens a thread's segment.
pub const START_MARKER: &str = "**START**";

/// Message payload that closes a thread's segment.
pub const END_MARKER: &str = "**END**";

/// `chrono` format for log timestamps, e.g. `2020-08-09 18:59:25,200`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Extension of per-thread output files.
pub const OUTPUT_EXTENSION: &str = "log";

/// Parse a timestamp in [`TIMESTAMP_FORMAT`].
///
/// Every field must be zero-padded: `2020-8-9 1:2:3,000` is rejected.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime> {
    let invalid = |reason: String| Error::Timestamp {
        text: text.to_string(),
        reason,
    };

    let ts = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .map_err(|e| invalid(e.to_string()))?;

    // chrono's numeric specifiers accept unpadded input.
    if format_timestamp(&ts) != text {
        return Err(invalid("fields must be zero-padded".to_string()));
    }
    Ok(ts)
}

/// Render a timestamp in [`TIMESTAMP_FORMAT`].
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

// ============================================
// Log Records
// ============================================

/// One parsed line of a process log.
///
/// Produced by [`parse_line`](crate::ingest::parse_line). Every field except
/// `message` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub process_id: String,
    pub thread_id: String,
    pub thread_name: String,
    pub timestamp: NaiveDateTime,
    pub message: String,
}

impl LogRecord {
    pub fn is_start(&self) -> bool {
        self.message == START_MARKER
    }

    pub fn is_end(&self) -> bool {
        self.message == END_MARKER
    }
}

/// Renders the canonical line format:
/// `<processId>:<threadId>::<threadName> <timestamp> - <message>`
impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}::{} {} - {}",
            self.process_id,
            self.thread_id,
            self.thread_name,
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.message
        )
    }
}

// ============================================
// Thread Spans
// ============================================

/// A finished thread: a segment that saw both its start and end markers.
///
/// This is the read-only view the analytics queries operate on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadSpan {
    pub thread_id: String,
    pub process_id: String,
    /// Per-thread log file the segment was written to
    pub output_path: PathBuf,
    #[serde(with = "timestamp_serde")]
    pub started_at: NaiveDateTime,
    #[serde(with = "timestamp_serde")]
    pub ended_at: NaiveDateTime,
    /// Number of lines written to `output_path`, markers included
    pub line_count: usize,
}

impl ThreadSpan {
    /// Runtime from start marker to end marker, in whole milliseconds.
    pub fn runtime_ms(&self) -> i64 {
        (self.ended_at - self.started_at).num_milliseconds()
    }
}

/// Serialize timestamps in the same format the logs use.
pub(crate) mod timestamp_serde {
    use super::{parse_timestamp, TIMESTAMP_FORMAT};
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.collect_str(&ts.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> std::result::Result<NaiveDateTime, D::Error> {
        let text = String::deserialize(d)?;
        parse_timestamp(&text).map_err(serde::de::Error::custom)
    }
}
