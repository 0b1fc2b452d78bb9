//! Aggregate queries over finished threads
//!
//! All queries are pure functions over the [`ThreadSpan`]s returned by
//! [`SegmentTracker::finished_threads`](crate::ingest::SegmentTracker::finished_threads):
//! - [`active_threads`]: threads overlapping a time window
//! - [`peak_concurrency`]: highest concurrent thread count and its epoch
//! - [`runtime_stats`]: mean and standard deviation of thread runtimes
//!
//! Threads that never logged an end marker are not finished and so never
//! reach these queries.

pub mod concurrency;
pub mod runtime;
pub mod window;

pub use concurrency::{peak_concurrency, PeakConcurrency};
pub use runtime::{runtime_stats, RuntimeStats};
pub use window::active_threads;

use crate::types::{timestamp_serde, ThreadSpan};
use chrono::NaiveDateTime;
use serde::Serialize;

/// Answers to all three queries, as printed by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct ThreadReport {
    #[serde(serialize_with = "timestamp_serde::serialize")]
    pub window_start: NaiveDateTime,
    #[serde(serialize_with = "timestamp_serde::serialize")]
    pub window_end: NaiveDateTime,
    /// Threads active within `[window_start, window_end]`
    pub active: Vec<ThreadSpan>,
    pub peak: Option<PeakConcurrency>,
    pub runtime: Option<RuntimeStats>,
    /// Threads excluded from the queries because their end marker never arrived
    pub unterminated: Vec<String>,
}

impl ThreadReport {
    /// Run all three queries over `spans`.
    pub fn build(
        spans: &[ThreadSpan],
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
    ) -> Self {
        Self {
            window_start,
            window_end,
            active: active_threads(spans, window_start, window_end)
                .into_iter()
                .cloned()
                .collect(),
            peak: peak_concurrency(spans),
            runtime: runtime_stats(spans),
            unterminated: Vec::new(),
        }
    }

    /// Attach the ids of threads that were left open.
    pub fn with_unterminated<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unterminated = ids.into_iter().map(Into::into).collect();
        self
    }
}
