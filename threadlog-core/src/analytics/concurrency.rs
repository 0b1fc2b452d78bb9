//! Peak thread concurrency.
//!
//! A thread is alive at instant `t` when it has started (`started_at <= t`)
//! and either has not yet ended (`t < ended_at`) or started exactly at `t`.
//! The peak is the largest number of threads alive at any thread's start
//! time; the count can only grow at a start, so no other instants matter.
//!
//! Computed with a sweep over sorted start/end events in `O(n log n)`.

use crate::types::{timestamp_serde, ThreadSpan};
use chrono::NaiveDateTime;
use serde::Serialize;

/// Highest number of concurrently alive threads and when it was first reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeakConcurrency {
    pub count: usize,
    /// Earliest start time at which `count` threads were alive
    #[serde(serialize_with = "timestamp_serde::serialize")]
    pub epoch: NaiveDateTime,
}

/// Event ordering within one instant.
///
/// Threads ending at `t` are gone before threads starting at `t` are counted.
/// Zero-length threads end after all starts at `t`, so they count at their
/// own start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Event {
    End,
    Start,
    InstantEnd,
}

/// Peak concurrency over `spans`, or `None` when there are no threads.
pub fn peak_concurrency(spans: &[ThreadSpan]) -> Option<PeakConcurrency> {
    let mut events: Vec<(NaiveDateTime, Event)> = Vec::with_capacity(spans.len() * 2);
    for span in spans {
        events.push((span.started_at, Event::Start));
        let end = if span.ended_at == span.started_at {
            Event::InstantEnd
        } else {
            Event::End
        };
        events.push((span.ended_at, end));
    }
    events.sort_unstable();

    let mut alive = 0usize;
    let mut peak: Option<PeakConcurrency> = None;

    for (ts, event) in events {
        match event {
            Event::Start => {
                alive += 1;
                if peak.map_or(true, |p| alive > p.count) {
                    peak = Some(PeakConcurrency {
                        count: alive,
                        epoch: ts,
                    });
                }
            }
            Event::End | Event::InstantEnd => alive = alive.saturating_sub(1),
        }
    }

    peak
}
