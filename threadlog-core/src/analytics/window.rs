//! Threads active within a time window.

use crate::types::ThreadSpan;
use chrono::NaiveDateTime;

/// Threads whose `[started_at, ended_at]` overlaps `[from, to]`.
///
/// Both intervals are closed: a thread that ends exactly at `from`, or starts
/// exactly at `to`, counts as active. An inverted window (`from > to`) matches
/// nothing.
pub fn active_threads(
    spans: &[ThreadSpan],
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> Vec<&ThreadSpan> {
    if from > to {
        return Vec::new();
    }

    spans
        .iter()
        .filter(|span| !(to < span.started_at || from > span.ended_at))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::{at, span};

    #[test]
    fn test_touching_endpoint_is_active() {
        let spans = vec![span("t1", "10:00:00,000", "10:00:05,000")];

        let hits = active_threads(&spans, at("10:00:05,000"), at("10:00:10,000"));
        assert_eq!(hits.len(), 1);

        let hits = active_threads(&spans, at("09:59:50,000"), at("10:00:00,000"));
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_disjoint_windows_excluded() {
        let spans = vec![span("t1", "10:00:00,000", "10:00:05,000")];

        assert!(active_threads(&spans, at("10:00:05,001"), at("10:00:10,000")).is_empty());
        assert!(active_threads(&spans, at("09:00:00,000"), at("09:59:59,999")).is_empty());
    }

    #[test]
    fn test_window_inside_and_around_thread() {
        let spans = vec![
            span("long", "10:00:00,000", "10:10:00,000"),
            span("short", "10:05:00,000", "10:05:01,000"),
            span("late", "11:00:00,000", "11:00:01,000"),
        ];

        let hits = active_threads(&spans, at("10:04:00,000"), at("10:06:00,000"));
        let ids: Vec<_> = hits.iter().map(|s| s.thread_id.as_str()).collect();
        assert_eq!(ids, vec!["long", "short"]);
    }

    #[test]
    fn test_inverted_window_is_empty() {
        let spans = vec![span("t1", "10:00:00,000", "10:00:05,000")];
        assert!(active_threads(&spans, at("10:00:04,000"), at("10:00:01,000")).is_empty());
    }
}
