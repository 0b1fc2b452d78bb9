//! Thread runtime statistics.

use crate::types::ThreadSpan;
use serde::Serialize;

/// Mean and population standard deviation of thread runtimes, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RuntimeStats {
    pub count: usize,
    pub mean_ms: f64,
    pub stdev_ms: f64,
}

/// Runtime statistics over `spans`, or `None` when there are no threads.
///
/// The deviation divides by `n`: the threads are the whole population, not
/// a sample of it.
pub fn runtime_stats(spans: &[ThreadSpan]) -> Option<RuntimeStats> {
    if spans.is_empty() {
        return None;
    }

    let n = spans.len() as f64;
    let total: i64 = spans.iter().map(ThreadSpan::runtime_ms).sum();
    let mean = total as f64 / n;

    let squared_dev: f64 = spans
        .iter()
        .map(|s| (s.runtime_ms() as f64 - mean).powi(2))
        .sum();

    Some(RuntimeStats {
        count: spans.len(),
        mean_ms: mean,
        stdev_ms: (squared_dev / n).sqrt(),
    })
}
