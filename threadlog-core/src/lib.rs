//! # threadlog-core
//!
//! Core library for threadlog - re-clusters interleaved, multi-threaded
//! process logs into one ordered log per thread and answers questions about
//! thread lifetimes.
//!
//! This library provides:
//! - A parser for the fixed `<pid>:<tid>::<name> <timestamp> - <message>` grammar
//! - A segment tracker that splits interleaved lines into per-thread files
//! - An ingest coordinator that drives both over a directory of raw logs
//! - Aggregate queries: active threads, peak concurrency, runtime statistics
//! - Configuration management and logging infrastructure
//!
//! ## Example
//!
//! ```rust,no_run
//! use threadlog_core::analytics::{peak_concurrency, runtime_stats};
//! use threadlog_core::ingest::{IngestCoordinator, SegmentTracker};
//!
//! let mut tracker = SegmentTracker::new("./mergedlogs").expect("failed to create output dir");
//! let coordinator = IngestCoordinator::new("./rawlogs", "*");
//! coordinator.ingest_all(&mut tracker).expect("failed to read input dir");
//! tracker.close_all().expect("failed to flush thread logs");
//!
//! let threads = tracker.finished_threads();
//! println!("{:?}", peak_concurrency(&threads));
//! println!("{:?}", runtime_stats(&threads));
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use ingest::{IngestCoordinator, IngestResult, SegmentTracker};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod types;
