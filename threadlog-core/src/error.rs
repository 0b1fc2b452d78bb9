//! Error types for threadlog-core

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the threadlog-core library
#[derive(Error, Debug)]
pub enum Error {
    /// A raw line does not match the fixed log grammar
    #[error("log line parse error: {reason} (line: {line:?})")]
    Parse { line: String, reason: String },

    /// A timestamp that is not exactly `YYYY-MM-DD HH:MM:SS,mmm`
    #[error("invalid timestamp {text:?}: {reason}")]
    Timestamp { text: String, reason: String },

    /// The first record seen for a thread was not the start marker
    #[error("invalid start of thread logs for thread {thread_id}: expected start marker, got {message:?}")]
    InvalidThreadStart { thread_id: String, message: String },

    /// A record arrived for a thread whose end marker was already seen
    #[error("thread {thread_id} already ended; refusing further records")]
    ThreadClosed { thread_id: String },

    /// The same thread id was reported by two different processes
    #[error("thread id {thread_id} already belongs to process {existing}, not {incoming}")]
    ThreadIdCollision {
        thread_id: String,
        existing: String,
        incoming: String,
    },

    /// A second thread resolved to an output file another thread already owns
    #[error("output file {} for thread {thread_id} is already owned by thread {owner}", path.display())]
    OutputPathCollision {
        path: PathBuf,
        thread_id: String,
        owner: String,
    },

    /// Writing or flushing a per-thread output file failed
    #[error("error occurred while writing to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A failure while ingesting one line of a raw file
    #[error("{}:{line_no}: {source}", path.display())]
    Line {
        path: PathBuf,
        line_no: usize,
        #[source]
        source: Box<Error>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid glob pattern for input discovery
    #[error("invalid input pattern: {0}")]
    Pattern(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Strip any [`Error::Line`] context and return the underlying error.
    pub fn root(&self) -> &Error {
        match self {
            Error::Line { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether this error came from the line grammar rather than I/O or ordering.
    pub fn is_parse(&self) -> bool {
        matches!(self.root(), Error::Parse { .. } | Error::Timestamp { .. })
    }

    /// Whether this error is a start/end ordering or thread identity violation.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self.root(),
            Error::InvalidThreadStart { .. }
                | Error::ThreadClosed { .. }
                | Error::ThreadIdCollision { .. }
                | Error::OutputPathCollision { .. }
        )
    }
}

/// Result type alias for threadlog-core
pub type Result<T> = std::result::Result<T, Error>;
