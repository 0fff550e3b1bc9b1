//! Error types for the DumpReplay decode and dispatch pipeline.

use thiserror::Error;

/// Fatal decode-pass errors. Any of these ends the archive sequence; the
/// stream is presumed corrupt from that point forward and no resynchronization
/// is attempted.
///
/// A record body that is length-correct but does not parse as BSON is *not*
/// represented here: those bytes are consumed at the declared boundary, the
/// record is dropped with a warning, and decoding continues.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive IO error at byte {offset}: {source}")]
    Io {
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("truncated record at byte {offset}: declared {declared} bytes, stream ended after {read}")]
    Truncated {
        offset: u64,
        declared: i32,
        read: usize,
    },

    #[error("rejected record at byte {offset}: declared size {declared} outside {min}..={max}")]
    Oversized {
        offset: u64,
        declared: i32,
        min: i32,
        max: i32,
    },
}

/// Errors surfaced by a sink when applying a record.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("insert rejected: {reason}")]
    Rejected { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Terminal outcome of a failed replay run.
///
/// Cancellation is deliberately absent: a cancelled run ends cleanly with a
/// partial [`ReplayReport`](crate::ReplayReport), not an error.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("invalid rate policy: {reason}")]
    InvalidPolicy { reason: String },

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("sink failed on record {index}: {source}")]
    Sink {
        /// 1-indexed position of the failing record in sink order.
        index: u64,
        #[source]
        source: SinkError,
    },
}
