//! # dumpreplay-core
//!
//! Core types shared across all DumpReplay crates: the `Record` produced by
//! the archive decoder, the error taxonomy of a replay run, the `RatePolicy`
//! governing admission to the sink, and the `RecordSink` contract every
//! destination implements.

pub mod error;
pub mod policy;
pub mod record;
pub mod report;
pub mod sink;

pub use error::{ArchiveError, ReplayError, SinkError};
pub use policy::RatePolicy;
pub use record::Record;
pub use report::{ReplayOutcome, ReplayReport};
pub use sink::RecordSink;
