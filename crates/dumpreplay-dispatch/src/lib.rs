//! # dumpreplay-dispatch
//!
//! The rate-governed replay pipeline. Exactly two concurrent activities,
//! bridged by one bounded channel:
//!
//! ```text
//! ArchiveReader (blocking task, owns the file handle)
//!       │
//!       ▼
//! bounded mpsc channel     ← backpressure: decoder blocks when full
//!       │
//!       ▼
//! dispatch loop            ← one token per record, cooperative waits
//!       │
//!       ▼
//! RecordSink::apply        ← one in-flight call, strict archive order
//! ```
//!
//! The token bucket admits up to `burst_size` records instantaneously and
//! `sustained_rate` records/second thereafter; over any window of length `T`
//! the sink sees at most `burst_size + sustained_rate × T` calls.

pub mod config;
pub mod engine;
pub mod limiter;

pub use config::ReplayConfig;
pub use engine::{dispatch, ReplayEngine, ReplayMetrics};
pub use limiter::TokenBucket;
