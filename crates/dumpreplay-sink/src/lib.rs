//! # dumpreplay-sink
//!
//! `RecordSink` implementations. The dispatcher only ever sees the trait;
//! everything destination-specific (files today, a live document store
//! tomorrow) stays behind it, including any retry policy a destination wants.

pub mod jsonl;
pub mod memory;
pub mod null;

pub use jsonl::JsonLinesSink;
pub use memory::MemorySink;
pub use null::NullSink;
