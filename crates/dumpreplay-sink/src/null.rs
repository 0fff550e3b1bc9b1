//! Discarding sink.
//!
//! Acknowledges every record without storing it, keeping only a running
//! count. This is the dry-run destination: the pipeline's memory stays
//! bounded by the channel capacity no matter how large the archive is.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

use dumpreplay_core::{Record, RecordSink, SinkError};

#[derive(Default)]
pub struct NullSink {
    applied: AtomicU64,
}

impl NullSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records acknowledged so far.
    pub fn applied(&self) -> u64 {
        self.applied.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RecordSink for NullSink {
    async fn apply(&self, _record: &Record) -> Result<(), SinkError> {
        self.applied.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}
