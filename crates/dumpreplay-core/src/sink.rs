//! The `RecordSink` trait — boundary contract for record destinations.

use async_trait::async_trait;

use crate::error::SinkError;
use crate::record::Record;

/// A destination that applies archive records as insert operations.
///
/// The dispatcher calls `apply` once per admitted record, in archive order,
/// never concurrently, and treats the first failure as fatal to the run.
/// Retry, pooling, and connection semantics belong to implementations, not
/// to this contract.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` so a sink handle can be shared with
/// the Tokio task running the dispatch loop.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Apply one record. Blocking (from the dispatcher's perspective) until
    /// the result is known.
    async fn apply(&self, record: &Record) -> Result<(), SinkError>;

    /// Short human-readable name, used in log lines.
    fn name(&self) -> &str {
        "sink"
    }
}
