//! The final report of a replay run.

/// How a replay run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayOutcome {
    /// The whole archive was consumed and every record applied.
    Completed,
    /// Cooperative cancellation was observed; partial progress is reported.
    Cancelled,
}

impl std::fmt::Display for ReplayOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Counters for one replay run.
#[derive(Debug, Clone)]
pub struct ReplayReport {
    /// Records acknowledged by the sink.
    pub records_applied: u64,
    /// Records successfully decoded from the archive.
    pub records_decoded: u64,
    /// Skip markers (`size == -1`) consumed.
    pub markers_skipped: u64,
    /// Length-correct bodies dropped because they did not parse.
    pub decode_errors: u64,
    pub outcome: ReplayOutcome,
}
