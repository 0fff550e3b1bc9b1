//! Replay engine configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use dumpreplay_core::{RatePolicy, ReplayError};

/// Configuration for one replay run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Path of the archive to decode.
    pub source_path: PathBuf,
    /// Steady admission rate towards the sink, records per second.
    #[serde(default = "default_rate")]
    pub sustained_rate: f64,
    /// Records that may be admitted instantaneously before throttling.
    #[serde(default = "default_burst")]
    pub burst_size: u32,
    /// Bounded-channel capacity between decoder and dispatcher. Independent
    /// of archive size; this is what bounds pipeline memory.
    #[serde(default = "default_buffer")]
    pub buffer_capacity: usize,
}

fn default_rate() -> f64 { 2.0 }
fn default_burst() -> u32 { 1 }
fn default_buffer() -> usize { 1_024 }

impl ReplayConfig {
    /// Config with defaults for everything except the archive path.
    pub fn new(source_path: impl AsRef<Path>) -> Self {
        Self {
            source_path: source_path.as_ref().to_path_buf(),
            sustained_rate: default_rate(),
            burst_size: default_burst(),
            buffer_capacity: default_buffer(),
        }
    }

    /// Validate and extract the rate policy.
    pub fn policy(&self) -> Result<RatePolicy, ReplayError> {
        self.validate()?;
        RatePolicy::new(self.sustained_rate, self.burst_size)
    }

    pub fn validate(&self) -> Result<(), ReplayError> {
        if self.buffer_capacity == 0 {
            return Err(ReplayError::InvalidPolicy {
                reason: "buffer_capacity must be at least 1".into(),
            });
        }
        RatePolicy::new(self.sustained_rate, self.burst_size).map(|_| ())
    }
}
