//! Rate policy — the admission-control parameters for one replay run.

use serde::{Deserialize, Serialize};

use crate::error::ReplayError;

/// Token-bucket parameters governing how fast records reach the sink.
///
/// Immutable for the duration of a dispatch run. `burst_size = 1` degenerates
/// to a plain fixed-interval throttle of one record every
/// `1 / sustained_rate` seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RatePolicy {
    /// Steady admission rate, records per second. Must be positive and finite.
    pub sustained_rate: f64,
    /// Records that may be admitted instantaneously before throttling. Must
    /// be at least 1.
    pub burst_size: u32,
}

impl RatePolicy {
    pub fn new(sustained_rate: f64, burst_size: u32) -> Result<Self, ReplayError> {
        let policy = Self {
            sustained_rate,
            burst_size,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), ReplayError> {
        if !self.sustained_rate.is_finite() || self.sustained_rate <= 0.0 {
            return Err(ReplayError::InvalidPolicy {
                reason: format!(
                    "sustained_rate must be a positive finite number, got {}",
                    self.sustained_rate
                ),
            });
        }
        if self.burst_size == 0 {
            return Err(ReplayError::InvalidPolicy {
                reason: "burst_size must be at least 1".into(),
            });
        }
        Ok(())
    }
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self {
            sustained_rate: 2.0,
            burst_size: 1,
        }
    }
}
