//! Processing-duration distributions for funding programs
//!
//! Programs draw how long a claim, grant review or loan approval takes from
//! one of these distributions. Samples are whole days.

use super::RngManager;
use crate::core::time::SimTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a distribution's parameters are inconsistent
#[derive(Debug, Error, PartialEq)]
pub enum DistributionError {
    #[error("Uniform bounds out of order: min {min} > max {max}")]
    UniformBounds { min: SimTime, max: SimTime },

    #[error("Triangular parameters must satisfy min <= mode <= max (got {min}, {mode}, {max})")]
    TriangularBounds {
        min: SimTime,
        mode: SimTime,
        max: SimTime,
    },
}

/// Probability distribution of a program's processing time in days
///
/// # Example
/// ```
/// use rebuild_funding_core::{DurationDistribution, RngManager};
///
/// let dist = DurationDistribution::Uniform { min: 30, max: 60 };
/// let mut rng = RngManager::new(7);
/// let days = dist.sample(&mut rng);
/// assert!((30..=60).contains(&days));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DurationDistribution {
    /// Always the same number of days
    Fixed { days: SimTime },

    /// Uniform over `[min, max]` (inclusive)
    Uniform { min: SimTime, max: SimTime },

    /// Triangular with lower bound, mode and upper bound, rounded to days
    Triangular {
        min: SimTime,
        mode: SimTime,
        max: SimTime,
    },
}

impl Default for DurationDistribution {
    fn default() -> Self {
        DurationDistribution::Fixed { days: 0 }
    }
}

impl DurationDistribution {
    /// Check parameter consistency
    pub fn validate(&self) -> Result<(), DistributionError> {
        match *self {
            DurationDistribution::Fixed { .. } => Ok(()),
            DurationDistribution::Uniform { min, max } => {
                if min > max {
                    Err(DistributionError::UniformBounds { min, max })
                } else {
                    Ok(())
                }
            }
            DurationDistribution::Triangular { min, mode, max } => {
                if min <= mode && mode <= max {
                    Ok(())
                } else {
                    Err(DistributionError::TriangularBounds { min, mode, max })
                }
            }
        }
    }

    /// Draw a duration in whole days
    ///
    /// Assumes `validate()` passed; inverted bounds collapse to `min`.
    pub fn sample(&self, rng: &mut RngManager) -> SimTime {
        match *self {
            DurationDistribution::Fixed { days } => days,
            DurationDistribution::Uniform { min, max } => {
                if max <= min {
                    return min;
                }
                // inclusive width; [0, MAX] spans every u64
                let offset = match ((max - min) as u64).checked_add(1) {
                    Some(width) => rng.next() % width,
                    None => rng.next(),
                };
                min + offset as SimTime
            }
            DurationDistribution::Triangular { min, mode, max } => {
                if max <= min {
                    return min;
                }
                let (a, c, b) = (min as f64, mode as f64, max as f64);
                let u = rng.next_f64();
                let split = (c - a) / (b - a);
                let x = if u < split {
                    a + (u * (b - a) * (c - a)).sqrt()
                } else {
                    b - ((1.0 - u) * (b - a) * (b - c)).sqrt()
                };
                x.round().clamp(a, b) as SimTime
            }
        }
    }
}
