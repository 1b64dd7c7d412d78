//! Deterministic random number generation
//!
//! Uses xorshift64* for fast, deterministic sampling of program durations.
//! CRITICAL: All randomness in the simulator MUST go through this module.

mod duration;
mod xorshift;

pub use duration::{DistributionError, DurationDistribution};
pub use xorshift::RngManager;
