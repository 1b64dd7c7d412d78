//! Simulation errors
//!
//! Running short of money or patience is a search outcome, never an error.
//! These cover configurations that cannot run and executor failures.

use crate::rng::DistributionError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    /// Configuration validation error
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Two households share an id
    #[error("Duplicate household id: {0}")]
    DuplicateHousehold(String),

    /// The executor refused a new process
    #[error("Failed to spawn process: {0}")]
    Spawn(String),

    /// A processing-time distribution has inconsistent parameters
    #[error("Invalid duration distribution: {0}")]
    Distribution(#[from] DistributionError),
}
