//! Orchestrator - scenario configuration and driver
//!
//! - **config**: serde scenario types and validation
//! - **error**: `SimulationError`
//! - **engine**: `run_scenario`

pub mod config;
pub mod engine;
pub mod error;

pub use config::{HouseholdConfig, PolicyConfig, ProgramConfig, ProgramsConfig, ScenarioConfig};
pub use engine::{run_scenario, HouseholdResult, ScenarioRun};
pub use error::SimulationError;
