//! Rebuild Funding Core - household funding-search simulation
//!
//! Discrete-event model of how a disaster-affected household gathers money
//! to rebuild its home from insurance, public aid and loans.
//!
//! # Architecture
//!
//! - **core**: Simulation time and money formatting
//! - **rng**: Deterministic random numbers and processing-time distributions
//! - **sim**: Scheduling environment (clock, timers, processes, resources)
//! - **models**: Domain types (Household, Property, Event)
//! - **programs**: Funding programs (insurance, grant, loan)
//! - **policy**: Funding search strategies (sequential, racing)
//! - **orchestrator**: Scenario configuration and driver
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 (whole currency units)
//! 2. All randomness is deterministic (seeded RNG)
//! 3. Only funding programs write a household's funds; searches only read them

// Module declarations
pub mod core;
pub mod models;
pub mod orchestrator;
pub mod policy;
pub mod programs;
pub mod rng;
pub mod sim;

// Re-exports for convenience
pub use core::time::{SimClock, SimTime};
pub use models::{
    event::{Event, EventLog},
    household::{Household, ProgramRecord, SharedHousehold, Story},
    property::{
        BuildProgress, InstallmentReceipt, InstallmentReceipts, Property, Stage, StageParseError,
    },
};
pub use orchestrator::{
    run_scenario, HouseholdConfig, HouseholdResult, PolicyConfig, ProgramConfig, ProgramsConfig,
    ScenarioConfig, ScenarioRun, SimulationError,
};
pub use policy::{
    FundingSearchPolicy, PatienceClock, RacingSearch, RecoveryPolicy, SearchOutcome,
    SequentialSearch,
};
pub use programs::{ClaimOutcome, FundingProgram, FundingPrograms, ProgramKind};
pub use rng::{DistributionError, DurationDistribution, RngManager};
pub use sim::{Environment, Process, Simulation, Timeout};
