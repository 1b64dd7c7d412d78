//! Discrete-event scheduling environment
//!
//! - **environment**: clock, timers, process spawning and the driver loop
//! - **race**: first-to-finish race that returns the loser for cancellation
//! - **resource**: staff pools and program budgets

mod environment;
mod race;
mod resource;

pub use environment::{Environment, Process, Simulation, Timeout};
pub use race::{race, Race};
pub use resource::{Budget, StaffGuard, StaffPool, StaffRequest};
