//! Scenario driver
//!
//! Builds the simulation, runs one funding search per household to
//! completion and hands the households back. No aggregation happens here.
//!
//! # Example
//!
//! ```rust
//! use rebuild_funding_core::orchestrator::{run_scenario, ScenarioConfig};
//!
//! let config = ScenarioConfig::from_json(r#"{
//!     "policy": { "type": "sequential" },
//!     "households": [
//!         { "id": "hh_001", "savings": 1000, "damage_value": 1000,
//!           "plinth_value": 200, "wall_value": 600, "roof_value": 900 }
//!     ]
//! }"#).unwrap();
//!
//! let run = run_scenario(&config).unwrap();
//! assert_eq!(run.results[0].household.money_to_rebuild(), 1000);
//! assert_eq!(run.final_time, 0);
//! ```

use super::config::ScenarioConfig;
use super::error::SimulationError;
use crate::core::time::SimTime;
use crate::models::event::EventLog;
use crate::models::household::Household;
use crate::policy::{RecoveryPolicy, SearchOutcome};
use crate::sim::Simulation;
use std::rc::Rc;
use tracing::{info, warn};

/// Final state of one household
#[derive(Debug, Clone)]
pub struct HouseholdResult {
    pub household: Household,

    /// `None` if the search never finished (a program never resolved)
    pub outcome: Option<SearchOutcome>,
}

/// Everything a scenario run produced
#[derive(Debug, Clone)]
pub struct ScenarioRun {
    /// One entry per household, in configuration order
    pub results: Vec<HouseholdResult>,
    pub events: EventLog,
    pub final_time: SimTime,
}

impl ScenarioRun {
    pub fn result(&self, household_id: &str) -> Option<&HouseholdResult> {
        self.results
            .iter()
            .find(|r| r.household.id() == household_id)
    }
}

/// Run a scenario to completion
///
/// # Errors
/// Invalid configuration, or a process that could not be spawned.
pub fn run_scenario(config: &ScenarioConfig) -> Result<ScenarioRun, SimulationError> {
    config.validate()?;

    let mut sim = Simulation::new();
    let env = sim.env().clone();

    let programs = config.programs.build(config.rng_seed);
    let policy = config
        .policy
        .build(RecoveryPolicy::from_label(env.clone(), config.stage.as_deref()));

    info!(
        households = config.households.len(),
        policy = policy.name(),
        seed = config.rng_seed,
        "scenario started"
    );

    let mut searches = Vec::with_capacity(config.households.len());
    for household_config in &config.households {
        let household = household_config.build(config.write_story).into_shared();
        let search = sim.spawn(policy.search(Rc::clone(&household), programs.clone()))?;
        searches.push((household, search));
    }

    let final_time = sim.run();

    let mut results = Vec::with_capacity(searches.len());
    for (household, mut search) in searches {
        let outcome = search.try_result().transpose()?;
        let household = household.borrow().clone();
        if outcome.is_none() {
            warn!(household = household.id(), "funding search never finished");
        }
        results.push(HouseholdResult { household, outcome });
    }

    info!(final_time, "scenario finished");
    Ok(ScenarioRun {
        results,
        events: env.event_log(),
        final_time,
    })
}
