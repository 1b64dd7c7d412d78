//! Funding Search Policy Module
//!
//! A funding search policy decides which funding programs a household
//! approaches, in what order, how long it waits, and when it stops.
//!
//! # Overview
//!
//! A search runs once per household per recovery stage. It reads the
//! household's funds, spawns program processes and waits on them, and in
//! the end classifies the result as a [`SearchOutcome`]. Searches never
//! write funds themselves: only programs do.
//!
//! Available policies:
//! 1. **SequentialSearch**: aid, then loan, each only while funds are below
//!    the stage target
//! 2. **RacingSearch**: insurance, aid, loan, each raced against the
//!    household's patience
//!
//! # Policy Interface
//!
//! All policies implement the `FundingSearchPolicy` trait:
//! ```rust
//! use futures::future::{FutureExt, LocalBoxFuture};
//! use rebuild_funding_core::policy::{FundingSearchPolicy, SearchOutcome};
//! use rebuild_funding_core::programs::FundingPrograms;
//! use rebuild_funding_core::{SharedHousehold, SimulationError};
//!
//! struct StayPut;
//!
//! impl FundingSearchPolicy for StayPut {
//!     fn name(&self) -> &'static str {
//!         "stay_put"
//!     }
//!
//!     fn search(
//!         &self,
//!         household: SharedHousehold,
//!         _programs: FundingPrograms,
//!     ) -> LocalBoxFuture<'static, Result<SearchOutcome, SimulationError>> {
//!         let funds = household.borrow().money_to_rebuild();
//!         async move { Ok(SearchOutcome::AlreadySufficient { funds }) }.boxed_local()
//!     }
//! }
//! ```
//!
//! Outcomes are worded into the household's story by [`narrative::render`];
//! each search appends exactly one entry of its own.

use crate::core::time::SimTime;
use crate::models::event::Event;
use crate::models::household::SharedHousehold;
use crate::models::property::Stage;
use crate::orchestrator::SimulationError;
use crate::programs::{FundingPrograms, ProgramKind};
use crate::sim::Environment;
use futures::future::LocalBoxFuture;
use serde::Serialize;
use tracing::{info, warn};

pub mod narrative;
mod racing;
mod sequential;
pub mod threshold;

pub use racing::{PatienceClock, RacingSearch};
pub use sequential::SequentialSearch;

/// How a funding search ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Funds already covered the full repair; no program was approached
    AlreadySufficient { funds: i64 },

    /// Funds reached the target
    Sufficient { duration: SimTime, funds: i64 },

    /// Every applicable program resolved and funds are still below target
    ///
    /// `stage` is the target's stage; `None` means full damage value.
    StillShort {
        stage: Option<Stage>,
        duration: SimTime,
        funds: i64,
        shortfall: i64,
    },

    /// Patience ran out at day `at` while `pending` was unresolved
    GaveUp {
        at: SimTime,
        duration: SimTime,
        pending: ProgramKind,
    },
}

impl SearchOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            SearchOutcome::AlreadySufficient { .. } => "already_sufficient",
            SearchOutcome::Sufficient { .. } => "sufficient",
            SearchOutcome::StillShort { .. } => "still_short",
            SearchOutcome::GaveUp { .. } => "gave_up",
        }
    }

    /// Length of the search in days (0 when no search was needed)
    pub fn duration(&self) -> SimTime {
        match self {
            SearchOutcome::AlreadySufficient { .. } => 0,
            SearchOutcome::Sufficient { duration, .. }
            | SearchOutcome::StillShort { duration, .. }
            | SearchOutcome::GaveUp { duration, .. } => *duration,
        }
    }
}

/// A funding search strategy
pub trait FundingSearchPolicy {
    fn name(&self) -> &'static str;

    /// Build the search process for one household
    ///
    /// # Errors
    /// Only when a program process cannot be spawned; running short of
    /// money or patience is an outcome, not an error.
    fn search(
        &self,
        household: SharedHousehold,
        programs: FundingPrograms,
    ) -> LocalBoxFuture<'static, Result<SearchOutcome, SimulationError>>;
}

/// Context for one recovery stage: the environment and the stage whose cost
/// is the search target
#[derive(Clone)]
pub struct RecoveryPolicy {
    env: Environment,
    stage: Option<Stage>,
}

impl RecoveryPolicy {
    pub fn new(env: Environment, stage: Option<Stage>) -> Self {
        Self { env, stage }
    }

    /// Build from a stage label; unknown labels target the full damage value
    pub fn from_label(env: Environment, label: Option<&str>) -> Self {
        let stage = label.and_then(Stage::from_label);
        if let (Some(label), None) = (label, stage) {
            warn!(label, "unknown stage label, targeting full damage value");
        }
        Self::new(env, stage)
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn stage(&self) -> Option<Stage> {
        self.stage
    }

    /// Log the start of a search and return its start day
    fn begin(&self, household: &SharedHousehold, policy: &'static str) -> SimTime {
        let now = self.env.now();
        let (household_id, funds) = {
            let h = household.borrow();
            (h.id().to_string(), h.money_to_rebuild())
        };
        info!(household = %household_id, policy, stage = ?self.stage, funds, "funding search started");
        self.env.log(Event::SearchStarted {
            time: now,
            household_id,
            policy,
            stage: self.stage,
            funds,
        });
        now
    }

    /// Finish immediately when funds already cover the full repair
    fn short_circuit(&self, household: &SharedHousehold) -> Option<SearchOutcome> {
        let (household_id, funds, damage_value) = {
            let h = household.borrow();
            if !h.has_full_repair_funds() {
                return None;
            }
            (
                h.id().to_string(),
                h.money_to_rebuild(),
                h.property().damage_value,
            )
        };
        self.env.log(Event::SearchSkipped {
            time: self.env.now(),
            household_id,
            funds,
            damage_value,
        });
        let outcome = SearchOutcome::AlreadySufficient { funds };
        self.finish(household, &outcome);
        Some(outcome)
    }

    /// Tell the outcome and log the end of the search
    fn finish(&self, household: &SharedHousehold, outcome: &SearchOutcome) {
        let (household_id, funds) = {
            let mut h = household.borrow_mut();
            let entry = narrative::render(outcome, h.name(), h.is_insured());
            h.tell(entry);
            (h.id().to_string(), h.money_to_rebuild())
        };
        info!(household = %household_id, outcome = outcome.kind(), funds, "funding search finished");
        self.env.log(Event::SearchFinished {
            time: self.env.now(),
            household_id,
            outcome: outcome.kind(),
            funds,
            duration: outcome.duration(),
        });
    }
}

/// Funds currently on hand
fn funds(household: &SharedHousehold) -> i64 {
    household.borrow().money_to_rebuild()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Simulation;

    #[test]
    fn test_from_label_parses_known_stage() {
        let sim = Simulation::new();
        let policy = RecoveryPolicy::from_label(sim.env().clone(), Some("Superstructure"));
        assert_eq!(policy.stage(), Some(Stage::Superstructure));
    }

    #[test]
    fn test_from_label_unknown_targets_damage() {
        let sim = Simulation::new();
        let policy = RecoveryPolicy::from_label(sim.env().clone(), Some("Painting"));
        assert_eq!(policy.stage(), None);
    }

    #[test]
    fn test_outcome_kinds() {
        assert_eq!(SearchOutcome::AlreadySufficient { funds: 1 }.kind(), "already_sufficient");
        assert_eq!(
            SearchOutcome::GaveUp {
                at: 5,
                duration: 5,
                pending: ProgramKind::Loan
            }
            .duration(),
            5
        );
    }
}
