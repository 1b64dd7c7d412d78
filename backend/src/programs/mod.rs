//! Funding Program Module
//!
//! Funding programs are the collaborators a household approaches for money:
//! an owner's insurance claim, a public reconstruction grant, a home loan.
//! Each one is a simulation process: it may queue for program staff, waits
//! a sampled processing time, then pays (or declines) and resolves.
//!
//! # Program Interface
//!
//! All programs implement the `FundingProgram` trait:
//! ```rust
//! use futures::future::{FutureExt, LocalBoxFuture};
//! use rebuild_funding_core::programs::{ClaimOutcome, FundingProgram, ProgramKind};
//! use rebuild_funding_core::{Environment, SharedHousehold};
//! use std::rc::Rc;
//!
//! struct Neighbour;
//!
//! impl FundingProgram for Neighbour {
//!     fn kind(&self) -> ProgramKind {
//!         ProgramKind::Assistance
//!     }
//!
//!     fn name(&self) -> &str {
//!         "neighbour"
//!     }
//!
//!     fn process(
//!         self: Rc<Self>,
//!         env: Environment,
//!         household: SharedHousehold,
//!     ) -> LocalBoxFuture<'static, ClaimOutcome> {
//!         async move {
//!             env.timeout(2).await;
//!             household.borrow_mut().receive_funds(50);
//!             ClaimOutcome::Paid { amount: 50 }
//!         }
//!         .boxed_local()
//!     }
//! }
//! ```
//!
//! # Interruption
//!
//! A program process may be cancelled mid-flight (racing search). The
//! program's future is dropped at its current suspension point: any staff
//! member it holds is released and a [`ClaimTicket`] still open records the
//! interruption. Funds are only ever added after the final wait, so an
//! interrupted program never leaves a half-applied payout.
//!
//! # Available programs
//!
//! 1. **OwnersInsurance**: claim minus a coverage-scaled deductible
//! 2. **StageGrant**: reconstruction grant paid in per-milestone installments
//! 3. **HomeLoan**: loan sized to close the gap to the next milestone
//! 4. **FlatGrant**: fixed amount, for scripted scenarios

use crate::models::household::SharedHousehold;
use crate::orchestrator::SimulationError;
use crate::rng::{DurationDistribution, RngManager};
use crate::sim::{Environment, Process, StaffGuard, StaffPool};
use crate::SimTime;
use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

mod assistance;
mod claim;
mod flat;
mod insurance;
mod loan;

pub use assistance::{Installments, StageGrant};
pub use claim::ClaimTicket;
pub use flat::FlatGrant;
pub use insurance::OwnersInsurance;
pub use loan::HomeLoan;

// ============================================================================
// Program identity and outcome
// ============================================================================

/// Program family; selects which household record a program writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramKind {
    Insurance,
    Assistance,
    Loan,
}

impl ProgramKind {
    /// Name of the process as told in a household's story
    pub fn process_label(&self) -> &'static str {
        match self {
            ProgramKind::Insurance => "insurance claim",
            ProgramKind::Assistance => "NRA grant",
            ProgramKind::Loan => "loan approval",
        }
    }
}

impl fmt::Display for ProgramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProgramKind::Insurance => "insurance",
            ProgramKind::Assistance => "assistance",
            ProgramKind::Loan => "loan",
        };
        f.write_str(name)
    }
}

/// How a program process resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClaimOutcome {
    /// Money was added to the household's funds
    Paid { amount: i64 },

    /// Resolved without paying
    Declined { reason: String },

    /// Household already had enough; nothing was requested
    NotNeeded,
}

impl ClaimOutcome {
    /// Amount paid (0 unless `Paid`)
    pub fn amount(&self) -> i64 {
        match self {
            ClaimOutcome::Paid { amount } => *amount,
            _ => 0,
        }
    }

    pub fn declined(reason: impl Into<String>) -> Self {
        ClaimOutcome::Declined {
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Program trait
// ============================================================================

/// A funding source a household can apply to
///
/// `process` returns a fresh process future per invocation; programs keep no
/// per-household state between calls.
pub trait FundingProgram {
    fn kind(&self) -> ProgramKind;

    fn name(&self) -> &str;

    /// Build the program's process for one household
    ///
    /// The future must be safe to drop at any suspension point.
    fn process(
        self: Rc<Self>,
        env: Environment,
        household: SharedHousehold,
    ) -> LocalBoxFuture<'static, ClaimOutcome>;
}

/// The program collaborators handed to a search
#[derive(Clone)]
pub struct FundingPrograms {
    pub insurance: Rc<dyn FundingProgram>,
    pub aid: Rc<dyn FundingProgram>,
    pub loan: Rc<dyn FundingProgram>,
}

impl FundingPrograms {
    pub fn new(
        insurance: Rc<dyn FundingProgram>,
        aid: Rc<dyn FundingProgram>,
        loan: Rc<dyn FundingProgram>,
    ) -> Self {
        Self {
            insurance,
            aid,
            loan,
        }
    }

    /// Program filling a slot
    pub fn get(&self, kind: ProgramKind) -> &Rc<dyn FundingProgram> {
        match kind {
            ProgramKind::Insurance => &self.insurance,
            ProgramKind::Assistance => &self.aid,
            ProgramKind::Loan => &self.loan,
        }
    }

    /// Spawn the program in `kind`'s slot as a process for `household`
    pub fn spawn(
        &self,
        kind: ProgramKind,
        env: &Environment,
        household: &SharedHousehold,
    ) -> Result<Process<ClaimOutcome>, SimulationError> {
        let program = Rc::clone(self.get(kind));
        env.process(program.process(env.clone(), Rc::clone(household)))
    }
}

// ============================================================================
// Shared program machinery
// ============================================================================

/// Staff, processing time and randomness shared by every concrete program
#[derive(Debug)]
pub(crate) struct ProgramDesk {
    staff: StaffPool,
    duration: DurationDistribution,
    rng: RefCell<RngManager>,
}

impl Default for ProgramDesk {
    fn default() -> Self {
        Self {
            staff: StaffPool::unlimited(),
            duration: DurationDistribution::default(),
            rng: RefCell::new(RngManager::new(0)),
        }
    }
}

impl ProgramDesk {
    pub(crate) fn set_staff(&mut self, staff: StaffPool) {
        self.staff = staff;
    }

    pub(crate) fn set_duration(&mut self, duration: DurationDistribution) {
        self.duration = duration;
    }

    pub(crate) fn set_rng(&mut self, rng: RngManager) {
        self.rng = RefCell::new(rng);
    }

    pub(crate) fn staff(&self) -> &StaffPool {
        &self.staff
    }

    fn sample_days(&self) -> SimTime {
        self.duration.sample(&mut self.rng.borrow_mut())
    }

    /// Wait for a staff member, then for the processing time
    ///
    /// Returns the staff member still assigned; dropping it frees them.
    pub(crate) async fn work(&self, env: &Environment) -> StaffGuard {
        let staff = self.staff.request().await;
        let days = self.sample_days();
        env.timeout(days).await;
        staff
    }
}

/// Implements the builder setters every program shares
macro_rules! desk_builders {
    ($program:ty) => {
        impl $program {
            /// Staff processing requests (default: unlimited)
            pub fn with_staff(mut self, staff: $crate::sim::StaffPool) -> Self {
                self.desk.set_staff(staff);
                self
            }

            /// Processing-time distribution (default: same day)
            pub fn with_duration(mut self, duration: $crate::rng::DurationDistribution) -> Self {
                self.desk.set_duration(duration);
                self
            }

            /// Random stream used to sample processing times
            pub fn with_rng(mut self, rng: $crate::rng::RngManager) -> Self {
                self.desk.set_rng(rng);
                self
            }

            pub fn staff(&self) -> &$crate::sim::StaffPool {
                self.desk.staff()
            }
        }
    };
}
pub(crate) use desk_builders;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_outcome_amount() {
        assert_eq!(ClaimOutcome::Paid { amount: 90 }.amount(), 90);
        assert_eq!(ClaimOutcome::declined("no budget").amount(), 0);
        assert_eq!(ClaimOutcome::NotNeeded.amount(), 0);
    }

    #[test]
    fn test_process_labels() {
        assert_eq!(ProgramKind::Insurance.process_label(), "insurance claim");
        assert_eq!(ProgramKind::Assistance.process_label(), "NRA grant");
        assert_eq!(ProgramKind::Loan.process_label(), "loan approval");
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ProgramKind::Assistance).unwrap();
        assert_eq!(json, "\"assistance\"");
    }
}
