//! Racing search: insurance, aid, loan, each against the patience clock
//!
//! Every step races one program process against a patience timer. Whichever
//! resolves first wins and the loser is cancelled on the spot: a winning
//! program discards its timer, an expired timer interrupts the program and
//! ends the whole search. The interrupted program is torn down before the
//! search records its own finish, so its interruption comes first in both
//! the event log and the story.
//!
//! A program that resolves without raising funds still counts as resolved;
//! the search moves on to the next one. Remaining steps are skipped once
//! funds cover the full damage value, and the final check is against the
//! full damage value regardless of stage.

use super::{funds, FundingSearchPolicy, RecoveryPolicy, SearchOutcome};
use crate::core::time::SimTime;
use crate::models::event::Event;
use crate::models::household::SharedHousehold;
use crate::orchestrator::SimulationError;
use crate::programs::{ClaimOutcome, FundingPrograms, ProgramKind};
use crate::sim::{race, Process, Race};
use futures::future::{FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::{debug, info};

/// Programs raced, in order
const STEPS: [ProgramKind; 3] = [
    ProgramKind::Insurance,
    ProgramKind::Assistance,
    ProgramKind::Loan,
];

/// When the patience clock starts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatienceClock {
    /// A fresh `search_patience` for every program
    #[default]
    PerProgram,

    /// One `search_patience` for the whole search
    WholeSearch,
}

/// Result of racing one program against patience
enum StepResult {
    ProgramWon(ClaimOutcome),
    PatienceExpired {
        at: SimTime,
        pending: Process<ClaimOutcome>,
    },
}

async fn race_patience<P>(program: Process<ClaimOutcome>, patience: P) -> StepResult
where
    P: Future<Output = SimTime> + Unpin,
{
    match race(program, patience).await {
        // Dropping an owned timer cancels it; a borrowed whole-search
        // deadline keeps running
        Race::First(outcome, _timer) => StepResult::ProgramWon(outcome),
        Race::Second(at, pending) => StepResult::PatienceExpired { at, pending },
    }
}

pub struct RacingSearch {
    policy: RecoveryPolicy,
    search_patience: SimTime,
    clock: PatienceClock,
}

impl RacingSearch {
    pub fn new(policy: RecoveryPolicy, search_patience: SimTime) -> Self {
        Self {
            policy,
            search_patience,
            clock: PatienceClock::default(),
        }
    }

    pub fn with_patience_clock(mut self, clock: PatienceClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn policy(&self) -> &RecoveryPolicy {
        &self.policy
    }

    pub fn search_patience(&self) -> SimTime {
        self.search_patience
    }

    pub fn patience_clock(&self) -> PatienceClock {
        self.clock
    }
}

impl FundingSearchPolicy for RacingSearch {
    fn name(&self) -> &'static str {
        "racing"
    }

    fn search(
        &self,
        household: SharedHousehold,
        programs: FundingPrograms,
    ) -> LocalBoxFuture<'static, Result<SearchOutcome, SimulationError>> {
        let policy = self.policy.clone();
        let name = self.name();
        let patience = self.search_patience;
        let clock = self.clock;

        async move {
            let env = policy.env().clone();
            let start = policy.begin(&household, name);

            if let Some(outcome) = policy.short_circuit(&household) {
                return Ok(outcome);
            }

            let mut deadline = match clock {
                PatienceClock::WholeSearch => Some(env.timeout(patience)),
                PatienceClock::PerProgram => None,
            };

            for kind in STEPS {
                if household.borrow().has_full_repair_funds() {
                    debug!(program = %kind, "full repair covered, skipping program");
                    break;
                }

                let program = programs.spawn(kind, &env, &household)?;
                let step = match deadline.as_mut() {
                    Some(timer) => race_patience(program, timer).await,
                    None => race_patience(program, env.timeout(patience)).await,
                };

                match step {
                    StepResult::ProgramWon(resolution) => {
                        debug!(program = %kind, ?resolution, "program won the race");
                    }
                    StepResult::PatienceExpired { at, pending } => {
                        let household_id = {
                            let mut h = household.borrow_mut();
                            h.record_gave_up(at);
                            h.id().to_string()
                        };
                        info!(household = %household_id, program = %kind, at, "patience expired");
                        env.log(Event::PatienceExpired {
                            time: at,
                            household_id,
                            pending_program: kind,
                        });
                        pending.interrupt().await;

                        let outcome = SearchOutcome::GaveUp {
                            at,
                            duration: at - start,
                            pending: kind,
                        };
                        policy.finish(&household, &outcome);
                        return Ok(outcome);
                    }
                }
            }

            if let Some(timer) = deadline.take() {
                timer.cancel();
            }

            let duration = env.now() - start;
            let funds = funds(&household);
            let target = household.borrow().property().damage_value;
            let outcome = if funds < target {
                SearchOutcome::StillShort {
                    stage: None,
                    duration,
                    funds,
                    shortfall: target - funds,
                }
            } else {
                SearchOutcome::Sufficient { duration, funds }
            };

            policy.finish(&household, &outcome);
            Ok(outcome)
        }
        .boxed_local()
    }
}
