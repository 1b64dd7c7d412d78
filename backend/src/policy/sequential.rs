//! Sequential search: aid, then loan
//!
//! Each program runs to completion before the next is considered, and only
//! while funds are below the stage target. Programs are never interrupted,
//! so a program that never resolves stalls the search.

use super::threshold::cost_target;
use super::{funds, FundingSearchPolicy, RecoveryPolicy, SearchOutcome};
use crate::models::household::SharedHousehold;
use crate::orchestrator::SimulationError;
use crate::programs::{FundingPrograms, ProgramKind};
use futures::future::{FutureExt, LocalBoxFuture};
use tracing::debug;

/// Programs consulted, in order
const STEPS: [ProgramKind; 2] = [ProgramKind::Assistance, ProgramKind::Loan];

pub struct SequentialSearch {
    policy: RecoveryPolicy,
}

impl SequentialSearch {
    pub fn new(policy: RecoveryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RecoveryPolicy {
        &self.policy
    }
}

impl FundingSearchPolicy for SequentialSearch {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn search(
        &self,
        household: SharedHousehold,
        programs: FundingPrograms,
    ) -> LocalBoxFuture<'static, Result<SearchOutcome, SimulationError>> {
        let policy = self.policy.clone();
        let name = self.name();

        async move {
            let env = policy.env().clone();
            let start = policy.begin(&household, name);

            if let Some(outcome) = policy.short_circuit(&household) {
                return Ok(outcome);
            }

            let target = cost_target(household.borrow().property(), policy.stage());

            for kind in STEPS {
                if funds(&household) >= target {
                    debug!(program = %kind, target, "target reached, skipping program");
                    break;
                }
                let resolution = programs.spawn(kind, &env, &household)?.await;
                debug!(program = %kind, ?resolution, "program resolved");
            }

            let duration = env.now() - start;
            let funds = funds(&household);
            let outcome = if funds < target {
                SearchOutcome::StillShort {
                    stage: policy.stage(),
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
