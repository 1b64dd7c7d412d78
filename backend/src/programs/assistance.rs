//! Public reconstruction grant paid in installments
//!
//! The grant pays one installment per approved milestone: the first once the
//! house is deemed eligible (plinth not yet rebuilt), the second after the
//! plinth, the third after the walls. Payouts are capped by what is left in
//! the program budget.
//!
//! CRITICAL: All money values are i64 (whole currency units)

use super::claim::ClaimTicket;
use super::{desk_builders, ClaimOutcome, FundingProgram, ProgramDesk, ProgramKind};
use crate::core::money::format_amount;
use crate::models::household::SharedHousehold;
use crate::models::property::{InstallmentReceipt, Stage};
use crate::sim::{Budget, Environment};
use futures::future::{FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tracing::debug;

/// Installment amounts by the next milestone to rebuild
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installments {
    /// Paid while the plinth is not yet rebuilt
    pub first: i64,
    /// Paid once the plinth is done
    pub second: i64,
    /// Paid once the walls are done
    pub third: i64,
}

impl Default for Installments {
    fn default() -> Self {
        Self {
            first: 50_000,
            second: 150_000,
            third: 100_000,
        }
    }
}

impl Installments {
    /// Installment due given the next milestone still to rebuild
    ///
    /// # Example
    /// ```
    /// use rebuild_funding_core::programs::Installments;
    /// use rebuild_funding_core::Stage;
    ///
    /// let grant = Installments::default();
    /// assert_eq!(grant.for_next_stage(Some(Stage::UpToPlinth)), 50_000);
    /// assert_eq!(grant.for_next_stage(Some(Stage::Superstructure)), 150_000);
    /// assert_eq!(grant.for_next_stage(None), 100_000);
    /// ```
    pub fn for_next_stage(&self, next: Option<Stage>) -> i64 {
        match next {
            Some(Stage::UpToPlinth) => self.first,
            Some(Stage::Superstructure) => self.second,
            Some(Stage::Roofing) | None => self.third,
        }
    }
}

#[derive(Debug)]
pub struct StageGrant {
    installments: Installments,
    budget: Budget,
    desk: ProgramDesk,
}

impl Default for StageGrant {
    fn default() -> Self {
        Self::new(Installments::default())
    }
}

impl StageGrant {
    pub fn new(installments: Installments) -> Self {
        Self {
            installments,
            budget: Budget::unlimited(),
            desk: ProgramDesk::default(),
        }
    }

    /// Money available to all applicants (default: unlimited)
    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = budget;
        self
    }

    pub fn budget(&self) -> &Budget {
        &self.budget
    }

    pub fn installments(&self) -> Installments {
        self.installments
    }
}

desk_builders!(StageGrant);

impl FundingProgram for StageGrant {
    fn kind(&self) -> ProgramKind {
        ProgramKind::Assistance
    }

    fn name(&self) -> &str {
        "NRA individual assistance"
    }

    fn process(
        self: Rc<Self>,
        env: Environment,
        household: SharedHousehold,
    ) -> LocalBoxFuture<'static, ClaimOutcome> {
        async move {
            if household.borrow().has_full_repair_funds() {
                return ClaimOutcome::NotNeeded;
            }

            let ticket = ClaimTicket::submit(&env, &household, ProgramKind::Assistance);
            {
                let mut h = household.borrow_mut();
                let entry = format!(
                    "{} submitted a request to the NRA {} days after the event. ",
                    h.name(),
                    ticket.submitted()
                );
                h.tell(entry);
            }

            let reviewer = self.desk.work(&env).await;
            drop(reviewer);

            let mut h = household.borrow_mut();
            let next = h.property().progress().next_stage();
            let requested = self.installments.for_next_stage(next);
            h.assistance.requested = requested;

            let payout = self.budget.draw(requested);
            h.assistance.payout = payout;
            let now = env.now();

            let outcome = if payout > 0 {
                h.receive_funds(payout);
                h.property_mut().installments_mut().record(
                    next,
                    InstallmentReceipt {
                        amount: payout,
                        time: now,
                    },
                );
                let entry = if payout == requested {
                    format!(
                        "{} received Rs{} from NRA {} days after the event. ",
                        h.name(),
                        format_amount(payout),
                        now
                    )
                } else {
                    format!(
                        "{} requested Rs{} from NRA but only received Rs{}, {} days after the event. ",
                        h.name(),
                        format_amount(requested),
                        format_amount(payout),
                        now
                    )
                };
                h.tell(entry);
                ClaimOutcome::Paid { amount: payout }
            } else {
                let entry = format!(
                    "{} received no money from NRA because of inadequate funding. ",
                    h.name()
                );
                h.tell(entry);
                ClaimOutcome::declined("grant budget exhausted")
            };
            drop(h);

            debug!(requested, payout, remaining = ?self.budget.level(), "grant installment resolved");
            ticket.resolve(outcome)
        }
        .boxed_local()
    }
}
