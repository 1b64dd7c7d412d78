//! Home loan sized to the next construction milestone
//!
//! The loan closes the gap between the next milestone's cost and what the
//! household has already been paid:
//!
//! ```text
//! loan = min(max_loan, target − savings − claim payout − assistance payout)
//! ```
//!
//! Savings only count while the plinth is still unbuilt; they are assumed to
//! be spent once construction starts. A non-positive amount means no loan.

use super::claim::ClaimTicket;
use super::{desk_builders, ClaimOutcome, FundingProgram, ProgramDesk, ProgramKind};
use crate::core::money::format_amount;
use crate::models::household::{Household, SharedHousehold};
use crate::sim::{Budget, Environment};
use futures::future::{FutureExt, LocalBoxFuture};
use std::rc::Rc;
use tracing::debug;

#[derive(Debug)]
pub struct HomeLoan {
    /// Largest loan any one household can get; `None` = no cap
    max_loan: Option<i64>,
    budget: Budget,
    desk: ProgramDesk,
}

impl Default for HomeLoan {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HomeLoan {
    pub fn new(max_loan: Option<i64>) -> Self {
        Self {
            max_loan,
            budget: Budget::unlimited(),
            desk: ProgramDesk::default(),
        }
    }

    /// Lending capital (default: unlimited)
    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = budget;
        self
    }

    pub fn max_loan(&self) -> Option<i64> {
        self.max_loan
    }

    /// Loan amount for a household in its current state
    pub fn loan_amount(&self, household: &Household) -> i64 {
        let target = household.property().next_stage_cost();
        let saved = if household.property().progress().plinth {
            0
        } else {
            household.savings()
        };
        let gap = target - saved - household.claim.payout - household.assistance.payout;
        match self.max_loan {
            Some(max) => gap.min(max),
            None => gap,
        }
    }
}

desk_builders!(HomeLoan);

impl FundingProgram for HomeLoan {
    fn kind(&self) -> ProgramKind {
        ProgramKind::Loan
    }

    fn name(&self) -> &str {
        "home loan"
    }

    fn process(
        self: Rc<Self>,
        env: Environment,
        household: SharedHousehold,
    ) -> LocalBoxFuture<'static, ClaimOutcome> {
        async move {
            {
                let h = household.borrow();
                if h.money_to_rebuild() >= h.property().next_stage_cost() {
                    return ClaimOutcome::NotNeeded;
                }
            }

            let ticket = ClaimTicket::submit(&env, &household, ProgramKind::Loan);
            {
                let mut h = household.borrow_mut();
                let entry = format!(
                    "{} submitted a loan application {} days after the event. ",
                    h.name(),
                    ticket.submitted()
                );
                h.tell(entry);
            }

            let officer = self.desk.work(&env).await;
            drop(officer);

            let mut h = household.borrow_mut();
            let requested = self.loan_amount(&h);
            h.loan.requested = requested.max(0);

            if requested <= 0 {
                drop(h);
                return ticket.resolve(ClaimOutcome::declined("payouts already cover the stage"));
            }

            let amount = self.budget.draw(requested);
            h.loan.payout = amount;
            let outcome = if amount > 0 {
                h.take_loan(amount);
                let entry = format!(
                    "{} received a loan for Rs{} {} days after the event. ",
                    h.name(),
                    format_amount(amount),
                    env.now()
                );
                h.tell(entry);
                ClaimOutcome::Paid { amount }
            } else {
                ClaimOutcome::declined("lending capital exhausted")
            };
            drop(h);

            debug!(requested, amount, "loan application resolved");
            ticket.resolve(outcome)
        }
        .boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::property::{Property, Stage};

    fn household() -> Household {
        Household::new("hh", "Asha", Property::new(1_000, 200, 600, 900)).with_savings(50)
    }

    #[test]
    fn test_loan_amount_counts_savings_before_plinth() {
        let loan = HomeLoan::new(None);
        let mut h = household();
        h.assistance.payout = 30;
        assert_eq!(loan.loan_amount(&h), 200 - 50 - 30);
    }

    #[test]
    fn test_loan_amount_ignores_savings_after_plinth() {
        let loan = HomeLoan::new(Some(10_000));
        let mut h = household();
        h.property_mut().progress_mut().complete(Stage::UpToPlinth);
        assert_eq!(loan.loan_amount(&h), 600);
    }

    #[test]
    fn test_loan_amount_capped() {
        let loan = HomeLoan::new(Some(100));
        assert_eq!(loan.loan_amount(&household()), 100);
    }
}
