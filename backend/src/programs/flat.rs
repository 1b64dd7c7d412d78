//! Fixed-amount program, used for scripted scenarios
//!
//! Always applies when invoked, pays `amount` (capped by budget) after the
//! processing time. In the loan slot the payout is booked as debt.

use super::claim::ClaimTicket;
use super::{desk_builders, ClaimOutcome, FundingProgram, ProgramDesk, ProgramKind};
use crate::core::money::format_amount;
use crate::models::household::SharedHousehold;
use crate::sim::{Budget, Environment};
use futures::future::{FutureExt, LocalBoxFuture};
use std::rc::Rc;

#[derive(Debug)]
pub struct FlatGrant {
    kind: ProgramKind,
    name: String,
    amount: i64,
    budget: Budget,
    desk: ProgramDesk,
}

impl FlatGrant {
    /// # Example
    /// ```
    /// use rebuild_funding_core::programs::{FlatGrant, FundingProgram, ProgramKind};
    ///
    /// let aid = FlatGrant::new(ProgramKind::Assistance, "relief fund", 150);
    /// assert_eq!(aid.kind(), ProgramKind::Assistance);
    /// assert_eq!(aid.amount(), 150);
    /// ```
    pub fn new(kind: ProgramKind, name: impl Into<String>, amount: i64) -> Self {
        Self {
            kind,
            name: name.into(),
            amount,
            budget: Budget::unlimited(),
            desk: ProgramDesk::default(),
        }
    }

    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = budget;
        self
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }
}

desk_builders!(FlatGrant);

impl FundingProgram for FlatGrant {
    fn kind(&self) -> ProgramKind {
        self.kind
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn process(
        self: Rc<Self>,
        env: Environment,
        household: SharedHousehold,
    ) -> LocalBoxFuture<'static, ClaimOutcome> {
        async move {
            let ticket = ClaimTicket::submit(&env, &household, self.kind);
            {
                let mut h = household.borrow_mut();
                h.record_mut(self.kind).requested = self.amount;
                let entry = format!(
                    "{} applied to the {} {} days after the event. ",
                    h.name(),
                    self.name,
                    ticket.submitted()
                );
                h.tell(entry);
            }

            let staff = self.desk.work(&env).await;
            drop(staff);

            let paid = self.budget.draw(self.amount);
            let mut h = household.borrow_mut();
            h.record_mut(self.kind).payout = paid;
            let outcome = if paid > 0 {
                if self.kind == ProgramKind::Loan {
                    h.take_loan(paid);
                } else {
                    h.receive_funds(paid);
                }
                let entry = format!(
                    "{} received {} from the {} {} days after the event. ",
                    h.name(),
                    format_amount(paid),
                    self.name,
                    env.now()
                );
                h.tell(entry);
                ClaimOutcome::Paid { amount: paid }
            } else {
                ClaimOutcome::declined(format!("{} paid nothing", self.name))
            };
            drop(h);

            ticket.resolve(outcome)
        }
        .boxed_local()
    }
}
