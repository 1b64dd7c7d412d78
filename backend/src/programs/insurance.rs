//! Owner's hazard insurance
//!
//! The payout covers the damage, not the full coverage, less a deductible:
//!
//! ```text
//! deductible = property value × coverage ratio × deductible ratio
//! payout     = damage value − deductible
//! ```
//!
//! Uninsured households are declined without a claim being filed. A claim
//! whose deductible exceeds the damage is closed on the spot.

use super::claim::{log_declined, ClaimTicket};
use super::{desk_builders, ClaimOutcome, FundingProgram, ProgramDesk, ProgramKind};
use crate::core::money::format_amount;
use crate::models::household::SharedHousehold;
use crate::sim::Environment;
use futures::future::{FutureExt, LocalBoxFuture};
use std::rc::Rc;
use tracing::debug;

#[derive(Debug, Default)]
pub struct OwnersInsurance {
    /// Ratio of the covered value the owner pays first, in [0, 1]
    deductible: f64,
    desk: ProgramDesk,
}

impl OwnersInsurance {
    pub fn new(deductible: f64) -> Self {
        Self {
            deductible,
            desk: ProgramDesk::default(),
        }
    }

    pub fn deductible(&self) -> f64 {
        self.deductible
    }
}

desk_builders!(OwnersInsurance);

impl FundingProgram for OwnersInsurance {
    fn kind(&self) -> ProgramKind {
        ProgramKind::Insurance
    }

    fn name(&self) -> &str {
        "owners insurance"
    }

    fn process(
        self: Rc<Self>,
        env: Environment,
        household: SharedHousehold,
    ) -> LocalBoxFuture<'static, ClaimOutcome> {
        async move {
            let (insured, deductible, damage) = {
                let h = household.borrow();
                let deductible = (h.property().value() as f64 * h.insurance() * self.deductible)
                    .round() as i64;
                (h.is_insured(), deductible, h.property().damage_value)
            };

            if !insured {
                let household_id = {
                    let mut h = household.borrow_mut();
                    let entry = format!("{} has no hazard insurance. ", h.name());
                    h.tell(entry);
                    h.id().to_string()
                };
                log_declined(&env, household_id, ProgramKind::Insurance, "uninsured".into());
                return ClaimOutcome::declined("uninsured");
            }

            let ticket = ClaimTicket::submit(&env, &household, ProgramKind::Insurance);
            {
                let mut h = household.borrow_mut();
                h.claim.requested = damage;
                let entry = format!(
                    "{} submitted an insurance claim {} days after the event. ",
                    h.name(),
                    ticket.submitted()
                );
                h.tell(entry);
            }

            if damage < deductible {
                {
                    let mut h = household.borrow_mut();
                    let entry = format!(
                        "{}'s insurance deductible is greater than the value of damage. ",
                        h.name()
                    );
                    h.tell(entry);
                }
                return ticket.resolve(ClaimOutcome::declined("deductible exceeds damage"));
            }

            let adjuster = self.desk.work(&env).await;

            let payout = damage - deductible;
            {
                let mut h = household.borrow_mut();
                h.claim.payout = payout;
                h.receive_funds(payout);
                let entry = format!(
                    "{} received a ${} insurance payout {} days after the event. ",
                    h.name(),
                    format_amount(payout),
                    env.now()
                );
                h.tell(entry);
            }
            drop(adjuster);

            debug!(deductible, payout, "insurance claim settled");
            ticket.resolve(ClaimOutcome::Paid { amount: payout })
        }
        .boxed_local()
    }
}
