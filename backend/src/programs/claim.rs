//! Claim bookkeeping shared by every program
//!
//! A [`ClaimTicket`] is opened when a household submits a request and closed
//! when the program resolves it. A ticket dropped while still open means
//! the program process was interrupted.

use super::{ClaimOutcome, ProgramKind};
use crate::core::time::SimTime;
use crate::models::event::Event;
use crate::models::household::SharedHousehold;
use crate::sim::Environment;
use tracing::{debug, info};
use uuid::Uuid;

/// An open request to a funding program
pub struct ClaimTicket {
    env: Environment,
    household: SharedHousehold,
    kind: ProgramKind,
    claim_id: Uuid,
    submitted: SimTime,
    open: bool,
}

impl ClaimTicket {
    /// Record the submission (`put` time) and log it
    pub fn submit(env: &Environment, household: &SharedHousehold, kind: ProgramKind) -> Self {
        let now = env.now();
        let claim_id = Uuid::new_v4();

        let household_id = {
            let mut h = household.borrow_mut();
            h.record_mut(kind).put = Some(now);
            h.id().to_string()
        };

        debug!(household = %household_id, program = %kind, %claim_id, "request submitted");
        env.log(Event::ClaimSubmitted {
            time: now,
            household_id,
            program: kind,
            claim_id,
        });

        Self {
            env: env.clone(),
            household: household.clone(),
            kind,
            claim_id,
            submitted: now,
            open: true,
        }
    }

    pub fn claim_id(&self) -> Uuid {
        self.claim_id
    }

    pub fn submitted(&self) -> SimTime {
        self.submitted
    }

    /// Close the ticket: record the `get` time and log the resolution
    pub fn resolve(mut self, outcome: ClaimOutcome) -> ClaimOutcome {
        self.open = false;
        let now = self.env.now();

        let household_id = {
            let mut h = self.household.borrow_mut();
            h.record_mut(self.kind).get = Some(now);
            h.id().to_string()
        };

        match &outcome {
            ClaimOutcome::Paid { amount } => {
                debug!(household = %household_id, program = %self.kind, amount, "request paid");
                self.env.log(Event::ClaimPaid {
                    time: now,
                    household_id,
                    program: self.kind,
                    claim_id: self.claim_id,
                    amount: *amount,
                });
            }
            ClaimOutcome::Declined { reason } => {
                log_declined(&self.env, household_id, self.kind, reason.clone());
            }
            ClaimOutcome::NotNeeded => {}
        }

        outcome
    }
}

impl Drop for ClaimTicket {
    fn drop(&mut self) {
        if !self.open {
            return;
        }

        let now = self.env.now();
        let waited = now.saturating_sub(self.submitted);

        let Ok(mut h) = self.household.try_borrow_mut() else {
            return;
        };
        let entry = format!(
            "{} gave up during the {} process after a {} day search for money. ",
            h.name(),
            self.kind.process_label(),
            waited
        );
        h.tell(entry);
        let household_id = h.id().to_string();
        drop(h);

        info!(household = %household_id, program = %self.kind, waited, "request interrupted");
        self.env.log(Event::ClaimInterrupted {
            time: now,
            household_id,
            program: self.kind,
            claim_id: self.claim_id,
            waited,
        });
    }
}

/// Log a request that resolved without payment
pub(crate) fn log_declined(
    env: &Environment,
    household_id: String,
    kind: ProgramKind,
    reason: String,
) {
    debug!(household = %household_id, program = %kind, %reason, "request declined");
    env.log(Event::ClaimDeclined {
        time: env.now(),
        household_id,
        program: kind,
        reason,
    });
}
