//! Shared fixtures for funding search tests

#![allow(dead_code)]

use rebuild_funding_core::programs::FlatGrant;
use rebuild_funding_core::{
    DurationDistribution, FundingProgram, FundingPrograms, FundingSearchPolicy, Household,
    ProgramKind, Property, SearchOutcome, SharedHousehold, Simulation,
};
use std::rc::Rc;

/// Household with the standard cost tiers: damage 1000, plinth 200,
/// walls 600, roof 900
pub fn household(savings: i64) -> Household {
    Household::new("hh_001", "Asha", Property::new(1_000, 200, 600, 900))
        .with_savings(savings)
        .with_story(true)
}

/// Program paying `amount` after `days`
pub fn flat(kind: ProgramKind, amount: i64, days: usize) -> Rc<dyn FundingProgram> {
    Rc::new(
        FlatGrant::new(kind, format!("{} program", kind), amount)
            .with_duration(DurationDistribution::Fixed { days }),
    )
}

/// Three flat programs: (amount, days) per slot
pub fn flat_programs(insurance: (i64, usize), aid: (i64, usize), loan: (i64, usize)) -> FundingPrograms {
    FundingPrograms::new(
        flat(ProgramKind::Insurance, insurance.0, insurance.1),
        flat(ProgramKind::Assistance, aid.0, aid.1),
        flat(ProgramKind::Loan, loan.0, loan.1),
    )
}

/// Run one search to completion; returns its outcome
pub fn run_search(
    sim: &mut Simulation,
    policy: &dyn FundingSearchPolicy,
    household: &SharedHousehold,
    programs: FundingPrograms,
) -> SearchOutcome {
    let mut search = sim
        .spawn(policy.search(Rc::clone(household), programs))
        .unwrap();
    sim.run();
    search
        .try_result()
        .expect("search should finish")
        .expect("search should not error")
}
