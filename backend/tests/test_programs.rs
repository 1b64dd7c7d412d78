//! Funding program tests
//!
//! Each program is run as a process on its own; searches are tested
//! separately.

mod common;

use rebuild_funding_core::programs::{HomeLoan, OwnersInsurance, StageGrant};
use rebuild_funding_core::sim::{Budget, StaffPool};
use rebuild_funding_core::{
    ClaimOutcome, DurationDistribution, Event, FundingProgram, Household, InstallmentReceipt,
    ProgramKind, Property, SharedHousehold, Simulation, Stage,
};
use std::rc::Rc;

fn fixed(days: usize) -> DurationDistribution {
    DurationDistribution::Fixed { days }
}

/// Run a program for one household to completion
fn run_program<P: FundingProgram + 'static>(
    sim: &mut Simulation,
    program: P,
    household: &SharedHousehold,
) -> ClaimOutcome {
    let program = Rc::new(program);
    let mut process = sim
        .spawn(program.process(sim.env().clone(), Rc::clone(household)))
        .unwrap();
    sim.run();
    process.try_result().expect("program should resolve")
}

// ============================================================================
// Owner's insurance
// ============================================================================

#[test]
fn test_uninsured_household_is_declined_without_claim() {
    let mut sim = Simulation::new();
    let household = common::household(0).into_shared();

    let outcome = run_program(&mut sim, OwnersInsurance::new(0.1), &household);

    assert!(matches!(outcome, ClaimOutcome::Declined { .. }));
    let h = household.borrow();
    assert_eq!(h.claim.put, None, "no claim filed");
    assert!(h.story().to_text().contains("Asha has no hazard insurance."));
    assert!(sim.env().event_log().events_of_type("ClaimSubmitted").is_empty());
}

#[test]
fn test_insurance_pays_damage_less_deductible() {
    let mut sim = Simulation::new();
    let household = common::household(0).with_insurance(0.5).into_shared();

    // deductible = 1000 value * 0.5 coverage * 0.1 = 50
    let insurer = OwnersInsurance::new(0.1).with_duration(fixed(10));
    let outcome = run_program(&mut sim, insurer, &household);

    assert_eq!(outcome, ClaimOutcome::Paid { amount: 950 });
    let h = household.borrow();
    assert_eq!(h.money_to_rebuild(), 950);
    assert_eq!(h.claim.put, Some(0));
    assert_eq!(h.claim.get, Some(10));
    assert_eq!(h.claim.payout, 950);
    assert!(h
        .story()
        .to_text()
        .contains("Asha received a $950 insurance payout 10 days after the event."));
}

#[test]
fn test_deductible_above_damage_closes_claim_immediately() {
    let mut sim = Simulation::new();
    let property = Property::new(1_000, 200, 600, 900).with_value(100_000);
    let household = Household::new("hh_001", "Asha", property)
        .with_insurance(1.0)
        .with_story(true)
        .into_shared();

    let insurer = OwnersInsurance::new(0.5).with_duration(fixed(30));
    let outcome = run_program(&mut sim, insurer, &household);

    assert!(matches!(outcome, ClaimOutcome::Declined { .. }));
    assert_eq!(sim.now(), 0, "no processing wait");
    let h = household.borrow();
    assert_eq!(h.money_to_rebuild(), 0);
    assert_eq!(h.claim.get, Some(0));
    assert!(h.story().to_text().contains("deductible is greater than the value of damage"));
}

#[test]
fn test_single_adjuster_serves_claims_in_order() {
    let mut sim = Simulation::new();
    let insurer = Rc::new(
        OwnersInsurance::new(0.0)
            .with_staff(StaffPool::new(Some(1)))
            .with_duration(fixed(10)),
    );

    let first = common::household(0).with_insurance(1.0).into_shared();
    let second = Household::new("hh_002", "Bikash", Property::new(1_000, 200, 600, 900))
        .with_insurance(1.0)
        .into_shared();

    for household in [&first, &second] {
        sim.spawn(Rc::clone(&insurer).process(sim.env().clone(), Rc::clone(household)))
            .unwrap();
    }
    sim.run();

    assert_eq!(first.borrow().claim.get, Some(10));
    assert_eq!(second.borrow().claim.put, Some(0));
    assert_eq!(second.borrow().claim.get, Some(20));
}

// ============================================================================
// Staged grant
// ============================================================================

#[test]
fn test_grant_pays_first_installment_before_plinth() {
    let mut sim = Simulation::new();
    let household = Household::new("hh_001", "Asha", Property::new(600_000, 200_000, 400_000, 500_000))
        .with_story(true)
        .into_shared();

    let grant = StageGrant::default().with_duration(fixed(30));
    let outcome = run_program(&mut sim, grant, &household);

    assert_eq!(outcome, ClaimOutcome::Paid { amount: 50_000 });
    let h = household.borrow();
    assert_eq!(h.assistance.requested, 50_000);
    assert_eq!(h.assistance.get, Some(30));
    assert_eq!(
        h.property().installments().first,
        Some(InstallmentReceipt {
            amount: 50_000,
            time: 30
        })
    );
    assert_eq!(h.property().installments().second, None);
    assert!(h
        .story()
        .to_text()
        .contains("Asha received Rs50,000 from NRA 30 days after the event."));
}

#[test]
fn test_grant_installment_follows_build_progress() {
    let mut sim = Simulation::new();
    let mut household = Household::new("hh_001", "Asha", Property::new(600_000, 200_000, 400_000, 500_000));
    household.property_mut().progress_mut().complete(Stage::UpToPlinth);
    let household = household.into_shared();

    let outcome = run_program(&mut sim, StageGrant::default(), &household);
    assert_eq!(outcome, ClaimOutcome::Paid { amount: 150_000 });

    let installments = *household.borrow().property().installments();
    assert_eq!(installments.first, None);
    assert_eq!(
        installments.second,
        Some(InstallmentReceipt {
            amount: 150_000,
            time: 0
        })
    );
}

#[test]
fn test_grant_budget_caps_then_runs_out() {
    let mut sim = Simulation::new();
    let grant = Rc::new(StageGrant::default().with_budget(Budget::new(Some(30_000))));

    let first = common::household(0).into_shared();
    let second = Household::new("hh_002", "Bikash", Property::new(1_000, 200, 600, 900))
        .with_story(true)
        .into_shared();

    let mut a = sim
        .spawn(Rc::clone(&grant).process(sim.env().clone(), Rc::clone(&first)))
        .unwrap();
    let mut b = sim
        .spawn(Rc::clone(&grant).process(sim.env().clone(), Rc::clone(&second)))
        .unwrap();
    sim.run();

    assert_eq!(a.try_result(), Some(ClaimOutcome::Paid { amount: 30_000 }));
    assert!(matches!(b.try_result(), Some(ClaimOutcome::Declined { .. })));
    assert_eq!(
        first.borrow().property().installments().first.map(|r| r.amount),
        Some(30_000)
    );
    assert_eq!(*second.borrow().property().installments(), Default::default());
    assert_eq!(grant.budget().level(), Some(0));
    assert!(first.borrow().story().to_text().contains("but only received Rs30,000"));
    assert!(second
        .borrow()
        .story()
        .to_text()
        .contains("received no money from NRA because of inadequate funding"));
}

#[test]
fn test_grant_not_needed_when_repair_covered() {
    let mut sim = Simulation::new();
    let household = common::household(1_000).into_shared();

    let outcome = run_program(&mut sim, StageGrant::default(), &household);

    assert_eq!(outcome, ClaimOutcome::NotNeeded);
    assert_eq!(household.borrow().assistance.put, None);
}

// ============================================================================
// Home loan
// ============================================================================

#[test]
fn test_loan_closes_gap_to_next_stage() {
    let mut sim = Simulation::new();
    let mut household =
        Household::new("hh_001", "Asha", Property::new(1_000_000, 200_000, 600_000, 900_000))
            .with_savings(20_000)
            .with_story(true);
    household.assistance.payout = 50_000;
    household.receive_funds(50_000);
    let household = household.into_shared();

    let loan = HomeLoan::new(Some(500_000)).with_duration(fixed(14));
    let outcome = run_program(&mut sim, loan, &household);

    // 200,000 plinth - 20,000 savings - 50,000 grant
    assert_eq!(outcome, ClaimOutcome::Paid { amount: 130_000 });
    let h = household.borrow();
    assert_eq!(h.debt(), 130_000);
    assert_eq!(h.money_to_rebuild(), 200_000);
    assert_eq!(h.loan.get, Some(14));
    assert!(h
        .story()
        .to_text()
        .contains("Asha received a loan for Rs130,000 14 days after the event."));
}

#[test]
fn test_loan_not_needed_once_stage_funded() {
    let mut sim = Simulation::new();
    let household = common::household(250).into_shared();

    let outcome = run_program(&mut sim, HomeLoan::default(), &household);

    assert_eq!(outcome, ClaimOutcome::NotNeeded);
    assert_eq!(household.borrow().debt(), 0);
}

// ============================================================================
// Interruption
// ============================================================================

#[test]
fn test_interrupted_claim_tells_story_and_keeps_funds() {
    let mut sim = Simulation::new();
    let env = sim.env().clone();
    let household = common::household(0).with_insurance(1.0).into_shared();
    let insurer = Rc::new(OwnersInsurance::new(0.0).with_duration(fixed(30)));

    let target = Rc::clone(&household);
    sim.spawn(async move {
        let claim = env
            .process(insurer.process(env.clone(), target))
            .unwrap();
        env.timeout(4).await;
        claim.interrupt().await;
    })
    .unwrap();

    assert_eq!(sim.run(), 4);

    let h = household.borrow();
    assert_eq!(h.money_to_rebuild(), 0);
    assert_eq!(h.claim.get, None);
    assert!(h
        .story()
        .to_text()
        .ends_with("Asha gave up during the insurance claim process after a 4 day search for money. "));

    let log = sim.env().event_log();
    let interrupted = log.events_of_type("ClaimInterrupted");
    assert_eq!(interrupted.len(), 1);
    assert!(matches!(
        interrupted[0],
        Event::ClaimInterrupted {
            time: 4,
            program: ProgramKind::Insurance,
            waited: 4,
            ..
        }
    ));
}
