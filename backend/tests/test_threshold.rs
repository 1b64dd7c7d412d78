//! Threshold evaluator tests
//!
//! The cost target is a pure function of the property and stage.

use proptest::prelude::*;
use rebuild_funding_core::policy::threshold::{cost_target, cost_target_for_label};
use rebuild_funding_core::{Property, Stage};

fn property() -> Property {
    Property::new(1_000, 200, 600, 900)
}

#[test]
fn test_stage_labels_select_tiers() {
    let p = property();
    assert_eq!(cost_target_for_label(&p, Some("Up to Plinth Level")), 200);
    assert_eq!(cost_target_for_label(&p, Some("Superstructure")), 600);
    assert_eq!(cost_target_for_label(&p, Some("Roofing")), 900);
}

#[test]
fn test_no_stage_targets_full_damage() {
    assert_eq!(cost_target(&property(), None), 1_000);
    assert_eq!(cost_target_for_label(&property(), None), 1_000);
}

#[test]
fn test_label_match_is_exact() {
    // Case and spacing variants are not recognised
    assert_eq!(cost_target_for_label(&property(), Some("roofing")), 1_000);
    assert_eq!(cost_target_for_label(&property(), Some("Up to Plinth")), 1_000);
}

#[test]
fn test_target_ignores_build_progress() {
    let mut p = property();
    p.progress_mut().complete(Stage::UpToPlinth);
    assert_eq!(cost_target(&p, Some(Stage::UpToPlinth)), 200);
}

fn any_stage() -> impl Strategy<Value = Option<Stage>> {
    prop_oneof![
        Just(None),
        Just(Some(Stage::UpToPlinth)),
        Just(Some(Stage::Superstructure)),
        Just(Some(Stage::Roofing)),
    ]
}

proptest! {
    #[test]
    fn prop_cost_target_is_pure(
        damage in 0i64..10_000_000,
        plinth in 0i64..10_000_000,
        wall in 0i64..10_000_000,
        roof in 0i64..10_000_000,
        stage in any_stage(),
    ) {
        let p = Property::new(damage, plinth, wall, roof);
        let first = cost_target(&p, stage);
        let second = cost_target(&p, stage);
        prop_assert_eq!(first, second);
        prop_assert_eq!(p, Property::new(damage, plinth, wall, roof));
    }

    #[test]
    fn prop_unknown_labels_fall_back_to_damage(
        label in "[a-z ]{0,24}",
        damage in 0i64..10_000_000,
    ) {
        let p = Property::new(damage, 1, 2, 3);
        prop_assert_eq!(cost_target_for_label(&p, Some(&label)), damage);
    }

    #[test]
    fn prop_target_is_one_of_the_tiers(
        damage in 0i64..1_000_000,
        plinth in 0i64..1_000_000,
        stage in any_stage(),
    ) {
        let p = Property::new(damage, plinth, plinth + 1, plinth + 2);
        let target = cost_target(&p, stage);
        prop_assert!([damage, plinth, plinth + 1, plinth + 2].contains(&target));
    }
}
