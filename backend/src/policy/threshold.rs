//! Threshold evaluator
//!
//! Maps a construction stage to the funds a household needs before that
//! stage can be built. Without a stage the target is the full repair cost.

use crate::models::property::{Property, Stage};

/// Cost target for a stage; `None` means full damage value
///
/// # Example
/// ```
/// use rebuild_funding_core::policy::threshold::cost_target;
/// use rebuild_funding_core::{Property, Stage};
///
/// let property = Property::new(1_000, 200, 600, 900);
/// assert_eq!(cost_target(&property, Some(Stage::UpToPlinth)), 200);
/// assert_eq!(cost_target(&property, None), 1_000);
/// ```
pub fn cost_target(property: &Property, stage: Option<Stage>) -> i64 {
    match stage {
        Some(stage) => property.stage_cost(stage),
        None => property.damage_value,
    }
}

/// Cost target for a stage label
///
/// Unrecognised labels fall back to the full damage value; this is the
/// policy default, not an error.
pub fn cost_target_for_label(property: &Property, label: Option<&str>) -> i64 {
    cost_target(property, label.and_then(Stage::from_label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_stage_maps_to_its_tier() {
        let property = Property::new(1_000, 200, 600, 900);
        assert_eq!(cost_target(&property, Some(Stage::UpToPlinth)), 200);
        assert_eq!(cost_target(&property, Some(Stage::Superstructure)), 600);
        assert_eq!(cost_target(&property, Some(Stage::Roofing)), 900);
    }

    #[test]
    fn test_unknown_label_falls_back_to_damage() {
        let property = Property::new(1_000, 200, 600, 900);
        assert_eq!(cost_target_for_label(&property, Some("Painting")), 1_000);
        assert_eq!(cost_target_for_label(&property, None), 1_000);
        assert_eq!(cost_target_for_label(&property, Some("Roofing")), 900);
    }
}
