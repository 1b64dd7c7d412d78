//! Property model
//!
//! A damaged home with cumulative cost tiers for each construction milestone:
//! - `plinth_value`: cost to rebuild up to plinth (foundation) level
//! - `wall_value`: cost through the superstructure (walls)
//! - `roof_value`: cost through roofing
//! - `damage_value`: full repair cost
//!
//! The ordering `plinth <= wall <= roof <= damage` is assumed by stage logic
//! but deliberately not enforced here.
//!
//! CRITICAL: All money values are i64 (whole currency units)

use crate::core::time::SimTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when parsing an unknown stage label
#[derive(Debug, Error, PartialEq)]
#[error("Unknown construction stage: {0:?}")]
pub struct StageParseError(pub String);

/// Construction milestone with an intermediate cost target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Foundation work ("Up to Plinth Level")
    #[serde(rename = "Up to Plinth Level")]
    UpToPlinth,

    /// Walls ("Superstructure")
    Superstructure,

    /// Roof ("Roofing")
    Roofing,
}

impl Stage {
    /// All stages in construction order
    pub const ALL: [Stage; 3] = [Stage::UpToPlinth, Stage::Superstructure, Stage::Roofing];

    /// Human-readable label, as used in house-type catalogues
    pub fn label(&self) -> &'static str {
        match self {
            Stage::UpToPlinth => "Up to Plinth Level",
            Stage::Superstructure => "Superstructure",
            Stage::Roofing => "Roofing",
        }
    }

    /// Parse an exact stage label; anything else is `None`
    ///
    /// # Example
    /// ```
    /// use rebuild_funding_core::Stage;
    ///
    /// assert_eq!(Stage::from_label("Roofing"), Some(Stage::Roofing));
    /// assert_eq!(Stage::from_label("Painting"), None);
    /// ```
    pub fn from_label(label: &str) -> Option<Stage> {
        Stage::ALL.into_iter().find(|stage| stage.label() == label)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Stage {
    type Err = StageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::from_label(s).ok_or_else(|| StageParseError(s.to_string()))
    }
}

/// Which construction milestones have already been rebuilt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildProgress {
    pub plinth: bool,
    pub walls: bool,
    pub roof: bool,
}

impl BuildProgress {
    /// First milestone not yet rebuilt, or `None` when the house is complete
    pub fn next_stage(&self) -> Option<Stage> {
        if !self.plinth {
            Some(Stage::UpToPlinth)
        } else if !self.walls {
            Some(Stage::Superstructure)
        } else if !self.roof {
            Some(Stage::Roofing)
        } else {
            None
        }
    }

    /// Mark a milestone as rebuilt
    pub fn complete(&mut self, stage: Stage) {
        match stage {
            Stage::UpToPlinth => self.plinth = true,
            Stage::Superstructure => self.walls = true,
            Stage::Roofing => self.roof = true,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.plinth && self.walls && self.roof
    }
}

/// A grant installment paid toward a milestone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentReceipt {
    pub amount: i64,
    pub time: SimTime,
}

/// Grant installments received, one slot per milestone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentReceipts {
    /// Paid while the plinth was unbuilt
    pub first: Option<InstallmentReceipt>,
    /// Paid once the plinth was done
    pub second: Option<InstallmentReceipt>,
    /// Paid once the walls were done
    pub third: Option<InstallmentReceipt>,
}

impl InstallmentReceipts {
    /// Record an installment against the milestone it was paid for
    pub fn record(&mut self, next: Option<Stage>, receipt: InstallmentReceipt) {
        match next {
            Some(Stage::UpToPlinth) => self.first = Some(receipt),
            Some(Stage::Superstructure) => self.second = Some(receipt),
            Some(Stage::Roofing) | None => self.third = Some(receipt),
        }
    }
}

/// A damaged residential property
///
/// # Example
/// ```
/// use rebuild_funding_core::{Property, Stage};
///
/// let property = Property::new(1_000, 200, 600, 900);
/// assert_eq!(property.stage_cost(Stage::Superstructure), 600);
/// assert_eq!(property.value(), 1_000); // replacement value defaults to damage
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Full repair cost
    pub damage_value: i64,

    /// Cumulative cost up to plinth level
    pub plinth_value: i64,

    /// Cumulative cost through the superstructure
    pub wall_value: i64,

    /// Cumulative cost through roofing
    pub roof_value: i64,

    /// Replacement value (basis for insurance deductibles)
    value: i64,

    /// Milestones already rebuilt
    progress: BuildProgress,

    /// Grant installments received so far
    #[serde(default)]
    installments: InstallmentReceipts,
}

impl Property {
    /// Create a property from its cost tiers; replacement value = damage value
    pub fn new(damage_value: i64, plinth_value: i64, wall_value: i64, roof_value: i64) -> Self {
        Self {
            damage_value,
            plinth_value,
            wall_value,
            roof_value,
            value: damage_value,
            progress: BuildProgress::default(),
            installments: InstallmentReceipts::default(),
        }
    }

    /// Override the replacement value
    pub fn with_value(mut self, value: i64) -> Self {
        self.value = value;
        self
    }

    /// Start from a partially rebuilt state
    pub fn with_progress(mut self, progress: BuildProgress) -> Self {
        self.progress = progress;
        self
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn progress(&self) -> BuildProgress {
        self.progress
    }

    pub fn progress_mut(&mut self) -> &mut BuildProgress {
        &mut self.progress
    }

    pub fn installments(&self) -> &InstallmentReceipts {
        &self.installments
    }

    pub fn installments_mut(&mut self) -> &mut InstallmentReceipts {
        &mut self.installments
    }

    /// Cost tier for a milestone
    pub fn stage_cost(&self, stage: Stage) -> i64 {
        match stage {
            Stage::UpToPlinth => self.plinth_value,
            Stage::Superstructure => self.wall_value,
            Stage::Roofing => self.roof_value,
        }
    }

    /// Cost of the next milestone still to rebuild (roof cost once complete)
    pub fn next_stage_cost(&self) -> i64 {
        self.stage_cost(self.progress.next_stage().unwrap_or(Stage::Roofing))
    }
}
