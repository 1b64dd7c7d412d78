//! Scenario configuration
//!
//! A scenario is loaded from JSON: the search policy, one program per slot
//! (insurance, aid, loan) and the households to run.
//!
//! # Example
//!
//! ```rust
//! use rebuild_funding_core::orchestrator::ScenarioConfig;
//!
//! let config = ScenarioConfig::from_json(r#"{
//!     "rng_seed": 7,
//!     "stage": "Up to Plinth Level",
//!     "policy": { "type": "racing", "search_patience": 30 },
//!     "households": [
//!         { "id": "hh_001", "damage_value": 1000, "plinth_value": 200,
//!           "wall_value": 600, "roof_value": 900, "insurance": 0.5 }
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(config.households.len(), 1);
//! assert!(config.validate().is_ok());
//! ```
//!
//! CRITICAL: All money values are i64 (whole currency units)

use super::error::SimulationError;
use crate::core::time::SimTime;
use crate::models::household::Household;
use crate::models::property::{BuildProgress, Property};
use crate::policy::{
    FundingSearchPolicy, PatienceClock, RacingSearch, RecoveryPolicy, SequentialSearch,
};
use crate::programs::{
    FlatGrant, FundingProgram, FundingPrograms, HomeLoan, Installments, OwnersInsurance,
    ProgramKind, StageGrant,
};
use crate::rng::{DurationDistribution, RngManager};
use crate::sim::{Budget, StaffPool};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::rc::Rc;

fn default_true() -> bool {
    true
}

/// Complete scenario description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Seed for every program's processing-time stream
    #[serde(default)]
    pub rng_seed: u64,

    /// Stage label whose cost is the sequential search target
    /// (`None` or unknown = full damage value)
    #[serde(default)]
    pub stage: Option<String>,

    pub policy: PolicyConfig,

    #[serde(default)]
    pub programs: ProgramsConfig,

    pub households: Vec<HouseholdConfig>,

    /// Whether households keep a narrative
    #[serde(default = "default_true")]
    pub write_story: bool,
}

impl ScenarioConfig {
    /// Parse a JSON scenario
    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        serde_json::from_str(json).map_err(|e| SimulationError::InvalidConfig(e.to_string()))
    }

    /// Check that the scenario can run
    pub fn validate(&self) -> Result<(), SimulationError> {
        let mut seen = HashSet::new();
        for household in &self.households {
            household.validate()?;
            if !seen.insert(household.id.as_str()) {
                return Err(SimulationError::DuplicateHousehold(household.id.clone()));
            }
        }
        self.programs.validate()
    }
}

/// Which search each household runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PolicyConfig {
    Sequential,
    Racing {
        search_patience: SimTime,
        #[serde(default)]
        patience_clock: PatienceClock,
    },
}

impl PolicyConfig {
    pub fn build(&self, policy: RecoveryPolicy) -> Box<dyn FundingSearchPolicy> {
        match self {
            PolicyConfig::Sequential => Box::new(SequentialSearch::new(policy)),
            PolicyConfig::Racing {
                search_patience,
                patience_clock,
            } => Box::new(
                RacingSearch::new(policy, *search_patience).with_patience_clock(*patience_clock),
            ),
        }
    }
}

/// One program per slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramsConfig {
    pub insurance: ProgramConfig,
    pub aid: ProgramConfig,
    pub loan: ProgramConfig,
}

impl Default for ProgramsConfig {
    fn default() -> Self {
        Self {
            insurance: ProgramConfig::OwnersInsurance {
                deductible: 0.0,
                staff: None,
                duration: DurationDistribution::default(),
            },
            aid: ProgramConfig::StageGrant {
                staff: None,
                budget: None,
                installments: Installments::default(),
                duration: DurationDistribution::default(),
            },
            loan: ProgramConfig::HomeLoan {
                staff: None,
                budget: None,
                max_loan: None,
                duration: DurationDistribution::default(),
            },
        }
    }
}

impl ProgramsConfig {
    fn slots(&self) -> [(ProgramKind, &ProgramConfig); 3] {
        [
            (ProgramKind::Insurance, &self.insurance),
            (ProgramKind::Assistance, &self.aid),
            (ProgramKind::Loan, &self.loan),
        ]
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        for (slot, program) in self.slots() {
            program.validate(slot)?;
        }
        Ok(())
    }

    /// Build the programs; each slot draws from its own random stream
    pub fn build(&self, rng_seed: u64) -> FundingPrograms {
        let [insurance, aid, loan] = self.slots().map(|(slot, program)| {
            let stream = slot as u64 + 1;
            program.build(slot, RngManager::derived(rng_seed, stream))
        });
        FundingPrograms::new(insurance, aid, loan)
    }
}

/// A single program's parameters
///
/// `staff: None` = unlimited staff, `budget: None` = unlimited money.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgramConfig {
    OwnersInsurance {
        #[serde(default)]
        deductible: f64,
        #[serde(default)]
        staff: Option<usize>,
        #[serde(default)]
        duration: DurationDistribution,
    },
    StageGrant {
        #[serde(default)]
        staff: Option<usize>,
        #[serde(default)]
        budget: Option<i64>,
        #[serde(default)]
        installments: Installments,
        #[serde(default)]
        duration: DurationDistribution,
    },
    HomeLoan {
        #[serde(default)]
        staff: Option<usize>,
        #[serde(default)]
        budget: Option<i64>,
        #[serde(default)]
        max_loan: Option<i64>,
        #[serde(default)]
        duration: DurationDistribution,
    },
    FlatGrant {
        amount: i64,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        staff: Option<usize>,
        #[serde(default)]
        budget: Option<i64>,
        #[serde(default)]
        duration: DurationDistribution,
    },
}

impl ProgramConfig {
    /// Program family this variant always fills; `None` fits any slot
    fn fixed_kind(&self) -> Option<ProgramKind> {
        match self {
            ProgramConfig::OwnersInsurance { .. } => Some(ProgramKind::Insurance),
            ProgramConfig::StageGrant { .. } => Some(ProgramKind::Assistance),
            ProgramConfig::HomeLoan { .. } => Some(ProgramKind::Loan),
            ProgramConfig::FlatGrant { .. } => None,
        }
    }

    fn staff(&self) -> Option<usize> {
        match self {
            ProgramConfig::OwnersInsurance { staff, .. }
            | ProgramConfig::StageGrant { staff, .. }
            | ProgramConfig::HomeLoan { staff, .. }
            | ProgramConfig::FlatGrant { staff, .. } => *staff,
        }
    }

    fn duration(&self) -> &DurationDistribution {
        match self {
            ProgramConfig::OwnersInsurance { duration, .. }
            | ProgramConfig::StageGrant { duration, .. }
            | ProgramConfig::HomeLoan { duration, .. }
            | ProgramConfig::FlatGrant { duration, .. } => duration,
        }
    }

    pub fn validate(&self, slot: ProgramKind) -> Result<(), SimulationError> {
        if let Some(kind) = self.fixed_kind() {
            if kind != slot {
                return Err(SimulationError::InvalidConfig(format!(
                    "{} slot cannot hold a {} program",
                    slot, kind
                )));
            }
        }
        if self.staff() == Some(0) {
            return Err(SimulationError::InvalidConfig(format!(
                "{} program must have at least one staff member",
                slot
            )));
        }
        self.duration().validate()?;

        let negative = |what: &str, value: Option<i64>| match value {
            Some(v) if v < 0 => Err(SimulationError::InvalidConfig(format!(
                "{} {} must be non-negative, got {}",
                slot, what, v
            ))),
            _ => Ok(()),
        };

        match self {
            ProgramConfig::OwnersInsurance { deductible, .. } => {
                if !(0.0..=1.0).contains(deductible) {
                    return Err(SimulationError::InvalidConfig(format!(
                        "deductible must be in [0, 1], got {}",
                        deductible
                    )));
                }
            }
            ProgramConfig::StageGrant {
                budget,
                installments,
                ..
            } => {
                negative("budget", *budget)?;
                negative("first installment", Some(installments.first))?;
                negative("second installment", Some(installments.second))?;
                negative("third installment", Some(installments.third))?;
            }
            ProgramConfig::HomeLoan {
                budget, max_loan, ..
            } => {
                negative("budget", *budget)?;
                negative("max_loan", *max_loan)?;
            }
            ProgramConfig::FlatGrant { amount, budget, .. } => {
                negative("amount", Some(*amount))?;
                negative("budget", *budget)?;
            }
        }
        Ok(())
    }

    /// Build the program for a slot (assumes `validate` passed)
    pub fn build(&self, slot: ProgramKind, rng: RngManager) -> Rc<dyn FundingProgram> {
        let staff = StaffPool::new(self.staff());
        let duration = self.duration().clone();

        match self {
            ProgramConfig::OwnersInsurance { deductible, .. } => Rc::new(
                OwnersInsurance::new(*deductible)
                    .with_staff(staff)
                    .with_duration(duration)
                    .with_rng(rng),
            ),
            ProgramConfig::StageGrant {
                budget,
                installments,
                ..
            } => Rc::new(
                StageGrant::new(*installments)
                    .with_budget(Budget::new(*budget))
                    .with_staff(staff)
                    .with_duration(duration)
                    .with_rng(rng),
            ),
            ProgramConfig::HomeLoan {
                budget, max_loan, ..
            } => Rc::new(
                HomeLoan::new(*max_loan)
                    .with_budget(Budget::new(*budget))
                    .with_staff(staff)
                    .with_duration(duration)
                    .with_rng(rng),
            ),
            ProgramConfig::FlatGrant {
                amount,
                name,
                budget,
                ..
            } => {
                let name = name.clone().unwrap_or_else(|| format!("{} program", slot));
                Rc::new(
                    FlatGrant::new(slot, name, *amount)
                        .with_budget(Budget::new(*budget))
                        .with_staff(staff)
                        .with_duration(duration)
                        .with_rng(rng),
                )
            }
        }
    }
}

/// One household's starting state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdConfig {
    pub id: String,

    /// Name used in the story (defaults to the id)
    #[serde(default)]
    pub name: Option<String>,

    /// Insurance coverage ratio in [0, 1]; 0 = uninsured
    #[serde(default)]
    pub insurance: f64,

    #[serde(default)]
    pub savings: i64,

    #[serde(default)]
    pub income: i64,

    pub damage_value: i64,
    pub plinth_value: i64,
    pub wall_value: i64,
    pub roof_value: i64,

    /// Replacement value (defaults to damage value)
    #[serde(default)]
    pub value: Option<i64>,

    /// Milestones already rebuilt
    #[serde(default)]
    pub progress: BuildProgress,
}

impl HouseholdConfig {
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.id.is_empty() {
            return Err(SimulationError::InvalidConfig(
                "household id must not be empty".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.insurance) {
            return Err(SimulationError::InvalidConfig(format!(
                "household {}: insurance must be in [0, 1], got {}",
                self.id, self.insurance
            )));
        }
        let money = [
            ("savings", self.savings),
            ("damage_value", self.damage_value),
            ("plinth_value", self.plinth_value),
            ("wall_value", self.wall_value),
            ("roof_value", self.roof_value),
            ("value", self.value.unwrap_or(0)),
        ];
        for (field, amount) in money {
            if amount < 0 {
                return Err(SimulationError::InvalidConfig(format!(
                    "household {}: {} must be non-negative, got {}",
                    self.id, field, amount
                )));
            }
        }
        Ok(())
    }

    pub fn build(&self, write_story: bool) -> Household {
        let mut property = Property::new(
            self.damage_value,
            self.plinth_value,
            self.wall_value,
            self.roof_value,
        )
        .with_progress(self.progress);
        if let Some(value) = self.value {
            property = property.with_value(value);
        }

        let name = self.name.clone().unwrap_or_else(|| self.id.clone());
        Household::new(self.id.clone(), name, property)
            .with_insurance(self.insurance)
            .with_savings(self.savings)
            .with_income(self.income)
            .with_story(write_story)
    }
}
