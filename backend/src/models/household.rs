//! Household (entity) model
//!
//! An owner-occupier household searching for money to rebuild its home.
//! Each household has:
//! - Accumulated funds (`money_to_rebuild`, initialised to savings)
//! - Insurance coverage ratio (> 0 means insured)
//! - The damaged property with its stage cost tiers
//! - An append-only narrative (story) of what happened
//! - Per-program request/receipt records
//!
//! # Ownership
//!
//! Households are shared between the search process and the funding-program
//! processes it spawns through [`SharedHousehold`]. The executor is
//! single-threaded and no borrow is ever held across a suspension point, so
//! at most one writer touches the household at a time.
//!
//! CRITICAL: All money values are i64 (whole currency units)

use crate::core::time::SimTime;
use crate::models::property::Property;
use crate::programs::ProgramKind;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Household handle shared across simulation processes
pub type SharedHousehold = Rc<RefCell<Household>>;

/// Append-only narrative of a household's recovery
///
/// When story writing is disabled, appends are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Story {
    enabled: bool,
    entries: Vec<String>,
}

impl Story {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Append one entry (no-op when disabled)
    pub fn append(&mut self, entry: impl Into<String>) {
        if self.enabled {
            self.entries.push(entry.into());
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Join all entries into a single paragraph
    pub fn to_text(&self) -> String {
        self.entries.concat()
    }
}

/// Request/receipt bookkeeping for one funding program family
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramRecord {
    /// Day the request was submitted
    pub put: Option<SimTime>,

    /// Day the request was resolved
    pub get: Option<SimTime>,

    /// Amount requested
    pub requested: i64,

    /// Amount actually paid out
    pub payout: i64,
}

/// Represents a disaster-affected household
///
/// # Example
/// ```
/// use rebuild_funding_core::{Household, Property};
///
/// let property = Property::new(1_000, 200, 600, 900);
/// let mut household = Household::new("hh_001", "Asha", property)
///     .with_savings(150)
///     .with_story(true);
///
/// assert_eq!(household.money_to_rebuild(), 150);
/// household.receive_funds(100);
/// assert_eq!(household.money_to_rebuild(), 250);
/// assert!(!household.has_full_repair_funds());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Household {
    /// Unique household identifier
    id: String,

    /// Display name used in the narrative
    name: String,

    /// Insurance coverage ratio in [0, 1]; 0 = uninsured
    insurance: f64,

    /// Savings available at the start of recovery
    savings: i64,

    /// Annual income (informational)
    income: i64,

    /// Funds accumulated for rebuilding
    money_to_rebuild: i64,

    /// Outstanding loan debt
    debt: i64,

    /// The damaged home
    property: Property,

    /// Narrative of recovery events
    story: Story,

    /// Day the household last abandoned a funding search
    gave_up_funding_search: Option<SimTime>,

    /// Insurance claim bookkeeping
    pub claim: ProgramRecord,

    /// Public assistance bookkeeping
    pub assistance: ProgramRecord,

    /// Loan bookkeeping
    pub loan: ProgramRecord,
}

impl Household {
    /// Create an uninsured household with no savings and story writing off
    pub fn new(id: impl Into<String>, name: impl Into<String>, property: Property) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            insurance: 0.0,
            savings: 0,
            income: 0,
            money_to_rebuild: 0,
            debt: 0,
            property,
            story: Story::new(false),
            gave_up_funding_search: None,
            claim: ProgramRecord::default(),
            assistance: ProgramRecord::default(),
            loan: ProgramRecord::default(),
        }
    }

    /// Set savings; funds on hand start equal to savings
    pub fn with_savings(mut self, savings: i64) -> Self {
        assert!(savings >= 0, "savings must be non-negative");
        self.savings = savings;
        self.money_to_rebuild = savings;
        self
    }

    /// Set insurance coverage ratio
    pub fn with_insurance(mut self, coverage: f64) -> Self {
        self.insurance = coverage;
        self
    }

    pub fn with_income(mut self, income: i64) -> Self {
        self.income = income;
        self
    }

    /// Enable or disable narrative writing
    pub fn with_story(mut self, write_story: bool) -> Self {
        self.story = Story::new(write_story);
        self
    }

    /// Wrap into a handle that processes can share
    pub fn into_shared(self) -> SharedHousehold {
        Rc::new(RefCell::new(self))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn insurance(&self) -> f64 {
        self.insurance
    }

    pub fn is_insured(&self) -> bool {
        self.insurance > 0.0
    }

    pub fn savings(&self) -> i64 {
        self.savings
    }

    pub fn income(&self) -> i64 {
        self.income
    }

    pub fn money_to_rebuild(&self) -> i64 {
        self.money_to_rebuild
    }

    pub fn debt(&self) -> i64 {
        self.debt
    }

    pub fn property(&self) -> &Property {
        &self.property
    }

    pub fn property_mut(&mut self) -> &mut Property {
        &mut self.property
    }

    pub fn story(&self) -> &Story {
        &self.story
    }

    pub fn gave_up_funding_search(&self) -> Option<SimTime> {
        self.gave_up_funding_search
    }

    /// Whether funds already cover the full repair cost
    pub fn has_full_repair_funds(&self) -> bool {
        self.money_to_rebuild >= self.property.damage_value
    }

    /// Add money received from a funding program
    ///
    /// # Panics
    /// Panics on a negative amount; funds only ever grow during a search.
    pub fn receive_funds(&mut self, amount: i64) {
        assert!(amount >= 0, "received funds must be non-negative");
        self.money_to_rebuild += amount;
    }

    /// Add a loan: raises both funds and debt
    pub fn take_loan(&mut self, amount: i64) {
        self.receive_funds(amount);
        self.debt += amount;
    }

    /// Bookkeeping record for a program family
    pub fn record(&self, kind: ProgramKind) -> &ProgramRecord {
        match kind {
            ProgramKind::Insurance => &self.claim,
            ProgramKind::Assistance => &self.assistance,
            ProgramKind::Loan => &self.loan,
        }
    }

    pub fn record_mut(&mut self, kind: ProgramKind) -> &mut ProgramRecord {
        match kind {
            ProgramKind::Insurance => &mut self.claim,
            ProgramKind::Assistance => &mut self.assistance,
            ProgramKind::Loan => &mut self.loan,
        }
    }

    /// Record the day the household abandoned its funding search
    pub fn record_gave_up(&mut self, time: SimTime) {
        self.gave_up_funding_search = Some(time);
    }

    /// Append a narrative entry
    pub fn tell(&mut self, entry: impl Into<String>) {
        self.story.append(entry);
    }
}
