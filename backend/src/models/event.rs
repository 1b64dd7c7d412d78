//! Event logging for simulation replay and auditing.
//!
//! This module defines the Event enum which captures every significant step
//! of a funding search. Events enable:
//! - Debugging (understand which program resolved when)
//! - Auditing (verify that losers of a race were cancelled)
//! - Analysis (extract waiting times per program)
//!
//! # Event Types
//!
//! - **Search**: a household starts, skips or finishes a funding search
//! - **Claim**: a funding program request is submitted, paid, declined or
//!   interrupted
//! - **Patience**: a household's patience ran out mid-search
//!
//! # Example
//!
//! ```rust
//! use rebuild_funding_core::models::{Event, EventLog};
//! use rebuild_funding_core::ProgramKind;
//! use uuid::Uuid;
//!
//! let mut log = EventLog::new();
//! log.log(Event::ClaimPaid {
//!     time: 42,
//!     household_id: "hh_001".to_string(),
//!     program: ProgramKind::Insurance,
//!     claim_id: Uuid::new_v4(),
//!     amount: 250_000,
//! });
//!
//! assert_eq!(log.events_of_type("ClaimPaid").len(), 1);
//! ```

use crate::core::time::SimTime;
use crate::models::property::Stage;
use crate::programs::ProgramKind;
use serde::Serialize;
use uuid::Uuid;

/// Simulation event capturing a step of a funding search.
///
/// All events carry the simulation day for temporal ordering. Events are
/// logged in the order they occur within a day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// A household began searching for money
    SearchStarted {
        time: SimTime,
        household_id: String,
        policy: &'static str,
        stage: Option<Stage>,
        funds: i64,
    },

    /// Search not needed: funds already cover the full repair
    SearchSkipped {
        time: SimTime,
        household_id: String,
        funds: i64,
        damage_value: i64,
    },

    /// Request submitted to a funding program
    ClaimSubmitted {
        time: SimTime,
        household_id: String,
        program: ProgramKind,
        claim_id: Uuid,
    },

    /// Program paid out
    ClaimPaid {
        time: SimTime,
        household_id: String,
        program: ProgramKind,
        claim_id: Uuid,
        amount: i64,
    },

    /// Program resolved without paying anything
    ClaimDeclined {
        time: SimTime,
        household_id: String,
        program: ProgramKind,
        reason: String,
    },

    /// Program process was cancelled before it resolved
    ClaimInterrupted {
        time: SimTime,
        household_id: String,
        program: ProgramKind,
        claim_id: Uuid,
        waited: SimTime,
    },

    /// Household's patience ran out before the active program resolved
    PatienceExpired {
        time: SimTime,
        household_id: String,
        pending_program: ProgramKind,
    },

    /// Search ended
    SearchFinished {
        time: SimTime,
        household_id: String,
        outcome: &'static str,
        funds: i64,
        duration: SimTime,
    },
}

impl Event {
    /// Simulation day when this event occurred
    pub fn time(&self) -> SimTime {
        match self {
            Event::SearchStarted { time, .. } => *time,
            Event::SearchSkipped { time, .. } => *time,
            Event::ClaimSubmitted { time, .. } => *time,
            Event::ClaimPaid { time, .. } => *time,
            Event::ClaimDeclined { time, .. } => *time,
            Event::ClaimInterrupted { time, .. } => *time,
            Event::PatienceExpired { time, .. } => *time,
            Event::SearchFinished { time, .. } => *time,
        }
    }

    /// Short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::SearchStarted { .. } => "SearchStarted",
            Event::SearchSkipped { .. } => "SearchSkipped",
            Event::ClaimSubmitted { .. } => "ClaimSubmitted",
            Event::ClaimPaid { .. } => "ClaimPaid",
            Event::ClaimDeclined { .. } => "ClaimDeclined",
            Event::ClaimInterrupted { .. } => "ClaimInterrupted",
            Event::PatienceExpired { .. } => "PatienceExpired",
            Event::SearchFinished { .. } => "SearchFinished",
        }
    }

    /// Household the event belongs to
    pub fn household_id(&self) -> &str {
        match self {
            Event::SearchStarted { household_id, .. }
            | Event::SearchSkipped { household_id, .. }
            | Event::ClaimSubmitted { household_id, .. }
            | Event::ClaimPaid { household_id, .. }
            | Event::ClaimDeclined { household_id, .. }
            | Event::ClaimInterrupted { household_id, .. }
            | Event::PatienceExpired { household_id, .. }
            | Event::SearchFinished { household_id, .. } => household_id,
        }
    }

    /// Funding program involved, if any
    pub fn program(&self) -> Option<ProgramKind> {
        match self {
            Event::ClaimSubmitted { program, .. }
            | Event::ClaimPaid { program, .. }
            | Event::ClaimDeclined { program, .. }
            | Event::ClaimInterrupted { program, .. } => Some(*program),
            Event::PatienceExpired {
                pending_program, ..
            } => Some(*pending_program),
            _ => None,
        }
    }
}

/// Event log for storing and querying simulation events.
///
/// This is a simple wrapper around Vec<Event> with convenience methods.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events that happened on a given day
    pub fn events_at_time(&self, time: SimTime) -> Vec<&Event> {
        self.events.iter().filter(|e| e.time() == time).collect()
    }

    /// Events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Events for a specific household
    pub fn events_for_household(&self, household_id: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.household_id() == household_id)
            .collect()
    }

    /// Programs a household submitted requests to, in submission order
    pub fn programs_attempted(&self, household_id: &str) -> Vec<ProgramKind> {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::ClaimSubmitted { .. }) && e.household_id() == household_id)
            .filter_map(Event::program)
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
