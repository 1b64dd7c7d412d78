//! Domain models for the rebuild funding simulator

pub mod event;
pub mod household;
pub mod property;

// Re-exports
pub use event::{Event, EventLog};
pub use household::{Household, ProgramRecord, SharedHousehold, Story};
pub use property::{
    BuildProgress, InstallmentReceipt, InstallmentReceipts, Property, Stage, StageParseError,
};
