//! Application layer - Use cases and application services
//!
//! This layer orchestrates domain objects to fulfill use cases:
//! - Correlating inbound webhook events with tracked calls and the conference
//! - Operator commands against the running conference

pub mod commands;
pub mod correlator;

pub use commands::{CommandOutcome, CommandSettings, ConferenceCommands};
pub use correlator::{
    CorrelatorSettings, CorrelatorSnapshot, EventCorrelator, HandleOutcome, IgnoreReason,
};
