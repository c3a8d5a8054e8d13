//! Call value objects

use serde::{Deserialize, Serialize};

/// Lifecycle of a tracked call.
///
/// Hangup is not represented: a hung-up call is dropped from tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallState {
    /// `call.initiated` seen, answer command issued
    Initiated,
    /// `call.answered` seen; the call may now join the conference
    Answered,
}

impl CallState {
    /// Check if state transition is valid
    pub fn can_transition_to(&self, new_state: &CallState) -> bool {
        matches!((self, new_state), (CallState::Initiated, CallState::Answered))
    }
}
