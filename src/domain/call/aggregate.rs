//! Tracked call

use crate::domain::call::value_object::CallState;
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{CallControlId, CallLegId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A call leg we are tracking on behalf of the conference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    call_control_id: CallControlId,
    call_leg_id: CallLegId,
    state: CallState,
    initiated_at: DateTime<Utc>,
    answered_at: Option<DateTime<Utc>>,
}

impl Call {
    /// Start tracking a freshly initiated call
    pub fn new(call_control_id: CallControlId, call_leg_id: CallLegId) -> Self {
        Self {
            call_control_id,
            call_leg_id,
            state: CallState::Initiated,
            initiated_at: Utc::now(),
            answered_at: None,
        }
    }

    pub fn call_control_id(&self) -> &CallControlId {
        &self.call_control_id
    }

    pub fn call_leg_id(&self) -> &CallLegId {
        &self.call_leg_id
    }

    pub fn initiated_at(&self) -> DateTime<Utc> {
        self.initiated_at
    }

    pub fn answered_at(&self) -> Option<DateTime<Utc>> {
        self.answered_at
    }

    pub fn is_answered(&self) -> bool {
        self.state == CallState::Answered
    }

    /// Mark the call answered
    pub fn answer(&mut self) -> Result<()> {
        if !self.state.can_transition_to(&CallState::Answered) {
            return Err(DomainError::InvalidOperation(format!(
                "call {} is already answered",
                self.call_control_id
            )));
        }
        self.state = CallState::Answered;
        self.answered_at = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call() -> Call {
        Call::new(
            CallControlId::parse("c1").unwrap(),
            CallLegId::parse("l1").unwrap(),
        )
    }

    #[test]
    fn test_new_call_is_initiated() {
        let call = call();
        assert!(!call.is_answered());
        assert!(call.answered_at().is_none());
    }

    #[test]
    fn test_answer_only_once() {
        let mut call = call();
        call.answer().unwrap();
        assert!(call.is_answered());
        assert!(call.answered_at().unwrap() >= call.initiated_at());

        assert!(call.answer().is_err());
    }
}
