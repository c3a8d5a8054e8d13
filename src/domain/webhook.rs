//! Inbound webhook events
//!
//! Provider notifications are decoded into a closed set of event kinds so
//! dispatch in the correlator is an exhaustive match.

use crate::domain::shared::value_objects::{CallControlId, CallLegId, ConferenceId, EventId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

pub const CALL_INITIATED: &str = "call.initiated";
pub const CALL_ANSWERED: &str = "call.answered";
pub const CALL_HANGUP: &str = "call.hangup";
pub const PARTICIPANT_JOINED: &str = "conference.participant.joined";
pub const PARTICIPANT_LEFT: &str = "conference.participant.left";

/// Top-level record type of a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RecordType {
    Event,
    Other(String),
}

impl RecordType {
    pub fn parse(value: &str) -> Self {
        match value {
            "event" => RecordType::Event,
            other => RecordType::Other(other.to_string()),
        }
    }
}

/// What happened, with the identifiers the correlator needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum EventKind {
    CallInitiated {
        call_control_id: CallControlId,
        call_leg_id: CallLegId,
    },
    CallAnswered {
        call_control_id: CallControlId,
    },
    CallHangup {
        call_leg_id: CallLegId,
    },
    ParticipantJoined {
        conference_id: Option<ConferenceId>,
        call_control_id: Option<CallControlId>,
    },
    ParticipantLeft {
        conference_id: Option<ConferenceId>,
        call_control_id: Option<CallControlId>,
    },
    /// Any event type we do not act on
    Unhandled(String),
}

impl EventKind {
    /// Provider name of the event type
    pub fn event_type(&self) -> &str {
        match self {
            EventKind::CallInitiated { .. } => CALL_INITIATED,
            EventKind::CallAnswered { .. } => CALL_ANSWERED,
            EventKind::CallHangup { .. } => CALL_HANGUP,
            EventKind::ParticipantJoined { .. } => PARTICIPANT_JOINED,
            EventKind::ParticipantLeft { .. } => PARTICIPANT_LEFT,
            EventKind::Unhandled(event_type) => event_type,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_type())
    }
}

/// A verified, decoded webhook notification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookEvent {
    /// Always present on `event` records, optional on anything else
    pub id: Option<EventId>,
    pub record_type: RecordType,
    pub kind: EventKind,
    pub occurred_at: Option<DateTime<Utc>>,
    /// Raw payload, kept for logging
    pub payload: serde_json::Value,
}

impl WebhookEvent {
    pub fn is_event(&self) -> bool {
        self.record_type == RecordType::Event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_parse() {
        assert_eq!(RecordType::parse("event"), RecordType::Event);
        assert_eq!(
            RecordType::parse("call"),
            RecordType::Other("call".to_string())
        );
    }

    #[test]
    fn test_event_type_names() {
        let kind = EventKind::CallHangup {
            call_leg_id: CallLegId::parse("leg").unwrap(),
        };
        assert_eq!(kind.event_type(), "call.hangup");

        let kind = EventKind::Unhandled("call.bridged".to_string());
        assert_eq!(kind.to_string(), "call.bridged");
    }
}
