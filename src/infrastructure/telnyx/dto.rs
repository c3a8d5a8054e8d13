//! Wire formats of the provider's webhooks and REST API

use crate::domain::shared::error::DomainError;
use crate::domain::shared::value_objects::{CallControlId, CallLegId, ConferenceId, EventId};
use crate::domain::webhook::{
    EventKind, RecordType, WebhookEvent, CALL_ANSWERED, CALL_HANGUP, CALL_INITIATED,
    PARTICIPANT_JOINED, PARTICIPANT_LEFT,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Webhook body: `{"data": {...}}`
#[derive(Debug, Deserialize)]
pub struct WebhookEnvelope {
    pub data: WebhookData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookData {
    pub record_type: String,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payload: Value,
}

/// Decode a verified webhook body
pub fn decode_webhook(body: &[u8]) -> Result<WebhookEvent, DomainError> {
    let envelope: WebhookEnvelope = serde_json::from_slice(body)
        .map_err(|e| DomainError::ValidationError(format!("invalid webhook body: {}", e)))?;
    WebhookEvent::try_from(envelope.data)
}

impl TryFrom<WebhookData> for WebhookEvent {
    type Error = DomainError;

    fn try_from(data: WebhookData) -> Result<Self, Self::Error> {
        let record_type = RecordType::parse(&data.record_type);
        let (id, kind) = if record_type == RecordType::Event {
            let id = data.id.ok_or_else(|| {
                DomainError::ValidationError("event record without an id".to_string())
            })?;
            (
                Some(EventId::parse(id)?),
                decode_kind(&data.event_type, &data.payload)?,
            )
        } else {
            (
                data.id.and_then(|id| EventId::parse(id).ok()),
                EventKind::Unhandled(data.event_type.clone()),
            )
        };

        Ok(WebhookEvent {
            id,
            record_type,
            kind,
            occurred_at: data.occurred_at,
            payload: data.payload,
        })
    }
}

fn decode_kind(event_type: &str, payload: &Value) -> Result<EventKind, DomainError> {
    let kind = match event_type {
        CALL_INITIATED => EventKind::CallInitiated {
            call_control_id: CallControlId::parse(required(payload, "call_control_id")?)?,
            call_leg_id: CallLegId::parse(required(payload, "call_leg_id")?)?,
        },
        CALL_ANSWERED => EventKind::CallAnswered {
            call_control_id: CallControlId::parse(required(payload, "call_control_id")?)?,
        },
        CALL_HANGUP => EventKind::CallHangup {
            call_leg_id: CallLegId::parse(required(payload, "call_leg_id")?)?,
        },
        PARTICIPANT_JOINED => EventKind::ParticipantJoined {
            conference_id: optional(payload, "conference_id")
                .and_then(|id| ConferenceId::parse(id).ok()),
            call_control_id: optional(payload, "call_control_id")
                .and_then(|id| CallControlId::parse(id).ok()),
        },
        PARTICIPANT_LEFT => EventKind::ParticipantLeft {
            conference_id: optional(payload, "conference_id")
                .and_then(|id| ConferenceId::parse(id).ok()),
            call_control_id: optional(payload, "call_control_id")
                .and_then(|id| CallControlId::parse(id).ok()),
        },
        other => EventKind::Unhandled(other.to_string()),
    };
    Ok(kind)
}

fn required(payload: &Value, field: &str) -> Result<String, DomainError> {
    optional(payload, field).ok_or_else(|| {
        DomainError::ValidationError(format!("payload.{} is missing or not a string", field))
    })
}

fn optional(payload: &Value, field: &str) -> Option<String> {
    payload.get(field).and_then(Value::as_str).map(str::to_string)
}

/// Generic `{"data": ...}` response wrapper
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct AnswerBody {
    pub command_id: String,
}

#[derive(Debug, Serialize)]
pub struct SpeakBody<'a> {
    pub payload: &'a str,
    pub voice: &'a str,
    pub language: &'a str,
    pub command_id: String,
}

#[derive(Debug, Serialize)]
pub struct CreateConferenceBody<'a> {
    pub call_control_id: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct JoinConferenceBody<'a> {
    pub call_control_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ParticipantsBody<'a> {
    pub call_control_ids: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct DialBody<'a> {
    pub to: &'a str,
    pub from: &'a str,
    pub connection_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ConferenceData {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallData {
    pub call_control_id: String,
    #[serde(default)]
    pub call_leg_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_decode_call_initiated() {
        let event = decode_webhook(&body(json!({
            "data": {
                "record_type": "event",
                "event_type": "call.initiated",
                "id": "0ccc7b54-4df3-4bca-a65a-3da1ecc777f0",
                "occurred_at": "2020-02-13T18:15:23.943Z",
                "payload": {
                    "call_control_id": "v2:T02llQxIyaRkhfRKxgAP8nY511EhFLizdvdUKJiSw8d6A9BborherQ",
                    "call_leg_id": "2dc6fc34-f9e0-11ea-b68e-02420a0f7768",
                    "direction": "incoming",
                    "from": "+13129457420",
                    "to": "+13125790015"
                }
            }
        })))
        .unwrap();

        assert!(event.is_event());
        assert_eq!(
            event.id.as_ref().map(EventId::as_str),
            Some("0ccc7b54-4df3-4bca-a65a-3da1ecc777f0")
        );
        assert!(event.occurred_at.is_some());
        match event.kind {
            EventKind::CallInitiated {
                call_control_id,
                call_leg_id,
            } => {
                assert!(call_control_id.as_str().starts_with("v2:"));
                assert_eq!(call_leg_id.as_str(), "2dc6fc34-f9e0-11ea-b68e-02420a0f7768");
            }
            other => panic!("unexpected kind {:?}", other),
        }
        assert_eq!(event.payload["direction"], "incoming");
    }

    #[test]
    fn test_decode_participant_event_with_partial_payload() {
        let event = decode_webhook(&body(json!({
            "data": {
                "record_type": "event",
                "event_type": "conference.participant.left",
                "id": "e9",
                "payload": { "conference_id": "conf-1" }
            }
        })))
        .unwrap();

        assert_eq!(
            event.kind,
            EventKind::ParticipantLeft {
                conference_id: Some(ConferenceId::parse("conf-1").unwrap()),
                call_control_id: None,
            }
        );
    }

    #[test]
    fn test_unknown_event_type_is_unhandled() {
        let event = decode_webhook(&body(json!({
            "data": {
                "record_type": "event",
                "event_type": "call.speak.ended",
                "id": "e3",
                "payload": {}
            }
        })))
        .unwrap();
        assert_eq!(event.kind, EventKind::Unhandled("call.speak.ended".to_string()));
    }

    #[test]
    fn test_non_event_record_skips_payload_checks() {
        let event = decode_webhook(&body(json!({
            "data": {
                "record_type": "call",
                "event_type": "call.initiated",
                "id": "r1"
            }
        })))
        .unwrap();
        assert!(!event.is_event());
        assert_eq!(event.kind, EventKind::Unhandled("call.initiated".to_string()));
    }

    #[test]
    fn test_non_event_record_may_omit_id() {
        let event = decode_webhook(&body(json!({
            "data": { "record_type": "call", "event_type": "call.hangup" }
        })))
        .unwrap();
        assert!(!event.is_event());
        assert!(event.id.is_none());

        let err = decode_webhook(&body(json!({
            "data": {
                "record_type": "event",
                "event_type": "call.hangup",
                "payload": { "call_leg_id": "l1" }
            }
        })))
        .unwrap_err();
        assert!(err.to_string().contains("without an id"));
    }

    #[test]
    fn test_missing_required_fields_rejected() {
        let err = decode_webhook(&body(json!({
            "data": {
                "record_type": "event",
                "event_type": "call.answered",
                "id": "e1",
                "payload": {}
            }
        })))
        .unwrap_err();
        assert!(err.to_string().contains("call_control_id"));

        assert!(decode_webhook(b"not json").is_err());
        assert!(decode_webhook(&body(json!({ "data": { "record_type": "event" } }))).is_err());
    }

    #[test]
    fn test_participants_body_omits_missing_audio_url() {
        let body = ParticipantsBody {
            call_control_ids: vec!["c1", "c2"],
            audio_url: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "call_control_ids": ["c1", "c2"] })
        );
    }
}
