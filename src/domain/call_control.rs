//! Call-control port
//!
//! The provider owns signaling and mixing; this trait is everything we ask of
//! it. The HTTP implementation lives in `infrastructure::telnyx`.

use crate::domain::shared::value_objects::{CallControlId, CallLegId, ConferenceId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallControlError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Provider rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Text-to-speech played into a call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speech {
    pub payload: String,
    pub voice: String,
    pub language: String,
}

/// Conference as returned by the provider on creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConferenceHandle {
    pub id: ConferenceId,
    pub name: String,
}

/// Conference as listed by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConferenceSummary {
    pub id: String,
    pub name: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<String>,
}

/// Outbound call request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialRequest {
    pub to: String,
    pub from: String,
    pub connection_id: String,
}

/// Identifiers of an originated call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialedCall {
    pub call_control_id: CallControlId,
    pub call_leg_id: Option<CallLegId>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CallControl: Send + Sync {
    /// Answer an inbound call
    async fn answer(&self, call: &CallControlId) -> Result<(), CallControlError>;

    /// Speak text into a call
    async fn speak(&self, call: &CallControlId, speech: &Speech) -> Result<(), CallControlError>;

    /// Create a conference with `founder` as its first participant
    async fn create_conference(
        &self,
        founder: &CallControlId,
        name: &str,
    ) -> Result<ConferenceHandle, CallControlError>;

    /// Add a call to an existing conference
    async fn join_conference(
        &self,
        conference: &ConferenceId,
        call: &CallControlId,
    ) -> Result<(), CallControlError>;

    async fn mute(
        &self,
        conference: &ConferenceId,
        calls: &[CallControlId],
    ) -> Result<(), CallControlError>;

    async fn unmute(
        &self,
        conference: &ConferenceId,
        calls: &[CallControlId],
    ) -> Result<(), CallControlError>;

    /// Put calls on hold, playing `audio_url` to them meanwhile
    async fn hold(
        &self,
        conference: &ConferenceId,
        calls: &[CallControlId],
        audio_url: &str,
    ) -> Result<(), CallControlError>;

    async fn unhold(
        &self,
        conference: &ConferenceId,
        calls: &[CallControlId],
    ) -> Result<(), CallControlError>;

    async fn list_conferences(&self) -> Result<Vec<ConferenceSummary>, CallControlError>;

    /// Originate an outbound call
    async fn dial(&self, request: &DialRequest) -> Result<DialedCall, CallControlError>;
}
