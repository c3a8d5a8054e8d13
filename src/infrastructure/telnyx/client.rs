//! HTTP implementation of the call-control port
//!
//! Wraps reqwest::Client with bearer-token auth against the provider's v2 API.

use super::dto::{
    AnswerBody, CallData, ConferenceData, CreateConferenceBody, DataEnvelope, DialBody,
    JoinConferenceBody, ParticipantsBody, SpeakBody,
};
use crate::domain::call_control::{
    CallControl, CallControlError, ConferenceHandle, ConferenceSummary, DialRequest, DialedCall,
    Speech,
};
use crate::domain::shared::value_objects::{CallControlId, CallLegId, ConferenceId};
use async_trait::async_trait;
use metrics::counter;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

pub struct TelnyxClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TelnyxClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CallControlError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CallControlError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a command whose response body we do not need
    async fn post_command<B: Serialize + ?Sized>(
        &self,
        command: &'static str,
        path: &str,
        body: &B,
    ) -> Result<(), CallControlError> {
        self.send(command, self.http.post(self.url(path)).json(body))
            .await
            .map(|_| ())
    }

    async fn post_for<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        command: &'static str,
        path: &str,
        body: &B,
    ) -> Result<T, CallControlError> {
        let resp = self
            .send(command, self.http.post(self.url(path)).json(body))
            .await?;
        decode(resp).await
    }

    async fn get_for<T: DeserializeOwned>(
        &self,
        command: &'static str,
        path: &str,
    ) -> Result<T, CallControlError> {
        let resp = self.send(command, self.http.get(self.url(path))).await?;
        decode(resp).await
    }

    async fn send(
        &self,
        command: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, CallControlError> {
        let result = self.dispatch(command, request).await;
        let status = if result.is_ok() { "ok" } else { "error" };
        counter!("call_control_commands_total", "command" => command, "status" => status)
            .increment(1);
        result
    }

    async fn dispatch(
        &self,
        command: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, CallControlError> {
        debug!("Call control command: {}", command);

        let resp = request
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| CallControlError::Transport(format!("{} failed: {}", command, e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CallControlError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp)
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, CallControlError> {
    let envelope: DataEnvelope<T> = resp
        .json()
        .await
        .map_err(|e| CallControlError::InvalidResponse(e.to_string()))?;
    Ok(envelope.data)
}

fn command_id() -> String {
    Uuid::new_v4().to_string()
}

fn participants_body<'a>(
    calls: &'a [CallControlId],
    audio_url: Option<&'a str>,
) -> ParticipantsBody<'a> {
    ParticipantsBody {
        call_control_ids: calls.iter().map(CallControlId::as_str).collect(),
        audio_url,
    }
}

#[async_trait]
impl CallControl for TelnyxClient {
    async fn answer(&self, call: &CallControlId) -> Result<(), CallControlError> {
        self.post_command(
            "answer",
            &format!("/calls/{}/actions/answer", call),
            &AnswerBody {
                command_id: command_id(),
            },
        )
        .await
    }

    async fn speak(&self, call: &CallControlId, speech: &Speech) -> Result<(), CallControlError> {
        self.post_command(
            "speak",
            &format!("/calls/{}/actions/speak", call),
            &SpeakBody {
                payload: &speech.payload,
                voice: &speech.voice,
                language: &speech.language,
                command_id: command_id(),
            },
        )
        .await
    }

    async fn create_conference(
        &self,
        founder: &CallControlId,
        name: &str,
    ) -> Result<ConferenceHandle, CallControlError> {
        let data: ConferenceData = self
            .post_for(
                "create_conference",
                "/conferences",
                &CreateConferenceBody {
                    call_control_id: founder.as_str(),
                    name,
                },
            )
            .await?;

        let id = ConferenceId::parse(data.id)
            .map_err(|e| CallControlError::InvalidResponse(e.to_string()))?;
        Ok(ConferenceHandle {
            id,
            name: data.name.unwrap_or_else(|| name.to_string()),
        })
    }

    async fn join_conference(
        &self,
        conference: &ConferenceId,
        call: &CallControlId,
    ) -> Result<(), CallControlError> {
        self.post_command(
            "join_conference",
            &format!("/conferences/{}/actions/join", conference),
            &JoinConferenceBody {
                call_control_id: call.as_str(),
            },
        )
        .await
    }

    async fn mute(
        &self,
        conference: &ConferenceId,
        calls: &[CallControlId],
    ) -> Result<(), CallControlError> {
        self.post_command(
            "mute",
            &format!("/conferences/{}/actions/mute", conference),
            &participants_body(calls, None),
        )
        .await
    }

    async fn unmute(
        &self,
        conference: &ConferenceId,
        calls: &[CallControlId],
    ) -> Result<(), CallControlError> {
        self.post_command(
            "unmute",
            &format!("/conferences/{}/actions/unmute", conference),
            &participants_body(calls, None),
        )
        .await
    }

    async fn hold(
        &self,
        conference: &ConferenceId,
        calls: &[CallControlId],
        audio_url: &str,
    ) -> Result<(), CallControlError> {
        self.post_command(
            "hold",
            &format!("/conferences/{}/actions/hold", conference),
            &participants_body(calls, Some(audio_url)),
        )
        .await
    }

    async fn unhold(
        &self,
        conference: &ConferenceId,
        calls: &[CallControlId],
    ) -> Result<(), CallControlError> {
        self.post_command(
            "unhold",
            &format!("/conferences/{}/actions/unhold", conference),
            &participants_body(calls, None),
        )
        .await
    }

    async fn list_conferences(&self) -> Result<Vec<ConferenceSummary>, CallControlError> {
        let conferences: Vec<ConferenceData> =
            self.get_for("list_conferences", "/conferences").await?;
        Ok(conferences
            .into_iter()
            .map(|c| ConferenceSummary {
                id: c.id,
                name: c.name,
                status: c.status,
                created_at: c.created_at,
            })
            .collect())
    }

    async fn dial(&self, request: &DialRequest) -> Result<DialedCall, CallControlError> {
        let data: CallData = self
            .post_for(
                "dial",
                "/calls",
                &DialBody {
                    to: &request.to,
                    from: &request.from,
                    connection_id: &request.connection_id,
                },
            )
            .await?;

        Ok(DialedCall {
            call_control_id: CallControlId::parse(data.call_control_id)
                .map_err(|e| CallControlError::InvalidResponse(e.to_string()))?,
            call_leg_id: data.call_leg_id.and_then(|leg| CallLegId::parse(leg).ok()),
        })
    }
}
