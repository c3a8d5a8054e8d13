//! Operator commands against the running conference

use super::correlator::EventCorrelator;
use crate::domain::call_control::{
    CallControl, CallControlError, ConferenceSummary, DialRequest, DialedCall,
};
use crate::domain::shared::value_objects::{CallControlId, ConferenceId};
use std::sync::Arc;
use tracing::info;

/// Outcome of a conference command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome<T> {
    /// No conference exists yet; carries a hint for the operator
    NotRunning(String),
    Done(T),
}

#[derive(Debug, Clone)]
pub struct CommandSettings {
    pub phone_number: String,
    pub connection_id: String,
    pub waiting_audio_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParticipantAction {
    Mute,
    Unmute,
    Hold,
    Unhold,
}

pub struct ConferenceCommands {
    correlator: Arc<EventCorrelator>,
    call_control: Arc<dyn CallControl>,
    settings: CommandSettings,
}

impl ConferenceCommands {
    pub fn new(
        correlator: Arc<EventCorrelator>,
        call_control: Arc<dyn CallControl>,
        settings: CommandSettings,
    ) -> Self {
        Self {
            correlator,
            call_control,
            settings,
        }
    }

    pub fn not_running_message(&self) -> String {
        format!(
            "Conference not running yet, try calling {} first.",
            self.settings.phone_number
        )
    }

    /// List conferences known to the provider
    pub async fn list(&self) -> Result<CommandOutcome<Vec<ConferenceSummary>>, CallControlError> {
        if self.correlator.snapshot().await.conference.is_none() {
            return Ok(CommandOutcome::NotRunning(self.not_running_message()));
        }
        let conferences = self.call_control.list_conferences().await?;
        Ok(CommandOutcome::Done(conferences))
    }

    pub async fn mute(&self) -> Result<CommandOutcome<Vec<CallControlId>>, CallControlError> {
        self.apply(ParticipantAction::Mute).await
    }

    pub async fn unmute(&self) -> Result<CommandOutcome<Vec<CallControlId>>, CallControlError> {
        self.apply(ParticipantAction::Unmute).await
    }

    /// Hold all participants with the waiting audio playing
    pub async fn hold(&self) -> Result<CommandOutcome<Vec<CallControlId>>, CallControlError> {
        self.apply(ParticipantAction::Hold).await
    }

    pub async fn unhold(&self) -> Result<CommandOutcome<Vec<CallControlId>>, CallControlError> {
        self.apply(ParticipantAction::Unhold).await
    }

    /// Originate a call to `number` from the conference number
    pub async fn dial(&self, number: &str) -> Result<DialedCall, CallControlError> {
        let request = DialRequest {
            to: normalize_destination(number),
            from: self.settings.phone_number.clone(),
            connection_id: self.settings.connection_id.clone(),
        };
        info!("Calling {}", request.to);
        self.call_control.dial(&request).await
    }

    async fn apply(
        &self,
        action: ParticipantAction,
    ) -> Result<CommandOutcome<Vec<CallControlId>>, CallControlError> {
        let snapshot = self.correlator.snapshot().await;
        let Some(conference) = snapshot.conference.as_ref() else {
            return Ok(CommandOutcome::NotRunning(self.not_running_message()));
        };
        let targets = conference.members().to_vec();
        let conference_id: &ConferenceId = &conference.id;

        info!(
            "{:?} {} participant(s) in conference {}",
            action,
            targets.len(),
            conference_id
        );

        match action {
            ParticipantAction::Mute => self.call_control.mute(conference_id, &targets).await?,
            ParticipantAction::Unmute => self.call_control.unmute(conference_id, &targets).await?,
            ParticipantAction::Hold => {
                self.call_control
                    .hold(conference_id, &targets, &self.settings.waiting_audio_url)
                    .await?
            }
            ParticipantAction::Unhold => self.call_control.unhold(conference_id, &targets).await?,
        }

        Ok(CommandOutcome::Done(targets))
    }
}

/// Prefix the dialed digits with `+` unless already present
fn normalize_destination(number: &str) -> String {
    let number = number.trim();
    if number.starts_with('+') {
        number.to_string()
    } else {
        format!("+{}", number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::correlator::CorrelatorSettings;
    use crate::domain::call_control::{ConferenceHandle, MockCallControl, Speech};
    use crate::domain::shared::value_objects::{CallLegId, EventId};
    use crate::domain::webhook::{EventKind, RecordType, WebhookEvent};

    fn command_settings() -> CommandSettings {
        CommandSettings {
            phone_number: "+15550001111".to_string(),
            connection_id: "conn-1".to_string(),
            waiting_audio_url: "https://example.com/hold.ogg".to_string(),
        }
    }

    fn correlator_settings() -> CorrelatorSettings {
        CorrelatorSettings {
            conference_name_prefix: "demo-conference".to_string(),
            greeting: Speech {
                payload: "joining conference".to_string(),
                voice: "female".to_string(),
                language: "en-GB".to_string(),
            },
            dedup_capacity: 100,
            dedup_retention: chrono::Duration::hours(1),
        }
    }

    fn event(id: &str, kind: EventKind) -> WebhookEvent {
        WebhookEvent {
            id: Some(EventId::parse(id).unwrap()),
            record_type: RecordType::Event,
            kind,
            occurred_at: None,
            payload: serde_json::json!({}),
        }
    }

    fn cc(id: &str) -> CallControlId {
        CallControlId::parse(id).unwrap()
    }

    /// Build commands over a correlator that has one answered call in a conference
    async fn running_conference(mut mock: MockCallControl) -> ConferenceCommands {
        mock.expect_answer().returning(|_| Ok(()));
        mock.expect_speak().returning(|_, _| Ok(()));
        mock.expect_create_conference().returning(|_, name| {
            Ok(ConferenceHandle {
                id: ConferenceId::parse("conf-1").unwrap(),
                name: name.to_string(),
            })
        });

        let mock: Arc<dyn CallControl> = Arc::new(mock);
        let correlator = Arc::new(EventCorrelator::new(mock.clone(), correlator_settings()));
        correlator
            .handle(&event(
                "e1",
                EventKind::CallInitiated {
                    call_control_id: cc("c1"),
                    call_leg_id: CallLegId::parse("l1").unwrap(),
                },
            ))
            .await;
        correlator
            .handle(&event(
                "e2",
                EventKind::CallAnswered {
                    call_control_id: cc("c1"),
                },
            ))
            .await;
        // Initiated but not yet in the conference: not a command target
        correlator
            .handle(&event(
                "e3",
                EventKind::CallInitiated {
                    call_control_id: cc("c2"),
                    call_leg_id: CallLegId::parse("l2").unwrap(),
                },
            ))
            .await;

        ConferenceCommands::new(correlator, mock, command_settings())
    }

    fn idle(mock: MockCallControl) -> ConferenceCommands {
        let mock: Arc<dyn CallControl> = Arc::new(mock);
        let correlator = Arc::new(EventCorrelator::new(mock.clone(), correlator_settings()));
        ConferenceCommands::new(correlator, mock, command_settings())
    }

    #[tokio::test]
    async fn test_commands_without_conference_report_not_running() {
        let commands = idle(MockCallControl::new());
        let expected = CommandOutcome::NotRunning(
            "Conference not running yet, try calling +15550001111 first.".to_string(),
        );

        assert_eq!(commands.mute().await.unwrap(), expected);
        assert_eq!(commands.unmute().await.unwrap(), expected);
        assert_eq!(commands.hold().await.unwrap(), expected);
        assert_eq!(commands.unhold().await.unwrap(), expected);
        assert!(matches!(
            commands.list().await.unwrap(),
            CommandOutcome::NotRunning(_)
        ));
    }

    #[tokio::test]
    async fn test_mute_targets_conference_members() {
        let mut mock = MockCallControl::new();
        mock.expect_mute()
            .withf(|conference, calls| conference.as_str() == "conf-1" && calls == [cc("c1")])
            .times(1)
            .returning(|_, _| Ok(()));

        let commands = running_conference(mock).await;
        assert_eq!(
            commands.mute().await.unwrap(),
            CommandOutcome::Done(vec![cc("c1")])
        );
    }

    #[tokio::test]
    async fn test_call_left_out_by_failed_creation_is_not_targeted() {
        let mut mock = MockCallControl::new();
        mock.expect_answer().returning(|_| Ok(()));
        mock.expect_speak().returning(|_, _| Ok(()));
        let mut seq = mockall::Sequence::new();
        mock.expect_create_conference()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                Err(CallControlError::Rejected {
                    status: 422,
                    body: "invalid call state".to_string(),
                })
            });
        mock.expect_create_conference()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, name| {
                Ok(ConferenceHandle {
                    id: ConferenceId::parse("conf-1").unwrap(),
                    name: name.to_string(),
                })
            });
        mock.expect_mute()
            .withf(|_, calls| calls == [cc("c2")])
            .times(1)
            .returning(|_, _| Ok(()));

        let mock: Arc<dyn CallControl> = Arc::new(mock);
        let correlator = Arc::new(EventCorrelator::new(mock.clone(), correlator_settings()));
        for (i, call) in ["c1", "c2"].iter().enumerate() {
            correlator
                .handle(&event(
                    &format!("i{}", i),
                    EventKind::CallInitiated {
                        call_control_id: cc(call),
                        call_leg_id: CallLegId::parse(format!("l{}", i)).unwrap(),
                    },
                ))
                .await;
        }
        for (i, call) in ["c1", "c2"].iter().enumerate() {
            correlator
                .handle(&event(
                    &format!("a{}", i),
                    EventKind::CallAnswered {
                        call_control_id: cc(call),
                    },
                ))
                .await;
        }

        // c1 is answered but never made it into the conference
        let commands = ConferenceCommands::new(correlator, mock, command_settings());
        assert_eq!(
            commands.mute().await.unwrap(),
            CommandOutcome::Done(vec![cc("c2")])
        );
    }

    #[tokio::test]
    async fn test_hold_passes_waiting_audio() {
        let mut mock = MockCallControl::new();
        mock.expect_hold()
            .withf(|_, calls, audio_url| {
                calls.len() == 1 && audio_url == "https://example.com/hold.ogg"
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        mock.expect_unhold().times(1).returning(|_, _| Ok(()));
        mock.expect_unmute().times(1).returning(|_, _| Ok(()));

        let commands = running_conference(mock).await;
        assert!(matches!(commands.hold().await.unwrap(), CommandOutcome::Done(_)));
        assert!(matches!(commands.unhold().await.unwrap(), CommandOutcome::Done(_)));
        assert!(matches!(commands.unmute().await.unwrap(), CommandOutcome::Done(_)));
    }

    #[tokio::test]
    async fn test_list_forwards_to_provider() {
        let mut mock = MockCallControl::new();
        mock.expect_list_conferences().times(1).returning(|| {
            Ok(vec![ConferenceSummary {
                id: "conf-1".to_string(),
                name: Some("demo-conference1234".to_string()),
                status: Some("in_progress".to_string()),
                created_at: None,
            }])
        });

        let commands = running_conference(mock).await;
        match commands.list().await.unwrap() {
            CommandOutcome::Done(conferences) => assert_eq!(conferences[0].id, "conf-1"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let mut mock = MockCallControl::new();
        mock.expect_mute().returning(|_, _| {
            Err(CallControlError::Rejected {
                status: 404,
                body: "conference not found".to_string(),
            })
        });

        let commands = running_conference(mock).await;
        assert!(matches!(
            commands.mute().await,
            Err(CallControlError::Rejected { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_dial_builds_request() {
        let mut mock = MockCallControl::new();
        mock.expect_dial()
            .withf(|request| {
                request.to == "+15555555555"
                    && request.from == "+15550001111"
                    && request.connection_id == "conn-1"
            })
            .times(2)
            .returning(|_| {
                Ok(DialedCall {
                    call_control_id: CallControlId::parse("out-1").unwrap(),
                    call_leg_id: None,
                })
            });

        // Works without a conference
        let commands = idle(mock);
        let dialed = commands.dial("15555555555").await.unwrap();
        assert_eq!(dialed.call_control_id.as_str(), "out-1");
        commands.dial("+15555555555").await.unwrap();
    }

    #[test]
    fn test_normalize_destination() {
        assert_eq!(normalize_destination("15555555555"), "+15555555555");
        assert_eq!(normalize_destination("+4420"), "+4420");
        assert_eq!(normalize_destination(" 33 "), "+33");
    }
}
