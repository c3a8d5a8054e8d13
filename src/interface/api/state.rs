//! Shared state of the HTTP handlers

use crate::application::{
    CommandSettings, ConferenceCommands, CorrelatorSettings, EventCorrelator,
};
use crate::config::Config;
use crate::domain::call_control::{CallControl, Speech};
use crate::infrastructure::telnyx::{SignatureError, WebhookVerifier};
use std::sync::Arc;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub correlator: Arc<EventCorrelator>,
    pub commands: Arc<ConferenceCommands>,
    pub verifier: Arc<WebhookVerifier>,
}

impl AppState {
    /// Wire the correlator, commands and verifier from configuration
    pub fn from_config(
        config: &Config,
        call_control: Arc<dyn CallControl>,
    ) -> Result<Self, SignatureError> {
        let verifier = WebhookVerifier::from_base64(
            &config.provider.public_key,
            config.provider.signature_tolerance_secs,
        )?;

        let correlator = Arc::new(EventCorrelator::new(
            call_control.clone(),
            CorrelatorSettings {
                conference_name_prefix: config.conference.name_prefix.clone(),
                greeting: Speech {
                    payload: config.conference.greeting.clone(),
                    voice: config.conference.voice.clone(),
                    language: config.conference.language.clone(),
                },
                dedup_capacity: config.dedup.capacity,
                dedup_retention: chrono::Duration::seconds(
                    i64::try_from(config.dedup.retention_secs)
                        .unwrap_or(i64::MAX)
                        .min(i64::MAX / 1_000),
                ),
            },
        ));

        let commands = Arc::new(ConferenceCommands::new(
            correlator.clone(),
            call_control,
            CommandSettings {
                phone_number: config.provider.phone_number.clone(),
                connection_id: config.provider.connection_id.clone(),
                waiting_audio_url: config.conference.waiting_audio_url.clone(),
            },
        ));

        Ok(Self {
            correlator,
            commands,
            verifier: Arc::new(verifier),
        })
    }
}
