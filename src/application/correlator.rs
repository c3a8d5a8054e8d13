//! Webhook event correlator
//!
//! Turns provider call/conference notifications into updates of the locally
//! tracked calls and conference, issuing the follow-up commands each event
//! calls for. Tracked state sits behind one mutex that is only held while it
//! is read or updated, never across a provider command. Founding the
//! conference is serialized by a second lock, so concurrent first answers
//! create exactly one conference and the rest join it.

use crate::domain::call::Call;
use crate::domain::call_control::{CallControl, Speech};
use crate::domain::conference::{self, Conference};
use crate::domain::event_ledger::EventLedger;
use crate::domain::shared::value_objects::{CallControlId, CallLegId, ConferenceId};
use crate::domain::webhook::{EventKind, WebhookEvent};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Why an event produced no effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum IgnoreReason {
    /// `record_type` was not `event`
    NotAnEvent,
    /// Event record without an id, so it cannot be deduplicated
    MissingId,
    /// Event id already processed
    Duplicate,
    /// `call.answered` for a call we never saw initiated
    UntrackedCall,
    /// `call.answered` for a call already answered under another event id
    AlreadyAnswered,
    /// Event type we do not act on
    Unhandled(String),
}

/// Result of handling one webhook event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum HandleOutcome {
    Processed { event_type: String },
    Ignored(IgnoreReason),
}

impl HandleOutcome {
    fn processed(kind: &EventKind) -> Self {
        HandleOutcome::Processed {
            event_type: kind.event_type().to_string(),
        }
    }

    /// Short label used for metrics
    pub fn label(&self) -> &'static str {
        match self {
            HandleOutcome::Processed { .. } => "processed",
            HandleOutcome::Ignored(IgnoreReason::NotAnEvent) => "not_an_event",
            HandleOutcome::Ignored(IgnoreReason::MissingId) => "missing_id",
            HandleOutcome::Ignored(IgnoreReason::Duplicate) => "duplicate",
            HandleOutcome::Ignored(IgnoreReason::UntrackedCall) => "untracked_call",
            HandleOutcome::Ignored(IgnoreReason::AlreadyAnswered) => "already_answered",
            HandleOutcome::Ignored(IgnoreReason::Unhandled(_)) => "unhandled",
        }
    }
}

/// Settings the correlator needs when reacting to events
#[derive(Debug, Clone)]
pub struct CorrelatorSettings {
    pub conference_name_prefix: String,
    pub greeting: Speech,
    pub dedup_capacity: usize,
    pub dedup_retention: chrono::Duration,
}

/// Point-in-time copy of the tracked state
#[derive(Debug, Clone, Serialize)]
pub struct CorrelatorSnapshot {
    pub calls: Vec<Call>,
    pub conference: Option<Conference>,
}

#[derive(Debug)]
struct CorrelatorState {
    calls: Vec<Call>,
    conference: Option<Conference>,
    ledger: EventLedger,
}

impl CorrelatorState {
    fn is_tracked(&self, call_control_id: &CallControlId) -> bool {
        self.calls
            .iter()
            .any(|call| call.call_control_id() == call_control_id)
    }

    fn conference_id(&self) -> Option<ConferenceId> {
        self.conference.as_ref().map(|conference| conference.id.clone())
    }
}

pub struct EventCorrelator {
    state: Mutex<CorrelatorState>,
    /// Held for the whole create-conference round trip
    founding: Mutex<()>,
    call_control: Arc<dyn CallControl>,
    settings: CorrelatorSettings,
}

impl EventCorrelator {
    pub fn new(call_control: Arc<dyn CallControl>, settings: CorrelatorSettings) -> Self {
        let ledger = EventLedger::new(settings.dedup_capacity, settings.dedup_retention);
        Self {
            state: Mutex::new(CorrelatorState {
                calls: Vec::new(),
                conference: None,
                ledger,
            }),
            founding: Mutex::new(()),
            call_control,
            settings,
        }
    }

    /// Handle one verified webhook event
    pub async fn handle(&self, event: &WebhookEvent) -> HandleOutcome {
        if !event.is_event() {
            debug!("Ignoring non-event record {:?}", event.record_type);
            return HandleOutcome::Ignored(IgnoreReason::NotAnEvent);
        }
        let Some(id) = event.id.as_ref() else {
            warn!("Ignoring {} event without an id", event.kind);
            return HandleOutcome::Ignored(IgnoreReason::MissingId);
        };

        if !self.state.lock().await.ledger.record(id) {
            debug!("Duplicate webhook {} ignored", id);
            return HandleOutcome::Ignored(IgnoreReason::Duplicate);
        }

        info!("New webhook event: {} ({})", event.kind, id);
        debug!(
            "{}",
            serde_json::to_string_pretty(&event.payload).unwrap_or_default()
        );

        match &event.kind {
            EventKind::CallInitiated {
                call_control_id,
                call_leg_id,
            } => self.on_initiated(call_control_id, call_leg_id).await,
            EventKind::CallAnswered { call_control_id } => {
                if let Some(reason) = self.on_answered(call_control_id).await {
                    return HandleOutcome::Ignored(reason);
                }
            }
            EventKind::CallHangup { call_leg_id } => self.on_hangup(call_leg_id).await,
            EventKind::ParticipantJoined {
                conference_id,
                call_control_id,
            } => {
                info!(
                    "Participant joined: call {:?} in conference {:?}",
                    call_control_id.as_ref().map(CallControlId::as_str),
                    conference_id.as_ref().map(ConferenceId::as_str)
                );
            }
            EventKind::ParticipantLeft {
                conference_id,
                call_control_id,
            } => {
                info!(
                    "Participant left: call {:?} from conference {:?}",
                    call_control_id.as_ref().map(CallControlId::as_str),
                    conference_id.as_ref().map(ConferenceId::as_str)
                );
            }
            EventKind::Unhandled(event_type) => {
                debug!("No handler for event type {}", event_type);
                return HandleOutcome::Ignored(IgnoreReason::Unhandled(event_type.clone()));
            }
        }

        HandleOutcome::processed(&event.kind)
    }

    async fn on_initiated(&self, call_control_id: &CallControlId, call_leg_id: &CallLegId) {
        {
            let mut state = self.state.lock().await;
            if state.is_tracked(call_control_id) {
                warn!("Call {} initiated twice, keeping existing entry", call_control_id);
            } else {
                state
                    .calls
                    .push(Call::new(call_control_id.clone(), call_leg_id.clone()));
            }
        }

        // The provider follows up with call.answered
        if let Err(e) = self.call_control.answer(call_control_id).await {
            warn!("Failed to answer call {}: {}", call_control_id, e);
            return;
        }
        info!("Call initiated: {} (leg {})", call_control_id, call_leg_id);
    }

    /// Returns the reason when the event is ignored
    async fn on_answered(&self, call_control_id: &CallControlId) -> Option<IgnoreReason> {
        let conference_id = {
            let mut state = self.state.lock().await;
            let Some(call) = state
                .calls
                .iter_mut()
                .find(|call| call.call_control_id() == call_control_id)
            else {
                warn!("call.answered for untracked call {}, ignoring", call_control_id);
                return Some(IgnoreReason::UntrackedCall);
            };

            if let Err(e) = call.answer() {
                warn!("{}", e);
                return Some(IgnoreReason::AlreadyAnswered);
            }
            state.conference_id()
        };

        if let Err(e) = self
            .call_control
            .speak(call_control_id, &self.settings.greeting)
            .await
        {
            warn!("Failed to speak to call {}: {}", call_control_id, e);
        }

        info!("Call answered, adding {} to conference", call_control_id);

        match conference_id {
            Some(conference_id) => self.join(&conference_id, call_control_id).await,
            None => self.found_or_join(call_control_id).await,
        }

        None
    }

    /// Create the conference with `founder`, unless another answer got there first
    async fn found_or_join(&self, founder: &CallControlId) {
        let founding = self.founding.lock().await;

        let existing = self.state.lock().await.conference_id();
        if let Some(conference_id) = existing {
            drop(founding);
            self.join(&conference_id, founder).await;
            return;
        }

        let name = conference::generate_name(
            &self.settings.conference_name_prefix,
            &mut rand::thread_rng(),
        );
        match self.call_control.create_conference(founder, &name).await {
            Ok(handle) => {
                info!("Conference created: {} ({})", handle.name, handle.id);
                let mut state = self.state.lock().await;
                let mut conference = Conference::new(handle.id, handle.name, founder.clone());
                // Founder may have hung up while the create was in flight
                if !state.is_tracked(founder) {
                    conference.remove_member(founder);
                }
                state.conference = Some(conference);
            }
            Err(e) => {
                warn!("Failed to create conference {}: {}", name, e);
            }
        }
    }

    async fn join(&self, conference_id: &ConferenceId, call_control_id: &CallControlId) {
        if let Err(e) = self
            .call_control
            .join_conference(conference_id, call_control_id)
            .await
        {
            warn!(
                "Failed to add call {} to conference {}: {}",
                call_control_id, conference_id, e
            );
            return;
        }

        let mut state = self.state.lock().await;
        let tracked = state.is_tracked(call_control_id);
        match state.conference.as_mut() {
            Some(conference) if tracked && conference.id == *conference_id => {
                conference.add_member(call_control_id.clone());
            }
            _ => debug!(
                "Call {} ended before joining conference {}",
                call_control_id, conference_id
            ),
        }
    }

    async fn on_hangup(&self, call_leg_id: &CallLegId) {
        let mut state = self.state.lock().await;
        let mut ended = Vec::new();
        state.calls.retain(|call| {
            if call.call_leg_id() == call_leg_id {
                ended.push(call.call_control_id().clone());
                false
            } else {
                true
            }
        });

        if let Some(conference) = state.conference.as_mut() {
            for call_control_id in &ended {
                conference.remove_member(call_control_id);
            }
        }

        info!("Call ended: leg {} ({} call(s) removed)", call_leg_id, ended.len());
    }

    pub async fn snapshot(&self) -> CorrelatorSnapshot {
        let state = self.state.lock().await;
        CorrelatorSnapshot {
            calls: state.calls.clone(),
            conference: state.conference.clone(),
        }
    }

    pub async fn tracked_call_count(&self) -> usize {
        self.state.lock().await.calls.len()
    }
}
