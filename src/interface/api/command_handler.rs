//! Operator command endpoints
//!
//! Example: `curl localhost:9090/command/mute`

use super::dto::{ApiResponse, HealthResponse, TargetsResponse};
use super::state::AppState;
use crate::application::CommandOutcome;
use crate::domain::call_control::CallControlError;
use crate::domain::shared::value_objects::CallControlId;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info};

fn provider_error(e: CallControlError) -> Response {
    error!("API: Call control command failed: {}", e);
    (
        StatusCode::BAD_GATEWAY,
        Json(ApiResponse::<()>::error(e.to_string())),
    )
        .into_response()
}

fn respond<T: Serialize>(result: Result<CommandOutcome<T>, CallControlError>) -> Response {
    match result {
        Ok(CommandOutcome::Done(data)) => {
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Ok(CommandOutcome::NotRunning(message)) => {
            (StatusCode::CONFLICT, Json(ApiResponse::<()>::error(message))).into_response()
        }
        Err(e) => provider_error(e),
    }
}

fn targets(
    result: Result<CommandOutcome<Vec<CallControlId>>, CallControlError>,
) -> Result<CommandOutcome<TargetsResponse>, CallControlError> {
    result.map(|outcome| match outcome {
        CommandOutcome::Done(call_control_ids) => {
            CommandOutcome::Done(TargetsResponse { call_control_ids })
        }
        CommandOutcome::NotRunning(message) => CommandOutcome::NotRunning(message),
    })
}

/// List conferences
pub async fn list_conferences(State(state): State<AppState>) -> Response {
    info!("API: Listing conferences");
    respond(state.commands.list().await)
}

/// Mute all participants
pub async fn mute_participants(State(state): State<AppState>) -> Response {
    info!("API: Muting participants");
    respond(targets(state.commands.mute().await))
}

pub async fn unmute_participants(State(state): State<AppState>) -> Response {
    info!("API: Unmuting participants");
    respond(targets(state.commands.unmute().await))
}

/// Put all participants on hold
pub async fn hold_participants(State(state): State<AppState>) -> Response {
    info!("API: Holding participants");
    respond(targets(state.commands.hold().await))
}

pub async fn unhold_participants(State(state): State<AppState>) -> Response {
    info!("API: Unholding participants");
    respond(targets(state.commands.unhold().await))
}

/// Call a number and let it join via the normal webhook flow
pub async fn dial_number(State(state): State<AppState>, Path(number): Path<String>) -> Response {
    info!("API: Dialing {}", number);
    match state.commands.dial(&number).await {
        Ok(dialed) => (StatusCode::OK, Json(ApiResponse::success(dialed))).into_response(),
        Err(e) => provider_error(e),
    }
}

/// Health check
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let snapshot = state.correlator.snapshot().await;
    Json(ApiResponse::success(HealthResponse {
        status: "ok".to_string(),
        conference_running: snapshot.conference.is_some(),
        tracked_calls: snapshot.calls.len(),
    }))
}
