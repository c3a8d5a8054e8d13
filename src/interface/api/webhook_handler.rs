//! Inbound webhook endpoint

use super::dto::ApiResponse;
use super::metrics_handler::{record_webhook_event, record_webhook_rejected, update_tracked_calls};
use super::state::AppState;
use crate::infrastructure::telnyx::{decode_webhook, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Verify, decode and correlate a provider webhook
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(e) = state.verifier.verify(
        &body,
        header_str(&headers, SIGNATURE_HEADER),
        header_str(&headers, TIMESTAMP_HEADER),
    ) {
        warn!("Rejected webhook: {}", e);
        record_webhook_rejected(e.label());
        return (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<()>::error(format!("Authentication error: {}", e))),
        )
            .into_response();
    }

    let event = match decode_webhook(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!("Undecodable webhook: {}", e);
            record_webhook_rejected("invalid_body");
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::error(e.to_string())),
            )
                .into_response();
        }
    };

    let outcome = state.correlator.handle(&event).await;
    record_webhook_event(outcome.label());
    update_tracked_calls(state.correlator.tracked_call_count().await);

    (StatusCode::OK, Json(ApiResponse::success(outcome))).into_response()
}
