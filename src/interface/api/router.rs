//! API Router configuration

use super::command_handler::{
    dial_number, health_check, hold_participants, list_conferences, mute_participants,
    unhold_participants, unmute_participants,
};
use super::metrics_handler::metrics_handler;
use super::state::AppState;
use super::webhook_handler::receive_webhook;
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the API router
pub fn build_router(state: AppState) -> Router {
    // Health check route
    let health_routes = Router::new().route("/health", get(health_check));

    // Provider callbacks
    let webhook_routes = Router::new().route("/webhook", post(receive_webhook));

    // Operator commands
    let command_routes = Router::new()
        .route("/command/list", get(list_conferences))
        .route("/command/mute", get(mute_participants))
        .route("/command/unmute", get(unmute_participants))
        .route("/command/hold", get(hold_participants))
        .route("/command/unhold", get(unhold_participants))
        .route("/command/call/:number", get(dial_number));

    Router::new()
        .merge(health_routes)
        .merge(webhook_routes)
        .merge(command_routes)
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Metrics route (separate state)
pub fn metrics_router(prometheus_handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(prometheus_handle)
}
