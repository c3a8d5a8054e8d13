//! Prometheus metrics handler

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and describe our metrics
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    describe_counter!(
        "webhook_events_total",
        "Verified webhook events by correlator outcome"
    );
    describe_counter!(
        "webhook_rejected_total",
        "Webhook deliveries rejected before reaching the correlator"
    );
    describe_counter!(
        "call_control_commands_total",
        "Commands sent to the call-control provider"
    );
    describe_gauge!(
        "conference_tracked_calls",
        "Number of calls currently tracked"
    );

    Ok(handle)
}

/// HTTP metrics handler
pub async fn metrics_handler(State(prometheus_handle): State<PrometheusHandle>) -> Response {
    (StatusCode::OK, prometheus_handle.render()).into_response()
}

/// Record a webhook event handled by the correlator
pub fn record_webhook_event(outcome: &'static str) {
    counter!("webhook_events_total", "outcome" => outcome).increment(1);
}

/// Record a webhook rejected before correlation
pub fn record_webhook_rejected(reason: &'static str) {
    counter!("webhook_rejected_total", "reason" => reason).increment(1);
}

/// Update tracked calls gauge
pub fn update_tracked_calls(count: usize) {
    gauge!("conference_tracked_calls").set(count as f64);
}
