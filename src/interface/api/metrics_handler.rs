//! Prometheus metrics handler

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use metrics::describe_counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder and describe the audit metrics
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_metrics();
    Ok(handle)
}

/// A handle that renders metrics without installing a global recorder
pub fn detached_metrics() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

fn describe_metrics() {
    describe_counter!(
        "audit_items_recorded_total",
        "Total number of audit items recorded"
    );
    describe_counter!(
        "audit_entries_written_total",
        "Total number of audit entries written"
    );
    describe_counter!(
        "audit_entry_validation_failures_total",
        "Audit entry writes rejected because of an invalid event type"
    );
    describe_counter!(
        "audit_items_cleaned_total",
        "Audit items removed by log retention"
    );
}

/// HTTP metrics handler
pub async fn metrics_handler(State(prometheus_handle): State<PrometheusHandle>) -> Response {
    let metrics = prometheus_handle.render();
    (StatusCode::OK, metrics).into_response()
}
