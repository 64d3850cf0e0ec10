//! Prometheus metrics for the esprelay relay.
//!
//! Covers:
//! - Real-time client connections
//! - Device link state
//! - Broadcast fan-out and send failures
//! - Control and monitoring mutation counts
//! - HTTP request counts
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. If registration fails,
//! it indicates a fatal configuration error (e.g., duplicate metric names)
//! that should cause an immediate crash at startup rather than silent failure.
//! These panics only occur during static initialization, never at runtime.

use crate::error::{TelemetryError, TelemetryResult};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter, register_counter_vec, register_int_gauge, Counter, CounterVec, Encoder,
    IntGauge, TextEncoder,
};

/// Number of currently connected real-time clients.
pub static WS_CLIENTS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "esprelay_ws_clients",
        "Number of connected real-time clients"
    )
    .unwrap()
});

/// Device link state (1 = connected, 0 = disconnected).
pub static DEVICE_CONNECTED: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "esprelay_device_connected",
        "Device link state (1=connected)"
    )
    .unwrap()
});

/// Total broadcast events fanned out, by event name.
pub static BROADCASTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "esprelay_broadcasts_total",
        "Total broadcast events fanned out",
        &["event"]
    )
    .unwrap()
});

/// Total control changes applied, by kind.
pub static CONTROL_UPDATES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "esprelay_control_updates_total",
        "Total control changes applied",
        &["kind"]
    )
    .unwrap()
});

/// Total monitoring mutations, by source.
pub static MONITORING_UPDATES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "esprelay_monitoring_updates_total",
        "Total monitoring state mutations",
        &["source"]
    )
    .unwrap()
});

/// Total per-client send failures during fan-out.
pub static SEND_FAILURES_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "esprelay_send_failures_total",
        "Total per-client send failures during broadcast fan-out"
    )
    .unwrap()
});

/// Total HTTP API requests, by endpoint.
pub static HTTP_REQUESTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "esprelay_http_requests_total",
        "Total HTTP API requests",
        &["endpoint"]
    )
    .unwrap()
});

/// Encode all registered metrics in the Prometheus text format.
pub fn gather() -> TelemetryResult<String> {
    let encoder = TextEncoder::new();
    let families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&families, &mut buffer)
        .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
}

/// Convenience wrapper for metric updates.
pub struct Metrics;

impl Metrics {
    /// Record a real-time client connect.
    pub fn client_connected() {
        WS_CLIENTS.inc();
    }

    /// Record a real-time client disconnect.
    pub fn client_disconnected() {
        WS_CLIENTS.dec();
    }

    /// Set the device link state.
    pub fn device_link(connected: bool) {
        DEVICE_CONNECTED.set(if connected { 1 } else { 0 });
    }

    /// Record a broadcast fan-out.
    pub fn broadcast(event: &str) {
        BROADCASTS_TOTAL.with_label_values(&[event]).inc();
    }

    /// Record an applied control change.
    pub fn control_update(kind: &str) {
        CONTROL_UPDATES_TOTAL.with_label_values(&[kind]).inc();
    }

    /// Record a monitoring mutation.
    pub fn monitoring_update(source: &str) {
        MONITORING_UPDATES_TOTAL.with_label_values(&[source]).inc();
    }

    /// Record a per-client send failure.
    pub fn send_failure() {
        SEND_FAILURES_TOTAL.inc();
    }

    /// Record an HTTP API request.
    pub fn http_request(endpoint: &str) {
        HTTP_REQUESTS_TOTAL.with_label_values(&[endpoint]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_update_without_panic() {
        Metrics::client_connected();
        Metrics::client_disconnected();
        Metrics::device_link(true);
        Metrics::broadcast("monitoringData");
        Metrics::control_update("toggle");
        Metrics::monitoring_update("http");
        Metrics::send_failure();
        Metrics::http_request("/api/status");
    }

    #[test]
    fn test_gather_produces_text() {
        Metrics::broadcast("controlUpdate");
        let text = gather().unwrap();
        assert!(text.contains("esprelay_broadcasts_total"));
    }
}
