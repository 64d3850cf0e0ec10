//! HTTP server implementation using axum.
//!
//! The REST surface wraps every payload in a `success` envelope so the
//! web UI and the device firmware can share one response parser. The
//! WebSocket route hands off to the connection pump in `ws`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use esprelay_core::{ControlState, MonitoringPatch};
use esprelay_hub::BroadcastHub;
use esprelay_state::StateStore;
use esprelay_telemetry::{metrics, Metrics};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::ws::ws_handler;

/// Connection limiter to prevent too many concurrent WebSocket connections.
pub struct ConnectionLimiter {
    current: AtomicUsize,
    max: usize,
}

impl ConnectionLimiter {
    pub fn new(max: usize) -> Self {
        Self {
            current: AtomicUsize::new(0),
            max,
        }
    }

    /// Claim a connection slot, or `None` when the limit is reached.
    pub fn try_acquire(&self) -> Option<ConnectionGuard<'_>> {
        loop {
            let current = self.current.load(Ordering::Acquire);
            if current >= self.max {
                return None;
            }
            if self
                .current
                .compare_exchange(current, current + 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return Some(ConnectionGuard { limiter: self });
            }
        }
    }

    pub fn current_count(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }
}

/// RAII slot handle; dropping it releases the connection slot.
pub struct ConnectionGuard<'a> {
    limiter: &'a ConnectionLimiter,
}

impl Drop for ConnectionGuard<'_> {
    fn drop(&mut self) {
        self.limiter.current.fetch_sub(1, Ordering::Release);
    }
}

/// Shared application state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub(crate) store: Arc<StateStore>,
    pub(crate) hub: Arc<BroadcastHub>,
    pub(crate) limiter: Arc<ConnectionLimiter>,
    pub(crate) max_connections: usize,
}

impl AppState {
    pub fn new(store: Arc<StateStore>, hub: Arc<BroadcastHub>, max_connections: usize) -> Self {
        Self {
            store,
            hub,
            limiter: Arc::new(ConnectionLimiter::new(max_connections)),
            max_connections,
        }
    }
}

#[derive(Debug, Serialize)]
struct ControlsResponse {
    success: bool,
    data: ControlState,
    timestamp: i64,
}

#[derive(Debug, Serialize)]
struct UpdateResponse {
    success: bool,
    message: &'static str,
    timestamp: i64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    success: bool,
    esp32_connected: bool,
    connected_clients: usize,
    last_update: i64,
    uptime: u64,
}

/// Create the axum router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/api/controls", get(get_controls))
        .route("/api/monitoring", post(post_monitoring))
        .route("/api/status", get(get_status))
        .route("/ws", get(ws_handler))
        .route("/metrics", get(serve_metrics))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the index HTML page.
async fn serve_index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

/// Current control state for device polling.
async fn get_controls(State(state): State<AppState>) -> Json<ControlsResponse> {
    Metrics::http_request("/api/controls");
    Json(ControlsResponse {
        success: true,
        data: state.store.controls(),
        timestamp: state.store.last_update_ms(),
    })
}

/// Accept a partial monitoring update pushed by the device.
///
/// The body is parsed strictly: unknown ids, unknown sections and
/// out-of-range values are a 400, never silently dropped.
async fn post_monitoring(State(state): State<AppState>, body: String) -> Response {
    Metrics::http_request("/api/monitoring");

    let patch: MonitoringPatch = match serde_json::from_str(&body) {
        Ok(patch) => patch,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    success: false,
                    error: format!("invalid monitoring payload: {e}"),
                }),
            )
                .into_response();
        }
    };

    let timestamp = state.hub.ingest_monitoring(&patch);
    Json(UpdateResponse {
        success: true,
        message: "Monitoring data updated",
        timestamp,
    })
    .into_response()
}

/// Relay health snapshot for the UI status bar.
async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Metrics::http_request("/api/status");
    Json(StatusResponse {
        success: true,
        esp32_connected: state.hub.device_connected(),
        connected_clients: state.hub.client_count(),
        last_update: state.store.last_update_ms(),
        uptime: state.store.uptime_seconds(),
    })
}

/// Prometheus text exposition.
async fn serve_metrics() -> Response {
    match metrics::gather() {
        Ok(text) => (StatusCode::OK, text).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to gather metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics unavailable").into_response()
        }
    }
}

/// Run the gateway HTTP server until the task is aborted.
pub async fn run_server(
    state: AppState,
    port: u16,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, "Starting gateway server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use esprelay_state::DeviceLink;
    use serde_json::Value;
    use std::time::Duration;

    fn test_state(max_connections: usize) -> AppState {
        let store = Arc::new(StateStore::new());
        let link = Arc::new(DeviceLink::new());
        let hub = Arc::new(BroadcastHub::new(
            store.clone(),
            link,
            Duration::from_secs(10),
        ));
        AppState::new(store, hub, max_connections)
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_limiter_enforces_max() {
        let limiter = ConnectionLimiter::new(2);
        let a = limiter.try_acquire().unwrap();
        let _b = limiter.try_acquire().unwrap();
        assert!(limiter.try_acquire().is_none());
        assert_eq!(limiter.current_count(), 2);

        drop(a);
        assert_eq!(limiter.current_count(), 1);
        assert!(limiter.try_acquire().is_some());
    }

    #[tokio::test]
    async fn test_get_controls_returns_defaults() {
        let state = test_state(4);
        let Json(response) = get_controls(State(state)).await;
        assert!(response.success);
        assert_eq!(response.data, ControlState::default());
    }

    #[tokio::test]
    async fn test_post_monitoring_applies_patch() {
        let state = test_state(4);
        let body = r#"{"gauges":{"1":75},"variables":{"2":3.3}}"#.to_string();

        let response = post_monitoring(State(state.clone()), body).await;
        assert_eq!(response.status(), StatusCode::OK);
        let value = body_json(response).await;
        assert_eq!(value["success"], true);
        assert_eq!(value["message"], "Monitoring data updated");

        assert_eq!(state.store.monitoring().gauge(esprelay_core::GaugeId::One).value(), 75);
        assert!(state.hub.device_connected());
    }

    #[tokio::test]
    async fn test_post_monitoring_rejects_bad_payload() {
        let state = test_state(4);
        for body in [
            "not json",
            r#"{"gauges":{"7":50}}"#,
            r#"{"gauges":{"1":150}}"#,
            r#"{"thrusters":{"1":true}}"#,
        ] {
            let response = post_monitoring(State(state.clone()), body.to_string()).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
            let value = body_json(response).await;
            assert_eq!(value["success"], false);
        }
        // Nothing applied, device still disconnected.
        assert!(!state.hub.device_connected());
    }

    #[tokio::test]
    async fn test_get_status_shape() {
        let state = test_state(4);
        let Json(response) = get_status(State(state)).await;
        assert!(response.success);
        assert!(!response.esp32_connected);
        assert_eq!(response.connected_clients, 0);

        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("esp32Connected").is_some());
        assert!(value.get("connectedClients").is_some());
        assert!(value.get("lastUpdate").is_some());
        assert!(value.get("uptime").is_some());
    }
}
