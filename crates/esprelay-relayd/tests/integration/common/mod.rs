//! Shared helpers for integration tests.

use esprelay_relayd::{AppConfig, Application};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A relay instance running on an ephemeral port.
pub struct TestRelay {
    pub port: u16,
    handle: JoinHandle<()>,
}

impl TestRelay {
    /// Start the relay with the given config on a free port and wait
    /// until the status endpoint answers.
    pub async fn start(mut config: AppConfig) -> Self {
        config.server.port = free_port().await;
        let port = config.server.port;

        let handle = tokio::spawn(async move {
            let _ = Application::new(config).run().await;
        });

        let url = format!("http://127.0.0.1:{port}/api/status");
        let ready = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Ok(response) = reqwest::get(&url).await {
                    if response.status().is_success() {
                        return;
                    }
                }
                tokio::time::sleep(Duration::from_millis(25)).await;
            }
        })
        .await;
        assert!(ready.is_ok(), "Relay did not come up within timeout");

        Self { port, handle }
    }

    /// Start with the simulator disabled, so only test traffic moves
    /// the state.
    pub async fn start_quiet() -> Self {
        let mut config = AppConfig::default();
        config.simulator.enabled = false;
        Self::start(config).await
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.port)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/ws", self.port)
    }

    pub fn shutdown(self) {
        self.handle.abort();
    }
}

async fn free_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

/// Fetch a JSON body from the relay.
pub async fn get_json(url: &str) -> Value {
    reqwest::get(url).await.unwrap().json().await.unwrap()
}

/// Open a WebSocket connection to the relay.
pub async fn connect_ws(url: &str) -> WsClient {
    let (socket, _) = connect_async(url).await.unwrap();
    socket
}

/// Receive the next text frame as JSON, skipping control frames.
pub async fn recv_json(socket: &mut WsClient) -> Value {
    let text = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match socket.next().await {
                Some(Ok(Message::Text(text))) => return text,
                Some(Ok(_)) => continue,
                other => panic!("unexpected WebSocket frame: {other:?}"),
            }
        }
    })
    .await
    .expect("timed out waiting for WebSocket frame");
    serde_json::from_str(&text).unwrap()
}

/// Send one JSON frame.
pub async fn send_json(socket: &mut WsClient, value: Value) {
    socket
        .send(Message::Text(value.to_string()))
        .await
        .unwrap();
}

/// Consume the two connect-sync frames every client receives.
pub async fn drain_sync(socket: &mut WsClient) {
    let first = recv_json(socket).await;
    assert_eq!(first["event"], "monitoringData");
    let second = recv_json(socket).await;
    assert_eq!(second["event"], "controlStates");
}

/// Assert that no frame arrives within the given window.
pub async fn expect_no_frame(socket: &mut WsClient, wait: Duration) {
    let result = tokio::time::timeout(wait, socket.next()).await;
    assert!(result.is_err(), "expected silence, got {result:?}");
}

/// Poll the status endpoint until the device flag matches.
pub async fn wait_for_device_state(relay: &TestRelay, want: bool) {
    let url = relay.http_url("/api/status");
    let reached = tokio::time::timeout(Duration::from_secs(3), async {
        loop {
            let status = get_json(&url).await;
            if status["esp32Connected"] == want {
                return;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
    })
    .await;
    assert!(
        reached.is_ok(),
        "device state never became esp32Connected={want}"
    );
}
