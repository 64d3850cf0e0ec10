//! Client registry and broadcast fan-out.
//!
//! Each client gets an unbounded queue drained by its transport task, so
//! one slow or dead client never stalls the others. The `seq` mutex
//! serializes every mutate-then-broadcast section; holding it across
//! apply and fan-out is what gives all clients the same broadcast order
//! and makes the connect-time snapshot atomic.

use crate::events::{ControlFrame, ControlUpdate, ServerEvent};
use esprelay_core::{ClientId, ControlChange, MonitoringPatch, MonitoringState, Result};
use esprelay_state::{DeviceLink, StateStore};
use esprelay_telemetry::Metrics;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

fn encode(event: &ServerEvent) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(text) => Some(text),
        Err(e) => {
            error!(event = event.name(), error = %e, "Failed to serialize event");
            None
        }
    }
}

/// Fan-out hub for real-time clients.
pub struct BroadcastHub {
    store: Arc<StateStore>,
    link: Arc<DeviceLink>,
    /// Window used when the device channel closes and the push lease
    /// decides whether the link stays up.
    liveness_window: Duration,
    clients: RwLock<HashMap<ClientId, mpsc::UnboundedSender<String>>>,
    /// Serializes every mutate-then-broadcast section.
    seq: Mutex<()>,
}

impl BroadcastHub {
    /// Create a hub over the given store and device link.
    pub fn new(store: Arc<StateStore>, link: Arc<DeviceLink>, liveness_window: Duration) -> Self {
        Self {
            store,
            link,
            liveness_window,
            clients: RwLock::new(HashMap::new()),
            seq: Mutex::new(()),
        }
    }

    /// Number of currently connected clients.
    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }

    /// Whether the device link is currently connected.
    pub fn device_connected(&self) -> bool {
        self.link.is_connected()
    }

    /// Register a client and queue its synchronization snapshot.
    ///
    /// The snapshot is read and queued under the sequencing lock, so it
    /// reflects a single point in time and no broadcast can interleave
    /// with it.
    pub fn connect(&self) -> (ClientId, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = ClientId::generate();

        let _order = self.seq.lock();
        let snapshot = self.store.snapshot();
        self.clients.write().insert(client, tx.clone());
        Metrics::client_connected();

        for event in [
            ServerEvent::MonitoringData(snapshot.monitoring),
            ServerEvent::ControlStates(snapshot.controls),
        ] {
            if let Some(text) = encode(&event) {
                // Cannot fail here, we still hold the receiver.
                let _ = tx.send(text);
            }
        }

        info!(client = %client, clients = self.client_count(), "Client connected");
        (client, rx)
    }

    /// Deregister a client.
    ///
    /// If the client held the device channel, the link decides whether
    /// the push lease keeps the device connected.
    pub fn disconnect(&self, client: ClientId) {
        let _order = self.seq.lock();
        let removed = self.clients.write().remove(&client).is_some();
        if removed {
            Metrics::client_disconnected();
            info!(client = %client, clients = self.client_count(), "Client disconnected");
        }
        self.link.close_channel(client, self.liveness_window);
    }

    /// Apply a control frame from a client and fan it out to everyone
    /// else.
    ///
    /// The server clock is authoritative for the broadcast timestamp;
    /// the sender's own timestamp is logged as an audit field only.
    pub fn handle_control(&self, sender: ClientId, frame: ControlFrame) -> Result<()> {
        let change = ControlChange::from_wire(frame.kind, frame.id, &frame.value)?;

        let _order = self.seq.lock();
        let timestamp = self.store.apply_control(&change);
        Metrics::control_update(&change.kind().to_string());

        if let Some(device_ts) = frame.timestamp {
            debug!(
                client = %sender,
                device_ts,
                server_ts = timestamp,
                "Sender timestamp recorded"
            );
        }

        let event = ServerEvent::ControlUpdate(ControlUpdate {
            kind: change.kind(),
            id: change.wire_id(),
            value: change.value_json(),
            timestamp,
        });
        self.fan_out(&event, Some(sender));
        Ok(())
    }

    /// Handle a device handshake: mark the persistent channel and reply
    /// with the current control state to that client only.
    pub fn handle_device_handshake(&self, client: ClientId) {
        let _order = self.seq.lock();
        self.link.open_channel(client);
        let event = ServerEvent::ControlStates(self.store.controls());
        self.send_to(client, &event);
        info!(client = %client, "Device handshake accepted");
    }

    /// Answer a client ping.
    pub fn handle_ping(&self, client: ClientId) {
        self.send_to(client, &ServerEvent::Pong);
    }

    /// Merge a device monitoring patch and broadcast the full resulting
    /// state to all clients.
    ///
    /// Refreshes the device push lease. Returns the new last-update
    /// timestamp.
    pub fn ingest_monitoring(&self, patch: &MonitoringPatch) -> i64 {
        let _order = self.seq.lock();
        let (full, timestamp) = self.store.apply_monitoring_patch(patch);
        self.link.record_push();
        Metrics::monitoring_update("http");
        self.fan_out(&ServerEvent::MonitoringData(full), None);
        timestamp
    }

    /// Replace the monitoring state wholesale and broadcast it
    /// (simulator path; no device lease refresh).
    pub fn overwrite_monitoring(&self, monitoring: MonitoringState) {
        let _order = self.seq.lock();
        self.store.set_monitoring(monitoring.clone());
        Metrics::monitoring_update("simulator");
        self.fan_out(&ServerEvent::MonitoringData(monitoring), None);
    }

    /// Send one event to every client except `exclude`.
    ///
    /// Send failures mean the client's transport task is gone; the
    /// client is evicted and everyone else is unaffected.
    fn fan_out(&self, event: &ServerEvent, exclude: Option<ClientId>) {
        let Some(text) = encode(event) else {
            return;
        };
        Metrics::broadcast(event.name());

        let mut failed = Vec::new();
        {
            let guard = self.clients.read();
            for (client, tx) in guard.iter() {
                if Some(*client) == exclude {
                    continue;
                }
                if tx.send(text.clone()).is_err() {
                    failed.push(*client);
                }
            }
        }
        for client in failed {
            self.evict(client);
        }
    }

    /// Send one event to a single client.
    fn send_to(&self, client: ClientId, event: &ServerEvent) {
        let Some(text) = encode(event) else {
            return;
        };
        let failed = match self.clients.read().get(&client) {
            Some(tx) => tx.send(text).is_err(),
            None => {
                warn!(client = %client, event = event.name(), "Send to unknown client");
                false
            }
        };
        if failed {
            self.evict(client);
        }
    }

    fn evict(&self, client: ClientId) {
        warn!(client = %client, "Evicting client after send failure");
        Metrics::send_failure();
        if self.clients.write().remove(&client).is_some() {
            Metrics::client_disconnected();
        }
        self.link.close_channel(client, self.liveness_window);
    }
}
