//! Real-time channel wire events.
//!
//! Frames are JSON objects with an `event` tag and a `data` payload,
//! e.g. `{"event":"controlUpdate","data":{"type":"toggle","id":1,...}}`.
//! The envelope keeps the payload's own `type` field (the control kind)
//! out of the tag position.

use esprelay_core::{ControlKind, ControlState, MonitoringState};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Events pushed from the server to real-time clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Full monitoring state (connect sync and every monitoring change).
    MonitoringData(MonitoringState),
    /// Full control state (connect sync and handshake reply).
    ControlStates(ControlState),
    /// Single control change, fanned out to everyone but the sender.
    ControlUpdate(ControlUpdate),
    /// Reply to a client ping.
    Pong,
}

impl ServerEvent {
    /// Wire event name, for logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MonitoringData(_) => "monitoringData",
            Self::ControlStates(_) => "controlStates",
            Self::ControlUpdate(_) => "controlUpdate",
            Self::Pong => "pong",
        }
    }
}

/// Payload of a `controlUpdate` broadcast.
#[derive(Debug, Clone, Serialize)]
pub struct ControlUpdate {
    /// Control kind (`pushButton`, `toggle`, `slider`).
    #[serde(rename = "type")]
    pub kind: ControlKind,
    /// 1-based wire id.
    pub id: u8,
    /// New value (boolean or integer, matching the kind).
    pub value: Value,
    /// Server-side apply timestamp in epoch milliseconds.
    pub timestamp: i64,
}

/// Events received from real-time clients.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Control change requested by a client.
    ControlData(ControlFrame),
    /// Device handshake with an arbitrary payload.
    Esp32Connect(Option<Value>),
    /// Keepalive ping.
    Ping,
}

/// Raw `controlData` payload before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct ControlFrame {
    /// Control kind (`pushButton`, `toggle`, `slider`).
    #[serde(rename = "type")]
    pub kind: ControlKind,
    /// 1-based wire id.
    pub id: u8,
    /// Requested value; validated against the kind.
    pub value: Value,
    /// Sender-side timestamp, audit only. The server clock is
    /// authoritative for ordering.
    #[serde(default)]
    pub timestamp: Option<i64>,
}
