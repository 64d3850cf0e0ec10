//! Device link state machine.
//!
//! The device proves liveness through two independent signals: a
//! persistent real-time channel (handshake) and HTTP monitoring pushes
//! (a lease that the liveness monitor expires). `DeviceLink` reconciles
//! both into one connected/disconnected status so the rest of the
//! system never has to reason about the raw signals.

use esprelay_core::ClientId;
use esprelay_telemetry::Metrics;
use parking_lot::RwLock;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::info;

/// Device connection status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Connected,
    Disconnected,
}

impl LinkStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => write!(f, "CONNECTED"),
            Self::Disconnected => write!(f, "DISCONNECTED"),
        }
    }
}

struct LinkInner {
    /// Client currently holding the persistent channel, if any.
    channel_client: Option<ClientId>,
    /// Monotonic time of the last HTTP monitoring push.
    last_push: Option<Instant>,
    status: LinkStatus,
}

impl LinkInner {
    fn transition(&mut self, new: LinkStatus, source: &'static str) {
        if self.status == new {
            return;
        }
        info!(from = %self.status, to = %new, source, "Device link transition");
        self.status = new;
        Metrics::device_link(new.is_connected());
    }

    fn push_is_fresh(&self, window: Duration) -> bool {
        self.last_push.is_some_and(|t| t.elapsed() <= window)
    }
}

/// Unified device liveness tracker.
pub struct DeviceLink {
    inner: RwLock<LinkInner>,
}

impl DeviceLink {
    /// Create a link in the disconnected state.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LinkInner {
                channel_client: None,
                last_push: None,
                status: LinkStatus::Disconnected,
            }),
        }
    }

    /// Current status.
    pub fn status(&self) -> LinkStatus {
        self.inner.read().status
    }

    pub fn is_connected(&self) -> bool {
        self.status().is_connected()
    }

    /// Client holding the persistent channel, if any.
    pub fn channel_client(&self) -> Option<ClientId> {
        self.inner.read().channel_client
    }

    /// Record an HTTP monitoring push; refreshes the lease and connects.
    pub fn record_push(&self) {
        let mut guard = self.inner.write();
        guard.last_push = Some(Instant::now());
        guard.transition(LinkStatus::Connected, "monitoring push");
    }

    /// Record a device handshake over the persistent channel.
    pub fn open_channel(&self, client: ClientId) {
        let mut guard = self.inner.write();
        guard.channel_client = Some(client);
        guard.transition(LinkStatus::Connected, "handshake");
    }

    /// Handle disconnect of a real-time client.
    ///
    /// Only relevant when that client held the persistent channel. The
    /// link stays connected while the push lease is still within the
    /// liveness window; without one it drops immediately.
    pub fn close_channel(&self, client: ClientId, window: Duration) {
        let mut guard = self.inner.write();
        if guard.channel_client != Some(client) {
            return;
        }
        guard.channel_client = None;
        if !guard.push_is_fresh(window) {
            guard.transition(LinkStatus::Disconnected, "channel closed");
        }
    }

    /// Expire a stale push lease.
    ///
    /// The only transition driven here is Connected to Disconnected,
    /// and only when no persistent channel is open and the lease is
    /// older than the window. Idempotent when already disconnected.
    /// Returns true if the status flipped.
    pub fn expire(&self, window: Duration) -> bool {
        let mut guard = self.inner.write();
        if guard.status != LinkStatus::Connected || guard.channel_client.is_some() {
            return false;
        }
        if guard.push_is_fresh(window) {
            return false;
        }
        guard.transition(LinkStatus::Disconnected, "lease expired");
        true
    }
}

impl Default for DeviceLink {
    fn default() -> Self {
        Self::new()
    }
}
