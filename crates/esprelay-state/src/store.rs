//! Canonical server state.
//!
//! Holds the control and monitoring halves plus the last-update
//! timestamp behind a single lock. All access goes through the methods
//! here; no caller ever sees the raw structure, so readers cannot
//! observe a partially applied mutation.

use chrono::Utc;
use esprelay_core::{ControlChange, ControlState, MonitoringPatch, MonitoringState};
use parking_lot::RwLock;
use std::time::Instant;

struct ServerState {
    controls: ControlState,
    monitoring: MonitoringState,
    last_update_ms: i64,
}

impl ServerState {
    /// Advance the last-update timestamp.
    ///
    /// Strictly increasing even when two mutations land within the same
    /// millisecond.
    fn touch(&mut self) -> i64 {
        let now = Utc::now().timestamp_millis();
        self.last_update_ms = now.max(self.last_update_ms + 1);
        self.last_update_ms
    }
}

/// A consistent point-in-time view of the full server state.
///
/// All three fields are read under one lock guard, so the snapshot never
/// mixes two different mutations.
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    pub monitoring: MonitoringState,
    pub controls: ControlState,
    pub last_update_ms: i64,
}

/// Owner of the process-wide state image.
pub struct StateStore {
    inner: RwLock<ServerState>,
    started: Instant,
}

impl StateStore {
    /// Create a store with startup defaults.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(ServerState {
                controls: ControlState::default(),
                monitoring: MonitoringState::default(),
                last_update_ms: Utc::now().timestamp_millis(),
            }),
            started: Instant::now(),
        }
    }

    /// Snapshot of the control state.
    pub fn controls(&self) -> ControlState {
        self.inner.read().controls.clone()
    }

    /// Snapshot of the monitoring state.
    pub fn monitoring(&self) -> MonitoringState {
        self.inner.read().monitoring.clone()
    }

    /// Snapshot of everything under one lock guard.
    pub fn snapshot(&self) -> StateSnapshot {
        let guard = self.inner.read();
        StateSnapshot {
            monitoring: guard.monitoring.clone(),
            controls: guard.controls.clone(),
            last_update_ms: guard.last_update_ms,
        }
    }

    /// Apply a validated control change.
    ///
    /// Returns the new last-update timestamp.
    pub fn apply_control(&self, change: &ControlChange) -> i64 {
        let mut guard = self.inner.write();
        guard.controls.apply(change);
        guard.touch()
    }

    /// Merge a monitoring patch.
    ///
    /// Returns the full resulting monitoring state and the new
    /// last-update timestamp, read under the same lock guard as the
    /// merge itself.
    pub fn apply_monitoring_patch(&self, patch: &MonitoringPatch) -> (MonitoringState, i64) {
        let mut guard = self.inner.write();
        guard.monitoring.merge(patch);
        let ts = guard.touch();
        (guard.monitoring.clone(), ts)
    }

    /// Replace the monitoring state wholesale (simulator path).
    ///
    /// Returns the new last-update timestamp.
    pub fn set_monitoring(&self, monitoring: MonitoringState) -> i64 {
        let mut guard = self.inner.write();
        guard.monitoring = monitoring;
        guard.touch()
    }

    /// Last-update timestamp in epoch milliseconds.
    pub fn last_update_ms(&self) -> i64 {
        self.inner.read().last_update_ms
    }

    /// Process uptime in whole seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
