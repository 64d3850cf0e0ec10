//! Core domain types for the esprelay telemetry/control relay.
//!
//! This crate provides fundamental types used throughout the relay:
//! - `PushButtonId`, `ToggleId`, `SliderId`, `IndicatorId`, `GaugeId`,
//!   `VariableId`: bounded identifiers matching the wire id sets
//! - `SliderLevel`, `GaugeLevel`: range-checked percent values
//! - `ControlState`, `MonitoringState`: the two halves of the shared state
//! - `ControlChange`, `MonitoringPatch`: validated mutation inputs

pub mod change;
pub mod error;
pub mod ids;
pub mod level;
pub mod state;

pub use change::{ControlChange, ControlKind};
pub use error::{CoreError, Result};
pub use ids::{GaugeId, IndicatorId, PushButtonId, SliderId, ToggleId, VariableId};
pub use level::{GaugeLevel, SliderLevel};
pub use state::{ControlState, MonitoringPatch, MonitoringState};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a connected real-time client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(uuid::Uuid);

impl ClientId {
    /// Generate a fresh client id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
