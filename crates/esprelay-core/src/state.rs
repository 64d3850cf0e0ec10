//! Control and monitoring state containers.
//!
//! Both halves of the shared state are fixed-shape records indexed by the
//! bounded ids from [`crate::ids`]. On the wire they appear as the
//! string-keyed maps the UI and device expect
//! (`{"pushButtons":{"1":false,...},...}`); conversion in either
//! direction validates every key and value.

use crate::change::ControlChange;
use crate::error::{CoreError, Result};
use crate::ids::{GaugeId, IndicatorId, PushButtonId, SliderId, ToggleId, VariableId};
use crate::level::{GaugeLevel, SliderLevel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn parse_wire_key(kind: &'static str, key: &str) -> Result<u8> {
    key.parse::<u8>().map_err(|_| {
        CoreError::MalformedState(format!("{kind} key '{key}' is not a numeric id"))
    })
}

/// Commanded state: push buttons, toggles, and sliders.
///
/// Mutated by real-time clients and the device, read by everyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ControlStateWire", try_from = "ControlStateWire")]
pub struct ControlState {
    push_buttons: [bool; 2],
    toggles: [bool; 2],
    sliders: [SliderLevel; 4],
}

impl ControlState {
    /// Apply a validated control change to this state.
    pub fn apply(&mut self, change: &ControlChange) {
        match *change {
            ControlChange::PushButton { id, pressed } => {
                self.push_buttons[id.index()] = pressed;
            }
            ControlChange::Toggle { id, on } => {
                self.toggles[id.index()] = on;
            }
            ControlChange::Slider { id, level } => {
                self.sliders[id.index()] = level;
            }
        }
    }

    pub fn push_button(&self, id: PushButtonId) -> bool {
        self.push_buttons[id.index()]
    }

    pub fn toggle(&self, id: ToggleId) -> bool {
        self.toggles[id.index()]
    }

    pub fn slider(&self, id: SliderId) -> SliderLevel {
        self.sliders[id.index()]
    }
}

impl Default for ControlState {
    /// Startup defaults: buttons and toggles off, sliders mid travel.
    fn default() -> Self {
        Self {
            push_buttons: [false; 2],
            toggles: [false; 2],
            sliders: [SliderLevel::DEFAULT; 4],
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ControlStateWire {
    push_buttons: BTreeMap<String, bool>,
    toggles: BTreeMap<String, bool>,
    sliders: BTreeMap<String, u8>,
}

impl From<ControlState> for ControlStateWire {
    fn from(state: ControlState) -> Self {
        Self {
            push_buttons: PushButtonId::ALL
                .iter()
                .map(|id| (id.wire_id().to_string(), state.push_buttons[id.index()]))
                .collect(),
            toggles: ToggleId::ALL
                .iter()
                .map(|id| (id.wire_id().to_string(), state.toggles[id.index()]))
                .collect(),
            sliders: SliderId::ALL
                .iter()
                .map(|id| (id.wire_id().to_string(), state.sliders[id.index()].value()))
                .collect(),
        }
    }
}

impl TryFrom<ControlStateWire> for ControlState {
    type Error = CoreError;

    fn try_from(wire: ControlStateWire) -> Result<Self> {
        let mut state = Self::default();

        for key in wire.push_buttons.keys() {
            let raw = parse_wire_key("pushButton", key)?;
            PushButtonId::from_wire(raw).ok_or(CoreError::UnknownId {
                kind: "pushButton",
                id: raw,
            })?;
        }
        for id in PushButtonId::ALL {
            let key = id.wire_id().to_string();
            let value = wire.push_buttons.get(&key).ok_or_else(|| {
                CoreError::MalformedState(format!("missing pushButton {id}"))
            })?;
            state.push_buttons[id.index()] = *value;
        }

        for key in wire.toggles.keys() {
            let raw = parse_wire_key("toggle", key)?;
            ToggleId::from_wire(raw).ok_or(CoreError::UnknownId {
                kind: "toggle",
                id: raw,
            })?;
        }
        for id in ToggleId::ALL {
            let key = id.wire_id().to_string();
            let value = wire
                .toggles
                .get(&key)
                .ok_or_else(|| CoreError::MalformedState(format!("missing toggle {id}")))?;
            state.toggles[id.index()] = *value;
        }

        for key in wire.sliders.keys() {
            let raw = parse_wire_key("slider", key)?;
            SliderId::from_wire(raw).ok_or(CoreError::UnknownId {
                kind: "slider",
                id: raw,
            })?;
        }
        for id in SliderId::ALL {
            let key = id.wire_id().to_string();
            let value = wire
                .sliders
                .get(&key)
                .ok_or_else(|| CoreError::MalformedState(format!("missing slider {id}")))?;
            state.sliders[id.index()] = SliderLevel::new(*value)?;
        }

        Ok(state)
    }
}

/// Observed state: indicators, gauges, and numeric variables.
///
/// Mutated by the device (HTTP push) or the simulator, read by everyone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "MonitoringStateWire", try_from = "MonitoringStateWire")]
pub struct MonitoringState {
    indicators: [bool; 4],
    gauges: [GaugeLevel; 2],
    variables: [f64; 2],
}

impl MonitoringState {
    /// Build a state from complete per-field arrays (simulator path).
    pub fn from_parts(
        indicators: [bool; 4],
        gauges: [GaugeLevel; 2],
        variables: [f64; 2],
    ) -> Self {
        Self {
            indicators,
            gauges,
            variables,
        }
    }

    /// Merge a partial patch into this state.
    ///
    /// Only the entries present in the patch change; everything else
    /// retains its prior value.
    pub fn merge(&mut self, patch: &MonitoringPatch) {
        for (id, value) in &patch.indicators {
            self.indicators[id.index()] = *value;
        }
        for (id, level) in &patch.gauges {
            self.gauges[id.index()] = *level;
        }
        for (id, value) in &patch.variables {
            self.variables[id.index()] = *value;
        }
    }

    pub fn indicator(&self, id: IndicatorId) -> bool {
        self.indicators[id.index()]
    }

    pub fn gauge(&self, id: GaugeId) -> GaugeLevel {
        self.gauges[id.index()]
    }

    pub fn variable(&self, id: VariableId) -> f64 {
        self.variables[id.index()]
    }
}

impl Default for MonitoringState {
    /// Startup defaults: indicators off, gauges zero, variables 0.00.
    fn default() -> Self {
        Self {
            indicators: [false; 4],
            gauges: [GaugeLevel::MIN; 2],
            variables: [0.0; 2],
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct MonitoringStateWire {
    indicators: BTreeMap<String, bool>,
    gauges: BTreeMap<String, u8>,
    variables: BTreeMap<String, f64>,
}

impl From<MonitoringState> for MonitoringStateWire {
    fn from(state: MonitoringState) -> Self {
        Self {
            indicators: IndicatorId::ALL
                .iter()
                .map(|id| (id.wire_id().to_string(), state.indicators[id.index()]))
                .collect(),
            gauges: GaugeId::ALL
                .iter()
                .map(|id| (id.wire_id().to_string(), state.gauges[id.index()].value()))
                .collect(),
            variables: VariableId::ALL
                .iter()
                .map(|id| (id.wire_id().to_string(), state.variables[id.index()]))
                .collect(),
        }
    }
}

impl TryFrom<MonitoringStateWire> for MonitoringState {
    type Error = CoreError;

    fn try_from(wire: MonitoringStateWire) -> Result<Self> {
        let mut state = Self::default();

        for key in wire.indicators.keys() {
            let raw = parse_wire_key("indicator", key)?;
            IndicatorId::from_wire(raw).ok_or(CoreError::UnknownId {
                kind: "indicator",
                id: raw,
            })?;
        }
        for id in IndicatorId::ALL {
            let key = id.wire_id().to_string();
            let value = wire.indicators.get(&key).ok_or_else(|| {
                CoreError::MalformedState(format!("missing indicator {id}"))
            })?;
            state.indicators[id.index()] = *value;
        }

        for key in wire.gauges.keys() {
            let raw = parse_wire_key("gauge", key)?;
            GaugeId::from_wire(raw).ok_or(CoreError::UnknownId {
                kind: "gauge",
                id: raw,
            })?;
        }
        for id in GaugeId::ALL {
            let key = id.wire_id().to_string();
            let value = wire
                .gauges
                .get(&key)
                .ok_or_else(|| CoreError::MalformedState(format!("missing gauge {id}")))?;
            state.gauges[id.index()] = GaugeLevel::new(*value)?;
        }

        for key in wire.variables.keys() {
            let raw = parse_wire_key("variable", key)?;
            VariableId::from_wire(raw).ok_or(CoreError::UnknownId {
                kind: "variable",
                id: raw,
            })?;
        }
        for id in VariableId::ALL {
            let key = id.wire_id().to_string();
            let value = wire
                .variables
                .get(&key)
                .ok_or_else(|| CoreError::MalformedState(format!("missing variable {id}")))?;
            state.variables[id.index()] = *value;
        }

        Ok(state)
    }
}

/// Partial monitoring update, as posted by the device.
///
/// Each section is optional; within a section only the listed entries
/// are touched. Unknown ids and out-of-range values are rejected at
/// deserialization time.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "MonitoringPatchWire")]
pub struct MonitoringPatch {
    pub indicators: Vec<(IndicatorId, bool)>,
    pub gauges: Vec<(GaugeId, GaugeLevel)>,
    pub variables: Vec<(VariableId, f64)>,
}

impl MonitoringPatch {
    /// True when the patch carries no entries at all.
    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty() && self.gauges.is_empty() && self.variables.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MonitoringPatchWire {
    #[serde(default)]
    indicators: Option<BTreeMap<String, bool>>,
    #[serde(default)]
    gauges: Option<BTreeMap<String, u8>>,
    #[serde(default)]
    variables: Option<BTreeMap<String, f64>>,
}

impl TryFrom<MonitoringPatchWire> for MonitoringPatch {
    type Error = CoreError;

    fn try_from(wire: MonitoringPatchWire) -> Result<Self> {
        let mut patch = Self::default();

        for (key, value) in wire.indicators.unwrap_or_default() {
            let raw = parse_wire_key("indicator", &key)?;
            let id = IndicatorId::from_wire(raw).ok_or(CoreError::UnknownId {
                kind: "indicator",
                id: raw,
            })?;
            patch.indicators.push((id, value));
        }

        for (key, value) in wire.gauges.unwrap_or_default() {
            let raw = parse_wire_key("gauge", &key)?;
            let id = GaugeId::from_wire(raw).ok_or(CoreError::UnknownId {
                kind: "gauge",
                id: raw,
            })?;
            patch.gauges.push((id, GaugeLevel::new(value)?));
        }

        for (key, value) in wire.variables.unwrap_or_default() {
            let raw = parse_wire_key("variable", &key)?;
            let id = VariableId::from_wire(raw).ok_or(CoreError::UnknownId {
                kind: "variable",
                id: raw,
            })?;
            patch.variables.push((id, value));
        }

        Ok(patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_control_state_wire_shape() {
        let value = serde_json::to_value(ControlState::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "pushButtons": {"1": false, "2": false},
                "toggles": {"1": false, "2": false},
                "sliders": {"1": 50, "2": 50, "3": 50, "4": 50},
            })
        );
    }

    #[test]
    fn test_monitoring_state_wire_shape() {
        let value = serde_json::to_value(MonitoringState::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "indicators": {"1": false, "2": false, "3": false, "4": false},
                "gauges": {"1": 0, "2": 0},
                "variables": {"1": 0.0, "2": 0.0},
            })
        );
    }

    #[test]
    fn test_control_state_round_trip() {
        let mut state = ControlState::default();
        state.apply(&ControlChange::Toggle {
            id: ToggleId::One,
            on: true,
        });
        state.apply(&ControlChange::Slider {
            id: SliderId::Three,
            level: SliderLevel::new(80).unwrap(),
        });

        let json = serde_json::to_string(&state).unwrap();
        let back: ControlState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
        assert!(back.toggle(ToggleId::One));
        assert_eq!(back.slider(SliderId::Three).value(), 80);
    }

    #[test]
    fn test_control_state_rejects_unknown_id() {
        let bad = json!({
            "pushButtons": {"1": false, "2": false, "3": true},
            "toggles": {"1": false, "2": false},
            "sliders": {"1": 50, "2": 50, "3": 50, "4": 50},
        });
        let result: std::result::Result<ControlState, _> = serde_json::from_value(bad);
        assert!(result.is_err());
    }

    #[test]
    fn test_monitoring_merge_leaves_rest_untouched() {
        let mut state = MonitoringState::from_parts(
            [true, false, true, false],
            [GaugeLevel::new(10).unwrap(), GaugeLevel::new(20).unwrap()],
            [1.5, 2.5],
        );
        let patch: MonitoringPatch =
            serde_json::from_value(json!({"gauges": {"1": 75}})).unwrap();
        state.merge(&patch);

        assert_eq!(state.gauge(GaugeId::One).value(), 75);
        assert_eq!(state.gauge(GaugeId::Two).value(), 20);
        assert!(state.indicator(IndicatorId::One));
        assert_eq!(state.variable(VariableId::Two), 2.5);
    }

    #[test]
    fn test_patch_rejects_out_of_range_gauge() {
        let result: std::result::Result<MonitoringPatch, _> =
            serde_json::from_value(json!({"gauges": {"1": 140}}));
        assert!(result.is_err());
    }

    #[test]
    fn test_patch_rejects_unknown_indicator() {
        let result: std::result::Result<MonitoringPatch, _> =
            serde_json::from_value(json!({"indicators": {"9": true}}));
        assert!(result.is_err());
    }

    #[test]
    fn test_patch_rejects_non_numeric_key() {
        let result: std::result::Result<MonitoringPatch, _> =
            serde_json::from_value(json!({"variables": {"first": 1.0}}));
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_patch() {
        let patch: MonitoringPatch = serde_json::from_value(json!({})).unwrap();
        assert!(patch.is_empty());
    }
}
