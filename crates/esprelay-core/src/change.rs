//! Validated control mutations.
//!
//! Control frames arrive as a loose `{type, id, value}` triple. The
//! conversion into [`ControlChange`] checks the id against the bounded
//! range for the kind and the value against the expected type, so
//! everything past this point is known-good.

use crate::error::{CoreError, Result};
use crate::ids::{PushButtonId, SliderId, ToggleId};
use crate::level::SliderLevel;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Kind discriminator carried in the `type` field of control frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ControlKind {
    PushButton,
    Toggle,
    Slider,
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PushButton => write!(f, "pushButton"),
            Self::Toggle => write!(f, "toggle"),
            Self::Slider => write!(f, "slider"),
        }
    }
}

/// A validated control mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlChange {
    PushButton { id: PushButtonId, pressed: bool },
    Toggle { id: ToggleId, on: bool },
    Slider { id: SliderId, level: SliderLevel },
}

impl ControlChange {
    /// Validate a raw wire triple into a typed change.
    ///
    /// Buttons and toggles take booleans; sliders take integers in
    /// 0..=100. Anything else is rejected.
    pub fn from_wire(kind: ControlKind, id: u8, value: &Value) -> Result<Self> {
        match kind {
            ControlKind::PushButton => {
                let id = PushButtonId::from_wire(id).ok_or(CoreError::UnknownId {
                    kind: "pushButton",
                    id,
                })?;
                let pressed = value.as_bool().ok_or_else(|| CoreError::InvalidValue {
                    kind: "pushButton",
                    id: id.wire_id(),
                    detail: format!("expected boolean, got {value}"),
                })?;
                Ok(Self::PushButton { id, pressed })
            }
            ControlKind::Toggle => {
                let id = ToggleId::from_wire(id).ok_or(CoreError::UnknownId {
                    kind: "toggle",
                    id,
                })?;
                let on = value.as_bool().ok_or_else(|| CoreError::InvalidValue {
                    kind: "toggle",
                    id: id.wire_id(),
                    detail: format!("expected boolean, got {value}"),
                })?;
                Ok(Self::Toggle { id, on })
            }
            ControlKind::Slider => {
                let id = SliderId::from_wire(id).ok_or(CoreError::UnknownId {
                    kind: "slider",
                    id,
                })?;
                let raw = value
                    .as_u64()
                    .and_then(|v| u8::try_from(v).ok())
                    .ok_or_else(|| CoreError::InvalidValue {
                        kind: "slider",
                        id: id.wire_id(),
                        detail: format!("expected integer 0..=100, got {value}"),
                    })?;
                let level = SliderLevel::new(raw)?;
                Ok(Self::Slider { id, level })
            }
        }
    }

    /// Kind discriminator for the wire `type` field.
    pub fn kind(&self) -> ControlKind {
        match self {
            Self::PushButton { .. } => ControlKind::PushButton,
            Self::Toggle { .. } => ControlKind::Toggle,
            Self::Slider { .. } => ControlKind::Slider,
        }
    }

    /// The 1-based wire id of the changed field.
    pub fn wire_id(&self) -> u8 {
        match self {
            Self::PushButton { id, .. } => id.wire_id(),
            Self::Toggle { id, .. } => id.wire_id(),
            Self::Slider { id, .. } => id.wire_id(),
        }
    }

    /// The wire value as JSON.
    pub fn value_json(&self) -> Value {
        match self {
            Self::PushButton { pressed, .. } => Value::Bool(*pressed),
            Self::Toggle { on, .. } => Value::Bool(*on),
            Self::Slider { level, .. } => Value::from(level.value()),
        }
    }
}
