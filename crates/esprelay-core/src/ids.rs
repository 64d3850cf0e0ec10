//! Bounded identifiers for the fixed control and monitoring field sets.
//!
//! The wire protocol addresses every field by a small 1-based numeric id
//! ("1".."4" as JSON keys). Modelling each id set as an enum makes the
//! valid range explicit and lets state containers use fixed arrays
//! indexed by `index()` instead of open-ended maps.

use std::fmt;

/// Push button identifier (wire ids 1..=2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PushButtonId {
    One,
    Two,
}

impl PushButtonId {
    /// All push button ids in wire order.
    pub const ALL: [Self; 2] = [Self::One, Self::Two];

    /// Parse a 1-based wire id.
    pub fn from_wire(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            _ => None,
        }
    }

    /// The 1-based wire id used in JSON keys.
    pub fn wire_id(&self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    /// Zero-based array index.
    pub fn index(&self) -> usize {
        (self.wire_id() - 1) as usize
    }
}

impl fmt::Display for PushButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_id())
    }
}

/// Toggle switch identifier (wire ids 1..=2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleId {
    One,
    Two,
}

impl ToggleId {
    /// All toggle ids in wire order.
    pub const ALL: [Self; 2] = [Self::One, Self::Two];

    /// Parse a 1-based wire id.
    pub fn from_wire(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            _ => None,
        }
    }

    /// The 1-based wire id used in JSON keys.
    pub fn wire_id(&self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    /// Zero-based array index.
    pub fn index(&self) -> usize {
        (self.wire_id() - 1) as usize
    }
}

impl fmt::Display for ToggleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_id())
    }
}

/// Slider identifier (wire ids 1..=4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SliderId {
    One,
    Two,
    Three,
    Four,
}

impl SliderId {
    /// All slider ids in wire order.
    pub const ALL: [Self; 4] = [Self::One, Self::Two, Self::Three, Self::Four];

    /// Parse a 1-based wire id.
    pub fn from_wire(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            4 => Some(Self::Four),
            _ => None,
        }
    }

    /// The 1-based wire id used in JSON keys.
    pub fn wire_id(&self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
        }
    }

    /// Zero-based array index.
    pub fn index(&self) -> usize {
        (self.wire_id() - 1) as usize
    }
}

impl fmt::Display for SliderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_id())
    }
}

/// Indicator lamp identifier (wire ids 1..=4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorId {
    One,
    Two,
    Three,
    Four,
}

impl IndicatorId {
    /// All indicator ids in wire order.
    pub const ALL: [Self; 4] = [Self::One, Self::Two, Self::Three, Self::Four];

    /// Parse a 1-based wire id.
    pub fn from_wire(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            4 => Some(Self::Four),
            _ => None,
        }
    }

    /// The 1-based wire id used in JSON keys.
    pub fn wire_id(&self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
        }
    }

    /// Zero-based array index.
    pub fn index(&self) -> usize {
        (self.wire_id() - 1) as usize
    }
}

impl fmt::Display for IndicatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_id())
    }
}

/// Gauge identifier (wire ids 1..=2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GaugeId {
    One,
    Two,
}

impl GaugeId {
    /// All gauge ids in wire order.
    pub const ALL: [Self; 2] = [Self::One, Self::Two];

    /// Parse a 1-based wire id.
    pub fn from_wire(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            _ => None,
        }
    }

    /// The 1-based wire id used in JSON keys.
    pub fn wire_id(&self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    /// Zero-based array index.
    pub fn index(&self) -> usize {
        (self.wire_id() - 1) as usize
    }
}

impl fmt::Display for GaugeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_id())
    }
}

/// Numeric variable identifier (wire ids 1..=2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableId {
    One,
    Two,
}

impl VariableId {
    /// All variable ids in wire order.
    pub const ALL: [Self; 2] = [Self::One, Self::Two];

    /// Parse a 1-based wire id.
    pub fn from_wire(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            _ => None,
        }
    }

    /// The 1-based wire id used in JSON keys.
    pub fn wire_id(&self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    /// Zero-based array index.
    pub fn index(&self) -> usize {
        (self.wire_id() - 1) as usize
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_wire_round_trip() {
        for id in SliderId::ALL {
            assert_eq!(SliderId::from_wire(id.wire_id()), Some(id));
        }
        for id in IndicatorId::ALL {
            assert_eq!(IndicatorId::from_wire(id.wire_id()), Some(id));
        }
    }

    #[test]
    fn test_from_wire_out_of_range() {
        assert_eq!(PushButtonId::from_wire(0), None);
        assert_eq!(PushButtonId::from_wire(3), None);
        assert_eq!(SliderId::from_wire(5), None);
        assert_eq!(GaugeId::from_wire(3), None);
        assert_eq!(VariableId::from_wire(255), None);
    }

    #[test]
    fn test_index_matches_wire_order() {
        assert_eq!(SliderId::One.index(), 0);
        assert_eq!(SliderId::Four.index(), 3);
        assert_eq!(IndicatorId::Three.index(), 2);
    }

    #[test]
    fn test_display_is_wire_id() {
        assert_eq!(ToggleId::Two.to_string(), "2");
        assert_eq!(SliderId::Four.to_string(), "4");
    }
}
