//! Direction of travel around the track

use serde::{Deserialize, Serialize};

/// Rotation class inferred from one pair of bearings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationClass {
    Clockwise,
    CounterClockwise,
    /// Equal (or unordered) bearings; no direction assigned
    Unknown,
}

impl RotationClass {
    /// Yellow below blue is clockwise, yellow above blue counter-clockwise.
    ///
    /// NaN bearings compare neither way and classify as `Unknown`.
    pub fn classify(blue_bearing: f64, yellow_bearing: f64) -> Self {
        if yellow_bearing < blue_bearing {
            RotationClass::Clockwise
        } else if yellow_bearing > blue_bearing {
            RotationClass::CounterClockwise
        } else {
            RotationClass::Unknown
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RotationClass::Clockwise => "Clockwise",
            RotationClass::CounterClockwise => "Counter-Clockwise",
            RotationClass::Unknown => "Unknown",
        }
    }
}
