//! Calibrated steering heuristic
//!
//! The thresholds and coefficients below were fitted against recorded
//! drives and are applied as-is. The narrow yaw band is tested before the
//! negative outlier band, so any yaw in `[-8, 8)` yields the band value.

use serde::{Deserialize, Serialize};
use vehicle_state::VehicleState;

use crate::RotationClass;

/// Lower bound (inclusive) of the near-straight yaw band
pub const YAW_BAND_LOW: f64 = -8.0;
/// Upper bound (exclusive) of the near-straight yaw band
pub const YAW_BAND_HIGH: f64 = 8.0;
/// Yaw below which the vehicle is treated as turning hard
pub const YAW_HARD_TURN: f64 = -55.0;

pub const STEERING_IDLE: f64 = 0.0;
pub const STEERING_STRAIGHT: f64 = -0.02;
pub const STEERING_HARD_TURN: f64 = -0.3;

pub const SLOPE: f64 = 0.0641;
pub const INTERCEPT: f64 = 0.0387;

/// Everything the heuristic reads for one box pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteeringInputs {
    pub blue_bearing: f64,
    pub yellow_bearing: f64,
    pub rotation: RotationClass,
    pub vehicle: VehicleState,
}

impl SteeringInputs {
    /// Inputs with the rotation class derived from the two bearings
    pub fn new(blue_bearing: f64, yellow_bearing: f64, vehicle: VehicleState) -> Self {
        Self {
            blue_bearing,
            yellow_bearing,
            rotation: RotationClass::classify(blue_bearing, yellow_bearing),
            vehicle,
        }
    }

    pub fn steering(&self) -> f64 {
        steering_angle(self)
    }
}

/// Signed bearing difference for the rotation class and yaw direction
pub fn bearing_difference(
    rotation: RotationClass,
    blue_bearing: f64,
    yellow_bearing: f64,
    yaw_velocity: f64,
) -> f64 {
    match rotation {
        RotationClass::Clockwise if yaw_velocity <= 0.0 => blue_bearing - yellow_bearing,
        RotationClass::Clockwise => yellow_bearing - blue_bearing,
        RotationClass::CounterClockwise if yaw_velocity <= 0.0 => yellow_bearing - blue_bearing,
        RotationClass::CounterClockwise => blue_bearing - yellow_bearing,
        RotationClass::Unknown => 0.0,
    }
}

/// Piecewise steering value; NaN and infinite bearings propagate unclamped.
pub fn steering_angle(inputs: &SteeringInputs) -> f64 {
    let VehicleState {
        pedal_position,
        yaw_velocity,
    } = inputs.vehicle;

    if pedal_position == 0.0 {
        STEERING_IDLE
    } else if (YAW_BAND_LOW..YAW_BAND_HIGH).contains(&yaw_velocity) {
        STEERING_STRAIGHT
    } else if yaw_velocity < YAW_HARD_TURN {
        STEERING_HARD_TURN
    } else {
        let difference = bearing_difference(
            inputs.rotation,
            inputs.blue_bearing,
            inputs.yellow_bearing,
            yaw_velocity,
        );
        SLOPE * difference + INTERCEPT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn vehicle(pedal_position: f64, yaw_velocity: f64) -> VehicleState {
        VehicleState {
            pedal_position,
            yaw_velocity,
        }
    }

    #[test]
    fn test_idle_pedal_dominates() {
        let inputs = SteeringInputs::new(0.5, 0.2, vehicle(0.0, 10.0));
        assert_eq!(inputs.rotation, RotationClass::Clockwise);
        assert_eq!(inputs.steering(), 0.0);
    }

    #[test]
    fn test_clockwise_linear_branch() {
        let inputs = SteeringInputs::new(1.0, 0.4, vehicle(50.0, -20.0));
        assert_eq!(inputs.rotation, RotationClass::Clockwise);
        let expected = 0.0641 * (1.0 - 0.4) + 0.0387;
        assert_eq!(inputs.steering(), expected);
        assert!((inputs.steering() - 0.07716).abs() < 1e-12);
    }

    #[test]
    fn test_zero_yaw_is_in_straight_band() {
        let inputs = SteeringInputs::new(1.0, 0.4, vehicle(50.0, 0.0));
        assert_eq!(inputs.steering(), STEERING_STRAIGHT);
    }

    #[test]
    fn test_hard_turn() {
        for (blue, yellow) in [(1.0, 0.4), (0.1, 1.2), (0.3, 0.3)] {
            let inputs = SteeringInputs::new(blue, yellow, vehicle(50.0, -60.0));
            assert_eq!(inputs.steering(), STEERING_HARD_TURN);
        }
    }

    #[test]
    fn test_band_edges() {
        let at = |yaw| SteeringInputs::new(1.0, 0.4, vehicle(1.0, yaw)).steering();
        assert_eq!(at(-8.0), STEERING_STRAIGHT);
        assert_ne!(at(8.0), STEERING_STRAIGHT);
        assert_ne!(at(-55.0), STEERING_HARD_TURN);
        assert_eq!(at(-55.0001), STEERING_HARD_TURN);
    }

    #[test]
    fn test_difference_table() {
        use RotationClass::*;
        assert_eq!(bearing_difference(Clockwise, 1.0, 0.25, -1.0), 0.75);
        assert_eq!(bearing_difference(Clockwise, 1.0, 0.25, 1.0), -0.75);
        assert_eq!(bearing_difference(CounterClockwise, 0.25, 1.0, 0.0), 0.75);
        assert_eq!(bearing_difference(CounterClockwise, 0.25, 1.0, 9.0), -0.75);
        assert_eq!(bearing_difference(Unknown, 0.5, 0.5, 9.0), 0.0);
    }

    #[test]
    fn test_unknown_rotation_uses_intercept() {
        let inputs = SteeringInputs::new(0.5, 0.5, vehicle(10.0, 30.0));
        assert_eq!(inputs.rotation, RotationClass::Unknown);
        assert_eq!(inputs.steering(), INTERCEPT);
    }

    #[test]
    fn test_non_finite_bearings_propagate() {
        let inputs = SteeringInputs {
            blue_bearing: f64::INFINITY,
            yellow_bearing: 0.2,
            rotation: RotationClass::Clockwise,
            vehicle: vehicle(10.0, -20.0),
        };
        assert_eq!(inputs.steering(), f64::INFINITY);

        let nan = SteeringInputs::new(f64::NAN, 0.2, vehicle(10.0, 30.0));
        assert_eq!(nan.rotation, RotationClass::Unknown);
        assert_eq!(nan.steering(), INTERCEPT);
    }

    proptest! {
        #[test]
        fn idle_pedal_is_always_zero(
            blue in -1.6f64..1.6,
            yellow in -1.6f64..1.6,
            yaw in -500.0f64..500.0,
        ) {
            let inputs = SteeringInputs::new(blue, yellow, vehicle(0.0, yaw));
            prop_assert_eq!(inputs.steering(), 0.0);
        }

        #[test]
        fn straight_band_is_constant(
            blue in -1.6f64..1.6,
            yellow in -1.6f64..1.6,
            pedal in 0.001f64..100.0,
            yaw in -8.0f64..8.0,
        ) {
            let inputs = SteeringInputs::new(blue, yellow, vehicle(pedal, yaw));
            prop_assert_eq!(inputs.steering(), STEERING_STRAIGHT);
        }

        #[test]
        fn hard_turn_is_constant(
            blue in -1.6f64..1.6,
            yellow in -1.6f64..1.6,
            pedal in -100.0f64..-0.001,
            yaw in -1000.0f64..-55.0001,
        ) {
            let inputs = SteeringInputs::new(blue, yellow, vehicle(pedal, yaw));
            prop_assert_eq!(inputs.steering(), STEERING_HARD_TURN);
        }

        #[test]
        fn linear_branch_follows_difference(
            blue in -1.6f64..1.6,
            yellow in -1.6f64..1.6,
            pedal in 0.001f64..100.0,
            yaw in prop_oneof![8.0f64..500.0, -55.0f64..-8.0001],
        ) {
            let inputs = SteeringInputs::new(blue, yellow, vehicle(pedal, yaw));
            let difference = bearing_difference(inputs.rotation, blue, yellow, yaw);
            prop_assert_eq!(inputs.steering(), SLOPE * difference + INTERCEPT);
            // The sign table always yields a non-positive difference for
            // positive yaw and a non-negative one otherwise.
            if yaw > 0.0 {
                prop_assert!(difference <= 0.0);
            } else {
                prop_assert!(difference >= 0.0);
            }
        }
    }
}
