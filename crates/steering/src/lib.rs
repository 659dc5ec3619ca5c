//! Ground Steering Estimation
//!
//! Turns pairs of blue and yellow marker boxes into steering values:
//! - rotation direction from the two bearings
//! - calibrated piecewise heuristic over bearing difference, pedal
//!   position and yaw velocity
//! - one observation per blue x yellow box pair

mod heuristic;
mod pairing;
mod rotation;

pub use heuristic::{bearing_difference, steering_angle, SteeringInputs};
pub use pairing::{observations, PairingPolicy, SteeringObservation};
pub use rotation::RotationClass;
