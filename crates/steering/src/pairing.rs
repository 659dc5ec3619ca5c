//! Blue x yellow box pairing

use marker_detection::{BoundingBox, ClassDetections, MarkerClass, MarkerDetections};
use serde::{Deserialize, Serialize};
use tracing::trace;
use vehicle_state::VehicleState;

use crate::{RotationClass, SteeringInputs};

/// Which boxes take part in pairing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingPolicy {
    /// Every examined box, accepted or not
    #[default]
    AllContours,
    /// Only boxes above the area threshold
    AcceptedOnly,
}

impl PairingPolicy {
    fn boxes(self, detections: &ClassDetections) -> Vec<BoundingBox> {
        match self {
            PairingPolicy::AllContours => detections.examined.clone(),
            PairingPolicy::AcceptedOnly => detections.accepted().copied().collect(),
        }
    }
}

/// One steering estimate from one blue box and one yellow box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteeringObservation {
    pub blue: BoundingBox,
    pub yellow: BoundingBox,
    pub blue_bearing: f64,
    pub yellow_bearing: f64,
    pub rotation: RotationClass,
    pub steering: f64,
}

/// Observations for every pair, blue boxes in the outer loop.
///
/// A class without boxes yields nothing; bearings are never carried over
/// from an earlier frame.
pub fn observations(
    detections: &MarkerDetections,
    vehicle: VehicleState,
    policy: PairingPolicy,
) -> Vec<SteeringObservation> {
    let blue_boxes = policy.boxes(&detections.blue);
    let yellow_boxes = policy.boxes(&detections.yellow);

    let mut out = Vec::with_capacity(blue_boxes.len() * yellow_boxes.len());
    for blue in &blue_boxes {
        let blue_bearing = blue.bearing_for(MarkerClass::Blue);
        for yellow in &yellow_boxes {
            let yellow_bearing = yellow.bearing_for(MarkerClass::Yellow);
            let inputs = SteeringInputs::new(blue_bearing, yellow_bearing, vehicle);
            let observation = SteeringObservation {
                blue: *blue,
                yellow: *yellow,
                blue_bearing: inputs.blue_bearing,
                yellow_bearing: inputs.yellow_bearing,
                rotation: inputs.rotation,
                steering: inputs.steering(),
            };
            trace!(?observation, "Pair observed");
            out.push(observation);
        }
    }
    out
}
