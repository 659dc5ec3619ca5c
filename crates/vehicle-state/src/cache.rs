//! Latest-value cache shared between producers and the pipeline

use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use tracing::trace;

use crate::VehicleMessage;

/// Vehicle readings used by the steering heuristic
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// Pedal position request
    pub pedal_position: f64,
    /// Angular velocity around the vertical axis
    pub yaw_velocity: f64,
}

/// Last-write-wins holder for the vehicle readings.
///
/// Each field has its own lock. [`VehicleStateCache::snapshot`] reads the
/// fields one after the other, so a snapshot may combine values from
/// different producer generations.
#[derive(Debug, Default)]
pub struct VehicleStateCache {
    pedal_position: Mutex<f64>,
    yaw_velocity: Mutex<f64>,
    /// Latest ground steering request, kept for comparison only
    ground_steering: Mutex<Option<f64>>,
}

fn read<T: Copy>(cell: &Mutex<T>) -> T {
    *cell.lock().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(cell: &Mutex<T>, value: T) {
    *cell.lock().unwrap_or_else(PoisonError::into_inner) = value;
}

impl VehicleStateCache {
    /// Cache with zeroed readings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_pedal_position(&self, value: f64) {
        write(&self.pedal_position, value);
    }

    pub fn update_yaw_velocity(&self, value: f64) {
        write(&self.yaw_velocity, value);
    }

    pub fn record_ground_steering(&self, value: f64) {
        write(&self.ground_steering, Some(value));
    }

    /// Read both readings, one critical section per field
    pub fn snapshot(&self) -> VehicleState {
        let pedal_position = read(&self.pedal_position);
        let yaw_velocity = read(&self.yaw_velocity);
        VehicleState {
            pedal_position,
            yaw_velocity,
        }
    }

    /// Latest ground steering request, if one has arrived
    pub fn ground_steering(&self) -> Option<f64> {
        read(&self.ground_steering)
    }

    /// Route a producer message to the matching field
    pub fn apply(&self, message: &VehicleMessage) {
        trace!("Applying {:?}", message);
        match *message {
            VehicleMessage::PedalPosition { position } => self.update_pedal_position(position),
            VehicleMessage::AngularVelocity { z, .. } => self.update_yaw_velocity(z),
            VehicleMessage::GroundSteering { steering } => self.record_ground_steering(steering),
        }
    }
}
