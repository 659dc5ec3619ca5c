//! Vehicle messages keyed by OpenDLV message id

use serde::{Deserialize, Serialize};

use crate::VehicleStateError;

/// Producer messages the pipeline consumes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VehicleMessage {
    /// opendlv.proxy.PedalPositionRequest
    PedalPosition { position: f64 },
    /// opendlv.proxy.AngularVelocityReading; `z` is the yaw velocity
    AngularVelocity { x: f64, y: f64, z: f64 },
    /// opendlv.proxy.GroundSteeringRequest
    GroundSteering { steering: f64 },
}

impl VehicleMessage {
    pub const ANGULAR_VELOCITY_READING_ID: i32 = 1044;
    pub const PEDAL_POSITION_REQUEST_ID: i32 = 1086;
    pub const GROUND_STEERING_REQUEST_ID: i32 = 1090;

    pub fn id(&self) -> i32 {
        match self {
            VehicleMessage::PedalPosition { .. } => Self::PEDAL_POSITION_REQUEST_ID,
            VehicleMessage::AngularVelocity { .. } => Self::ANGULAR_VELOCITY_READING_ID,
            VehicleMessage::GroundSteering { .. } => Self::GROUND_STEERING_REQUEST_ID,
        }
    }

    /// Decode a message from its id and field values
    pub fn from_fields(id: i32, fields: &[f64]) -> Result<Self, VehicleStateError> {
        let expected = match id {
            Self::PEDAL_POSITION_REQUEST_ID | Self::GROUND_STEERING_REQUEST_ID => 1,
            Self::ANGULAR_VELOCITY_READING_ID => 3,
            other => return Err(VehicleStateError::UnknownMessage(other)),
        };
        if fields.len() != expected {
            return Err(VehicleStateError::FieldCount {
                id,
                expected,
                actual: fields.len(),
            });
        }

        Ok(match id {
            Self::PEDAL_POSITION_REQUEST_ID => VehicleMessage::PedalPosition {
                position: fields[0],
            },
            Self::GROUND_STEERING_REQUEST_ID => VehicleMessage::GroundSteering {
                steering: fields[0],
            },
            _ => VehicleMessage::AngularVelocity {
                x: fields[0],
                y: fields[1],
                z: fields[2],
            },
        })
    }

    /// Parse a recorded feed line: `sample_time_us;message_id;field[;field...]`
    pub fn parse_record(line: &str) -> Result<(i64, Self), VehicleStateError> {
        let mut parts = line.trim().split(';').map(str::trim);

        let sample_time_us = parts
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| VehicleStateError::MalformedRecord(line.to_string()))?
            .parse::<i64>()
            .map_err(|_| VehicleStateError::MalformedRecord(line.to_string()))?;

        let id = parts
            .next()
            .ok_or_else(|| VehicleStateError::MalformedRecord(line.to_string()))?
            .parse::<i32>()
            .map_err(|_| VehicleStateError::MalformedRecord(line.to_string()))?;

        let fields = parts
            .map(|field| {
                field
                    .parse::<f64>()
                    .map_err(|_| VehicleStateError::InvalidNumber(field.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok((sample_time_us, Self::from_fields(id, &fields)?))
    }
}
