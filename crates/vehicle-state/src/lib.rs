//! Vehicle State
//!
//! Holds the last known pedal position and yaw velocity, written by
//! independent producer threads and read once per frame by the pipeline:
//! - [`VehicleStateCache`]: one exclusive critical section per field
//! - [`VehicleMessage`]: OpenDLV messages keyed by message id
//! - [`VehicleFeed`]: producer thread replaying a recorded message log

mod cache;
mod feed;
mod message;

pub use cache::{VehicleState, VehicleStateCache};
pub use feed::VehicleFeed;
pub use message::VehicleMessage;

use thiserror::Error;

/// Vehicle state error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VehicleStateError {
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Unknown message id {0}")]
    UnknownMessage(i32),

    #[error("Message {id} expects {expected} field(s), got {actual}")]
    FieldCount {
        id: i32,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid number '{0}'")]
    InvalidNumber(String),
}
