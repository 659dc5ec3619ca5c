//! Camera Capture Library for the Ground Steering Pipeline
//!
//! Frames reach the pipeline through a named, fixed-size shared frame area:
//! - a producer publishes BGRA pixels into a [`SharedFrameBuffer`]
//! - the consumer waits for a new frame, takes the exclusive lease,
//!   copies the pixels out and releases the lease
//! - [`ImageSequencePublisher`] replays a directory of recorded frames

pub mod frame;
pub mod replay;
pub mod shared;
pub mod source;

pub use frame::{PixelFormat, VideoFrame};
pub use replay::{ImageSequencePublisher, PublisherHandle};
pub use shared::{FrameLease, SharedFrameBuffer};
pub use source::{FrameSource, SharedMemorySource};

use thiserror::Error;

/// Camera error types
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Failed to open frame source: {0}")]
    Open(String),

    #[error("Frame buffer size mismatch: expected {expected} bytes, got {actual}")]
    Buffer { expected: usize, actual: usize },

    #[error("Frame source closed")]
    Closed,

    #[error("Failed to decode frame {path}: {reason}")]
    Decode { path: String, reason: String },
}
