//! Frame sources consumed by the orchestrator

use std::sync::Arc;

use tracing::debug;

use crate::{CameraError, SharedFrameBuffer, VideoFrame};

/// A blocking supplier of frames
pub trait FrameSource {
    /// Block until the next frame is available and return a private copy of it.
    ///
    /// `Ok(None)` means the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<VideoFrame>, CameraError>;
}

/// Reads frames out of a [`SharedFrameBuffer`]
pub struct SharedMemorySource {
    buffer: Arc<SharedFrameBuffer>,
    last_sequence: u64,
}

impl SharedMemorySource {
    pub fn attach(buffer: Arc<SharedFrameBuffer>) -> Self {
        debug!(
            "Attached to shared frame area '{}' ({} bytes)",
            buffer.name(),
            buffer.size()
        );
        Self {
            buffer,
            last_sequence: 0,
        }
    }

    pub fn buffer(&self) -> &SharedFrameBuffer {
        &self.buffer
    }
}

impl FrameSource for SharedMemorySource {
    fn next_frame(&mut self) -> Result<Option<VideoFrame>, CameraError> {
        if self.buffer.wait_for_frame(self.last_sequence).is_none() {
            return Ok(None);
        }

        // The lease lives only for the copy.
        let frame = self.buffer.lock().copy_frame();

        let skipped = frame.sequence - self.last_sequence - 1;
        if skipped > 0 {
            debug!("Skipped {} frame(s) published since the last read", skipped);
        }
        self.last_sequence = frame.sequence;
        Ok(Some(frame))
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<Option<VideoFrame>, CameraError> {
        (**self).next_frame()
    }
}
