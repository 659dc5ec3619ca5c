//! Named shared frame area with an exclusive lease

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::{CameraError, VideoFrame};

#[derive(Debug)]
struct FrameSlot {
    data: Vec<u8>,
    timestamp_us: i64,
    sequence: u64,
    closed: bool,
}

/// Fixed-size frame area shared between one producer and the pipeline.
///
/// The producer overwrites the area in place and bumps the sequence number;
/// the consumer never sees a partially written frame because both sides go
/// through the same lock.
#[derive(Debug)]
pub struct SharedFrameBuffer {
    name: String,
    width: u32,
    height: u32,
    slot: Mutex<FrameSlot>,
    published: Condvar,
}

impl SharedFrameBuffer {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        let size = width as usize * height as usize * 4;
        Self {
            name: name.into(),
            width,
            height,
            slot: Mutex::new(FrameSlot {
                data: vec![0; size],
                timestamp_us: 0,
                sequence: 0,
                closed: false,
            }),
            published: Condvar::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Size of the area in bytes
    pub fn size(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    fn slot(&self) -> MutexGuard<'_, FrameSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy a BGRA frame into the area and wake the consumer
    pub fn publish(&self, pixels: &[u8], timestamp_us: i64) -> Result<u64, CameraError> {
        if pixels.len() != self.size() {
            return Err(CameraError::Buffer {
                expected: self.size(),
                actual: pixels.len(),
            });
        }

        let sequence = {
            let mut slot = self.slot();
            if slot.closed {
                return Err(CameraError::Closed);
            }
            slot.data.copy_from_slice(pixels);
            slot.timestamp_us = timestamp_us;
            slot.sequence += 1;
            slot.sequence
        };

        self.published.notify_all();
        Ok(sequence)
    }

    /// Mark the area as finished; waiting consumers return `None`
    pub fn close(&self) {
        self.slot().closed = true;
        self.published.notify_all();
        debug!("Shared frame area '{}' closed", self.name);
    }

    /// Block until a frame newer than `last_seen` is published.
    ///
    /// Returns the sequence number of that frame, or `None` once the area is
    /// closed and no newer frame remains.
    pub fn wait_for_frame(&self, last_seen: u64) -> Option<u64> {
        let slot = self
            .published
            .wait_while(self.slot(), |slot| {
                slot.sequence <= last_seen && !slot.closed
            })
            .unwrap_or_else(PoisonError::into_inner);

        if slot.sequence > last_seen {
            Some(slot.sequence)
        } else {
            None
        }
    }

    /// Take the exclusive lease; dropping the lease releases the area
    pub fn lock(&self) -> FrameLease<'_> {
        FrameLease {
            slot: self.slot(),
            width: self.width,
            height: self.height,
        }
    }
}

/// Exclusive access to the shared frame area
pub struct FrameLease<'a> {
    slot: MutexGuard<'a, FrameSlot>,
    width: u32,
    height: u32,
}

impl FrameLease<'_> {
    pub fn data(&self) -> &[u8] {
        &self.slot.data
    }

    pub fn timestamp_us(&self) -> i64 {
        self.slot.timestamp_us
    }

    pub fn sequence(&self) -> u64 {
        self.slot.sequence
    }

    /// Copy the pixels out of the area
    pub fn copy_frame(&self) -> VideoFrame {
        VideoFrame {
            data: self.slot.data.clone(),
            width: self.width,
            height: self.height,
            timestamp_us: self.slot.timestamp_us,
            sequence: self.slot.sequence,
        }
    }
}
