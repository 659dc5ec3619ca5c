//! Replay of recorded frames into a shared frame area

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use image::imageops::{self, FilterType};
use tracing::{debug, info, warn};

use crate::{CameraError, SharedFrameBuffer, VideoFrame};

const FRAME_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Publishes a directory of recorded frames, in lexical order, at a fixed rate
pub struct ImageSequencePublisher {
    frames: Vec<PathBuf>,
    buffer: Arc<SharedFrameBuffer>,
    interval: Duration,
}

impl ImageSequencePublisher {
    /// Collect the frames of `dir`; a missing or empty directory cannot be attached
    pub fn open(dir: &Path, buffer: Arc<SharedFrameBuffer>, fps: u32) -> Result<Self, CameraError> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| CameraError::Open(format!("{}: {}", dir.display(), e)))?;

        let mut frames: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_frame_file(path))
            .collect();
        frames.sort();

        if frames.is_empty() {
            return Err(CameraError::Open(format!(
                "{}: no recorded frames",
                dir.display()
            )));
        }

        info!(
            "Replaying {} frame(s) from {} at {} fps",
            frames.len(),
            dir.display(),
            fps
        );

        Ok(Self {
            frames,
            buffer,
            interval: Duration::from_micros(1_000_000 / u64::from(fps.max(1))),
        })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Load one recorded frame as BGRA at the area's dimensions
    pub fn load(&self, path: &Path, timestamp_us: i64, sequence: u64) -> Result<VideoFrame, CameraError> {
        let image = image::open(path).map_err(|e| CameraError::Decode {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let mut rgb = image.to_rgb8();

        let (width, height) = (self.buffer.width(), self.buffer.height());
        if rgb.dimensions() != (width, height) {
            debug!(
                "Resizing {} from {:?} to {}x{}",
                path.display(),
                rgb.dimensions(),
                width,
                height
            );
            rgb = imageops::resize(&rgb, width, height, FilterType::Triangle);
        }

        Ok(VideoFrame::from_rgb_image(&rgb, timestamp_us, sequence))
    }

    /// Start publishing on a dedicated thread; the area is closed after the last frame
    pub fn spawn(self) -> PublisherHandle {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let buffer = Arc::clone(&self.buffer);

        let thread = std::thread::spawn(move || {
            let wall_start = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_micros() as i64)
                .unwrap_or(0);
            let start = Instant::now();

            for (index, path) in self.frames.iter().enumerate() {
                if shutdown_clone.load(Ordering::SeqCst) {
                    break;
                }

                // Monotonic clock on a wall-clock origin keeps timestamps non-decreasing.
                let timestamp_us = wall_start + start.elapsed().as_micros() as i64;
                match self.load(path, timestamp_us, index as u64) {
                    Ok(frame) => {
                        if let Err(e) = self.buffer.publish(&frame.data, frame.timestamp_us) {
                            warn!("Failed to publish {}: {}", path.display(), e);
                            break;
                        }
                    }
                    Err(e) => warn!("Skipping recorded frame: {}", e),
                }

                std::thread::sleep(self.interval);
            }

            self.buffer.close();
            debug!("Frame replay finished");
        });

        PublisherHandle {
            shutdown,
            buffer,
            thread: Some(thread),
        }
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Running replay; stops and closes the area when dropped
pub struct PublisherHandle {
    shutdown: Arc<AtomicBool>,
    buffer: Arc<SharedFrameBuffer>,
    thread: Option<JoinHandle<()>>,
}

impl PublisherHandle {
    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.buffer.close();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Frame replay thread panicked");
            }
        }
    }
}

impl Drop for PublisherHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
