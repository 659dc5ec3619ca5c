//! Frame Orchestrator
//!
//! Drives one iteration per frame: wait for a frame, snapshot the vehicle
//! state, detect markers, emit one steering value per blue x yellow box
//! pair, then hand the frame to the optional render sink.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use camera_capture::{CameraError, FrameSource, SharedFrameBuffer, VideoFrame};
use marker_detection::MarkerDetector;
use serde::Serialize;
use steering::{observations, PairingPolicy, RotationClass};
use tracing::{debug, info, warn};
use vehicle_state::VehicleStateCache;

use crate::output::OutputSink;
use crate::render::RenderSink;
use crate::PipelineError;

/// Orchestrator loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    WaitingForFrame,
    Processing,
    Stopped,
}

/// Shared "session active" signal.
///
/// Ending the session also closes the attached frame area, so a loop blocked
/// waiting for a frame wakes up and stops.
#[derive(Debug, Clone)]
pub struct Session {
    active: Arc<AtomicBool>,
    buffer: Option<Arc<SharedFrameBuffer>>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
            buffer: None,
        }
    }

    pub fn with_buffer(buffer: Arc<SharedFrameBuffer>) -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
            buffer: Some(buffer),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn end(&self) {
        self.active.store(false, Ordering::SeqCst);
        if let Some(buffer) = &self.buffer {
            buffer.close();
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters reported when the loop stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Frames processed
    pub frames: u64,
    /// Steering values written
    pub emissions: u64,
    /// Frames where at least one class had no boxes to pair
    pub frames_without_pairs: u64,
    /// Frames published by the source but never read
    pub skipped_frames: u64,
    pub clockwise_pairs: u64,
    pub counter_clockwise_pairs: u64,
}

pub struct FrameOrchestrator<S, O> {
    source: S,
    detector: MarkerDetector,
    cache: Arc<VehicleStateCache>,
    output: O,
    render: Option<Box<dyn RenderSink + Send>>,
    policy: PairingPolicy,
    session: Session,
    state: OrchestratorState,
    last_sequence: Option<u64>,
    summary: RunSummary,
}

impl<S: FrameSource, O: OutputSink> FrameOrchestrator<S, O> {
    pub fn new(
        source: S,
        detector: MarkerDetector,
        cache: Arc<VehicleStateCache>,
        output: O,
        session: Session,
    ) -> Self {
        Self {
            source,
            detector,
            cache,
            output,
            render: None,
            policy: PairingPolicy::default(),
            session,
            state: OrchestratorState::WaitingForFrame,
            last_sequence: None,
            summary: RunSummary::default(),
        }
    }

    pub fn with_policy(mut self, policy: PairingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_render(mut self, render: Box<dyn RenderSink + Send>) -> Self {
        self.render = Some(render);
        self
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn into_output(self) -> O {
        self.output
    }

    /// Loop until the session ends or the source is exhausted
    pub fn run(&mut self) -> Result<RunSummary, PipelineError> {
        info!("Frame orchestrator started ({:?})", self.policy);

        while self.session.is_active() {
            self.state = OrchestratorState::WaitingForFrame;
            let frame = match self.source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) | Err(CameraError::Closed) => {
                    debug!("Frame source exhausted");
                    break;
                }
                Err(e) => {
                    self.state = OrchestratorState::Stopped;
                    return Err(PipelineError::AdapterUnavailable(e));
                }
            };

            if !self.session.is_active() {
                break;
            }

            self.state = OrchestratorState::Processing;
            if let Err(e) = self.process_frame(&frame) {
                self.state = OrchestratorState::Stopped;
                return Err(e);
            }
        }

        self.state = OrchestratorState::Stopped;
        let s = self.summary;
        info!(
            frames = s.frames,
            emissions = s.emissions,
            frames_without_pairs = s.frames_without_pairs,
            skipped_frames = s.skipped_frames,
            clockwise_pairs = s.clockwise_pairs,
            counter_clockwise_pairs = s.counter_clockwise_pairs,
            "Frame orchestrator stopped"
        );
        Ok(s)
    }

    /// Process one frame and return the number of values emitted
    pub fn process_frame(&mut self, frame: &VideoFrame) -> Result<usize, PipelineError> {
        if let Some(previous) = self.last_sequence {
            self.summary.skipped_frames += frame.sequence.saturating_sub(previous + 1);
        }
        self.last_sequence = Some(frame.sequence);

        let vehicle = self.cache.snapshot();
        let detections = self.detector.detect(frame);
        let pairs = observations(&detections, vehicle, self.policy);

        for pair in &pairs {
            self.output
                .emit(frame.timestamp_us, pair.steering)
                .map_err(PipelineError::Output)?;

            match pair.rotation {
                RotationClass::Clockwise => self.summary.clockwise_pairs += 1,
                RotationClass::CounterClockwise => self.summary.counter_clockwise_pairs += 1,
                RotationClass::Unknown => {}
            }
            debug!(
                ts = frame.timestamp_us,
                blue_bearing = pair.blue_bearing,
                yellow_bearing = pair.yellow_bearing,
                rotation = pair.rotation.label(),
                steering = pair.steering,
                ground_steering = ?self.cache.ground_steering(),
                "Steering computed"
            );
        }

        if pairs.is_empty() {
            self.summary.frames_without_pairs += 1;
        }
        self.summary.frames += 1;
        self.summary.emissions += pairs.len() as u64;

        if let Some(render) = self.render.as_mut() {
            if let Err(e) = render.render(frame, &detections) {
                warn!("Render failed for frame {}: {}", frame.timestamp_us, e);
            }
        }

        Ok(pairs.len())
    }
}
