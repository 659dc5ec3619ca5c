//! Ground Steering Pipeline
//!
//! Wires the frame source, vehicle feed, marker detector and steering
//! heuristic into one processing loop that writes a steering value per
//! blue x yellow marker pair to stdout.

pub mod orchestrator;
pub mod output;
pub mod render;
pub mod settings;

pub use orchestrator::{FrameOrchestrator, OrchestratorState, RunSummary, Session};
pub use output::{format_line, format_steering, LineSink, OutputSink, DEFAULT_TAG};
pub use render::{PngRenderSink, RenderError, RenderSink};
pub use settings::{Cli, Settings};

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::sync::Arc;

use camera_capture::{
    CameraError, ImageSequencePublisher, PublisherHandle, SharedFrameBuffer, SharedMemorySource,
};
use marker_detection::MarkerDetector;
use thiserror::Error;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use vehicle_state::{VehicleFeed, VehicleStateCache};

/// Pipeline error types
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Frame source unavailable: {0}")]
    AdapterUnavailable(#[from] CameraError),

    #[error("Output error: {0}")]
    Output(#[source] io::Error),
}

impl From<config::ConfigError> for PipelineError {
    fn from(e: config::ConfigError) -> Self {
        PipelineError::Configuration(e.to_string())
    }
}

/// Initialize logging on stderr; stdout carries the steering lines
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        warn!("Tracing subscriber already installed");
    }
}

/// A fully attached pipeline, ready to run on a blocking thread
pub struct Pipeline {
    orchestrator: FrameOrchestrator<SharedMemorySource, LineSink<io::Stdout>>,
    session: Session,
    publisher: PublisherHandle,
    feed: Option<VehicleFeed>,
}

impl Pipeline {
    /// Attach the frame area, start the producers and build the orchestrator
    pub fn start(settings: &Settings) -> Result<Self, PipelineError> {
        let detector = MarkerDetector::new(&settings.detection)
            .map_err(|e| PipelineError::Configuration(e.to_string()))?;

        let buffer = Arc::new(SharedFrameBuffer::new(
            settings.name.clone(),
            settings.width,
            settings.height,
        ));
        let publisher =
            ImageSequencePublisher::open(Path::new(&settings.name), Arc::clone(&buffer), settings.fps)?;
        info!(
            "Replaying {} recorded frame(s) from '{}' at {} fps",
            publisher.len(),
            settings.name,
            settings.fps
        );

        let cache = Arc::new(VehicleStateCache::new());
        let feed = match &settings.vehicle_feed {
            Some(path) => {
                let file = File::open(path).map_err(|e| {
                    PipelineError::Configuration(format!(
                        "cannot open vehicle feed {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                info!("Replaying vehicle messages from {}", path.display());
                Some(VehicleFeed::spawn(BufReader::new(file), Arc::clone(&cache)))
            }
            None => {
                warn!("No vehicle feed configured; pedal position and yaw stay at zero");
                None
            }
        };

        let session = Session::with_buffer(Arc::clone(&buffer));
        let source = SharedMemorySource::attach(buffer);
        let output = LineSink::new(io::stdout(), settings.tag.clone());

        let mut orchestrator =
            FrameOrchestrator::new(source, detector, cache, output, session.clone())
                .with_policy(settings.pairing);
        if let Some(dir) = settings.render_target() {
            let mut sink = PngRenderSink::new(dir, settings.tag.clone())
                .map_err(|e| PipelineError::Configuration(e.to_string()))?;
            if let Some(font) = &settings.caption_font {
                sink = sink
                    .with_caption_font(font)
                    .map_err(|e| PipelineError::Configuration(e.to_string()))?;
            }
            info!("Writing annotated frames to {}", dir.display());
            orchestrator = orchestrator.with_render(Box::new(sink));
        }

        Ok(Self {
            orchestrator,
            session,
            publisher: publisher.spawn(),
            feed,
        })
    }

    /// Handle for ending the session from another thread
    pub fn session(&self) -> Session {
        self.session.clone()
    }

    /// Run until the session ends or the recorded frames run out
    pub fn run(mut self) -> Result<RunSummary, PipelineError> {
        let result = self.orchestrator.run();
        self.publisher.stop();
        if let Some(feed) = self.feed.as_mut() {
            feed.stop();
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camera_capture::VideoFrame;
    use std::fs;
    use std::path::PathBuf;

    fn recorded_dir(label: &str, frames: usize) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "ground-steering-{}-{}",
            label,
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        for i in 0..frames {
            let mut frame = VideoFrame::filled(64, 48, [40, 40, 40, 255], 0);
            frame.fill_rect(4, 20, 12, 12, [255, 0, 0, 255]);
            frame.fill_rect(44, 20, 12, 12, [0, 255, 255, 255]);
            frame
                .to_rgb_image()
                .save(dir.join(format!("{:04}.png", i)))
                .unwrap();
        }
        dir
    }

    fn settings(dir: &Path) -> Settings {
        Settings {
            name: dir.to_string_lossy().into_owned(),
            width: 64,
            height: 48,
            verbose: false,
            fps: 100,
            vehicle_feed: None,
            render_dir: None,
            caption_font: None,
            tag: DEFAULT_TAG.to_string(),
            pairing: steering::PairingPolicy::AllContours,
            detection: marker_detection::DetectionConfig::default(),
        }
    }

    #[test]
    fn test_missing_frame_directory_is_unavailable() {
        let missing = std::env::temp_dir().join("ground-steering-does-not-exist");
        let result = Pipeline::start(&settings(&missing));
        assert!(matches!(result, Err(PipelineError::AdapterUnavailable(_))));
    }

    #[test]
    fn test_missing_vehicle_feed_is_configuration_error() {
        let dir = recorded_dir("feed", 1);
        let mut s = settings(&dir);
        s.vehicle_feed = Some(dir.join("absent.log"));

        let result = Pipeline::start(&s);
        fs::remove_dir_all(&dir).unwrap();
        assert!(matches!(result, Err(PipelineError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_session_end_from_async_task() {
        let dir = recorded_dir("session", 200);
        let pipeline = Pipeline::start(&settings(&dir)).unwrap();
        let session = pipeline.session();

        let worker = tokio::task::spawn_blocking(move || pipeline.run());
        tokio::time::sleep(std::time::Duration::from_millis(30)).await;
        session.end();

        let summary = worker.await.unwrap().unwrap();
        fs::remove_dir_all(&dir).unwrap();
        assert!(summary.frames < 200);
    }
}
