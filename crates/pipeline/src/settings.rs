//! Startup settings: defaults, optional file, environment, command line

use std::path::{Path, PathBuf};

use clap::Parser;
use config::{Config, Environment, File};
use marker_detection::DetectionConfig;
use serde::Deserialize;
use steering::PairingPolicy;

use crate::output::DEFAULT_TAG;
use crate::PipelineError;

/// Environment variable prefix; nested keys are separated by `__`
pub const ENV_PREFIX: &str = "GROUND_STEERING";

/// Ground steering estimation from marker bearings
#[derive(Debug, Default, Parser)]
#[command(name = "ground-steering", version, about)]
pub struct Cli {
    /// Name of the shared frame area (directory of recorded frames to replay)
    #[arg(long)]
    pub name: Option<String>,

    /// Frame width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Frame height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Debug logging and annotated frame output
    #[arg(long)]
    pub verbose: bool,

    /// Replay rate of recorded frames
    #[arg(long)]
    pub fps: Option<u32>,

    /// Recorded vehicle message log (`sample_time_us;message_id;fields...`)
    #[arg(long)]
    pub vehicle_feed: Option<PathBuf>,

    /// Directory for annotated frames when verbose
    #[arg(long)]
    pub render_dir: Option<PathBuf>,

    /// TrueType font for the caption drawn on annotated frames
    #[arg(long)]
    pub caption_font: Option<PathBuf>,

    /// Tag prefixed to every output line
    #[arg(long)]
    pub tag: Option<String>,

    /// Pair only boxes above the area threshold
    #[arg(long)]
    pub strict_pairing: bool,

    /// Settings file read before environment and flags
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Layered settings before validation
#[derive(Debug, Deserialize)]
struct RawSettings {
    name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    verbose: bool,
    fps: u32,
    vehicle_feed: Option<PathBuf>,
    render_dir: Option<PathBuf>,
    caption_font: Option<PathBuf>,
    tag: String,
    strict_pairing: bool,
    #[serde(default)]
    detection: DetectionConfig,
}

/// Resolved startup settings, immutable for the life of the process
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub verbose: bool,
    pub fps: u32,
    pub vehicle_feed: Option<PathBuf>,
    pub render_dir: Option<PathBuf>,
    pub caption_font: Option<PathBuf>,
    pub tag: String,
    pub pairing: PairingPolicy,
    pub detection: DetectionConfig,
}

impl Settings {
    /// Resolve settings from every layer, flags taking precedence
    pub fn load(cli: &Cli) -> Result<Self, PipelineError> {
        let mut builder = Config::builder()
            .set_default("verbose", false)?
            .set_default("fps", 10_i64)?
            .set_default("tag", DEFAULT_TAG)?
            .set_default("strict_pairing", false)?;

        if let Some(path) = &cli.config {
            builder = builder.add_source(File::from(path.as_path()));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder = builder
            .set_override_option("name", cli.name.clone())?
            .set_override_option("width", cli.width.map(i64::from))?
            .set_override_option("height", cli.height.map(i64::from))?
            .set_override_option("fps", cli.fps.map(i64::from))?
            .set_override_option("vehicle_feed", cli.vehicle_feed.as_deref().map(path_value))?
            .set_override_option("render_dir", cli.render_dir.as_deref().map(path_value))?
            .set_override_option("caption_font", cli.caption_font.as_deref().map(path_value))?
            .set_override_option("tag", cli.tag.clone())?;
        if cli.verbose {
            builder = builder.set_override("verbose", true)?;
        }
        if cli.strict_pairing {
            builder = builder.set_override("strict_pairing", true)?;
        }

        let raw: RawSettings = builder.build()?.try_deserialize()?;
        Self::validate(raw)
    }

    fn validate(raw: RawSettings) -> Result<Self, PipelineError> {
        let name = raw
            .name
            .filter(|n| !n.is_empty())
            .ok_or(PipelineError::MissingParameter("name"))?;
        let width = raw.width.ok_or(PipelineError::MissingParameter("width"))?;
        let height = raw.height.ok_or(PipelineError::MissingParameter("height"))?;
        if width == 0 || height == 0 {
            return Err(PipelineError::Configuration(format!(
                "frame dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }
        if raw.fps == 0 {
            return Err(PipelineError::Configuration(
                "fps must be non-zero".to_string(),
            ));
        }
        raw.detection
            .validate()
            .map_err(|e| PipelineError::Configuration(e.to_string()))?;

        Ok(Self {
            name,
            width,
            height,
            verbose: raw.verbose,
            fps: raw.fps,
            vehicle_feed: raw.vehicle_feed,
            render_dir: raw.render_dir,
            caption_font: raw.caption_font,
            tag: raw.tag,
            pairing: if raw.strict_pairing {
                PairingPolicy::AcceptedOnly
            } else {
                PairingPolicy::AllContours
            },
            detection: raw.detection,
        })
    }

    /// Annotated frames are written only in verbose mode with a target directory
    pub fn render_target(&self) -> Option<&Path> {
        if self.verbose {
            self.render_dir.as_deref()
        } else {
            None
        }
    }
}

fn path_value(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
