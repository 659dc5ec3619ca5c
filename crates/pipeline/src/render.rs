//! Annotated frame output for verbose runs

use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use camera_capture::VideoFrame;
use chrono::Utc;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use marker_detection::{BoundingBox, MarkerDetections};
use thiserror::Error;
use tracing::debug;

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const CAPTION_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const CAPTION_SCALE: f32 = 16.0;
/// Left end of the caption baseline
const CAPTION_ORIGIN: (i32, i32) = (10, 35);

/// Render error types
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Render IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Render encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid caption font {path}: {reason}")]
    Font { path: String, reason: String },
}

/// Side-effect-only consumer of processed frames
pub trait RenderSink {
    fn render(&mut self, frame: &VideoFrame, detections: &MarkerDetections)
        -> Result<(), RenderError>;
}

/// Writes `<dir>/<timestamp>.png` with the accepted boxes outlined
///
/// With a caption font loaded, the caption is also drawn onto the frame.
pub struct PngRenderSink {
    dir: PathBuf,
    tag: String,
    font: Option<FontVec>,
}

impl PngRenderSink {
    pub fn new(dir: impl Into<PathBuf>, tag: impl Into<String>) -> Result<Self, RenderError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            tag: tag.into(),
            font: None,
        })
    }

    /// Load a TrueType/OpenType font for the on-frame caption
    pub fn with_caption_font(mut self, path: &Path) -> Result<Self, RenderError> {
        let font = FontVec::try_from_vec(fs::read(path)?).map_err(|e| RenderError::Font {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        self.font = Some(font);
        Ok(self)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, timestamp_us: i64) -> PathBuf {
        self.dir.join(format!("{}.png", timestamp_us))
    }

    pub fn caption(&self, timestamp_us: i64) -> String {
        format!(
            "Now: {}; ts: {}; {};",
            Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
            timestamp_us,
            self.tag
        )
    }
}

/// Draw `text` in white with its baseline starting at (10, 35)
pub fn draw_caption(image: &mut RgbImage, font: &FontVec, text: &str) {
    let (x, baseline) = CAPTION_ORIGIN;
    let y = baseline - CAPTION_SCALE as i32;
    draw_text_mut(image, CAPTION_COLOR, x, y, PxScale::from(CAPTION_SCALE), font, text);
}

/// Outline every accepted box of both classes with a 2 px border
pub fn annotate(frame: &VideoFrame, detections: &MarkerDetections) -> RgbImage {
    let mut image = frame.to_rgb_image();
    let boxes = detections
        .blue
        .accepted()
        .chain(detections.yellow.accepted());
    for b in boxes {
        outline(&mut image, b);
    }
    image
}

fn outline(image: &mut RgbImage, b: &BoundingBox) {
    let (Ok(width), Ok(height)) = (u32::try_from(b.width), u32::try_from(b.height)) else {
        return;
    };
    if width == 0 || height == 0 {
        return;
    }
    draw_hollow_rect_mut(image, Rect::at(b.x, b.y).of_size(width, height), BOX_COLOR);
    if width > 2 && height > 2 {
        draw_hollow_rect_mut(
            image,
            Rect::at(b.x + 1, b.y + 1).of_size(width - 2, height - 2),
            BOX_COLOR,
        );
    }
}

impl RenderSink for PngRenderSink {
    fn render(
        &mut self,
        frame: &VideoFrame,
        detections: &MarkerDetections,
    ) -> Result<(), RenderError> {
        let path = self.path_for(frame.timestamp_us);
        let caption = self.caption(frame.timestamp_us);
        let mut image = annotate(frame, detections);
        if let Some(font) = &self.font {
            draw_caption(&mut image, font, &caption);
        }
        image.save(&path)?;
        debug!("{} -> {}", caption, path.display());
        Ok(())
    }
}
