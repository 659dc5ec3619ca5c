//! Track Marker Detection
//!
//! Finds the blue and yellow boundary markers in a BGRA frame:
//! - HSV band thresholding into one binary mask per marker class
//! - morphological opening with an elliptical structuring element
//! - outer contours reduced to axis-aligned bounding boxes
//! - per-box bearing from the box center

pub mod bearing;
pub mod color;
pub mod config;
pub mod contour;
pub mod morphology;
pub mod segment;

pub use bearing::{bearing, class_bearing, truncated_bearing};
pub use color::{bgr_to_hsv, Hsv};
pub use config::{ColorBand, DetectionConfig, MarkerClass};
pub use contour::{BoundingBox, ClassDetections, ContourExtractor};
pub use morphology::StructuringElement;
pub use segment::{MarkerMasks, MarkerSegmenter};

use camera_capture::VideoFrame;
use thiserror::Error;
use tracing::debug;

/// Detection error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    #[error("Invalid color band for {class:?}: {reason}")]
    InvalidBand { class: MarkerClass, reason: String },

    #[error("Structuring element size must be odd, non-zero and at most 511, got {0}")]
    InvalidKernel(u32),
}

/// Boxes found for both marker classes in one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerDetections {
    pub blue: ClassDetections,
    pub yellow: ClassDetections,
}

impl MarkerDetections {
    pub fn get(&self, class: MarkerClass) -> &ClassDetections {
        match class {
            MarkerClass::Blue => &self.blue,
            MarkerClass::Yellow => &self.yellow,
        }
    }
}

/// Segmenter and contour extractor run together
pub struct MarkerDetector {
    segmenter: MarkerSegmenter,
    extractor: ContourExtractor,
}

impl MarkerDetector {
    pub fn new(config: &DetectionConfig) -> Result<Self, DetectionError> {
        config.validate()?;
        Ok(Self {
            segmenter: MarkerSegmenter::new(config),
            extractor: ContourExtractor::new(config.min_box_area),
        })
    }

    pub fn segmenter(&self) -> &MarkerSegmenter {
        &self.segmenter
    }

    /// Segment the frame and extract boxes for both classes
    pub fn detect(&self, frame: &VideoFrame) -> MarkerDetections {
        let masks = self.segmenter.segment(frame);
        let detections = MarkerDetections {
            blue: self.extractor.extract(&masks.blue),
            yellow: self.extractor.extract(&masks.yellow),
        };

        debug!(
            "Frame {}: {} blue box(es) ({} accepted), {} yellow box(es) ({} accepted)",
            frame.timestamp_us,
            detections.blue.examined.len(),
            detections.blue.accepted().count(),
            detections.yellow.examined.len(),
            detections.yellow.accepted().count(),
        );

        detections
    }
}
