//! Color segmentation of marker classes

use camera_capture::VideoFrame;
use image::{GrayImage, Luma};

use crate::{bgr_to_hsv, ColorBand, DetectionConfig, MarkerClass, StructuringElement};

const FOREGROUND: u8 = 255;

/// One binary mask per marker class
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerMasks {
    pub blue: GrayImage,
    pub yellow: GrayImage,
}

impl MarkerMasks {
    pub fn get(&self, class: MarkerClass) -> &GrayImage {
        match class {
            MarkerClass::Blue => &self.blue,
            MarkerClass::Yellow => &self.yellow,
        }
    }
}

/// Thresholds a frame in HSV space and removes speckle noise
pub struct MarkerSegmenter {
    blue: ColorBand,
    yellow: ColorBand,
    element: StructuringElement,
}

impl MarkerSegmenter {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            blue: config.blue,
            yellow: config.yellow,
            element: StructuringElement::ellipse(config.kernel_size),
        }
    }

    /// Raw band masks, before the opening
    pub fn threshold(&self, frame: &VideoFrame) -> MarkerMasks {
        let mut blue = GrayImage::new(frame.width, frame.height);
        let mut yellow = GrayImage::new(frame.width, frame.height);

        let positions = (0..frame.height).flat_map(|y| (0..frame.width).map(move |x| (x, y)));
        for ((x, y), bgr) in positions.zip(frame.bgr_pixels()) {
            let hsv = bgr_to_hsv(bgr);
            if self.blue.contains(hsv) {
                blue.put_pixel(x, y, Luma([FOREGROUND]));
            }
            if self.yellow.contains(hsv) {
                yellow.put_pixel(x, y, Luma([FOREGROUND]));
            }
        }

        MarkerMasks { blue, yellow }
    }

    /// Band masks after the morphological opening
    pub fn segment(&self, frame: &VideoFrame) -> MarkerMasks {
        let raw = self.threshold(frame);
        MarkerMasks {
            blue: self.element.open(&raw.blue),
            yellow: self.element.open(&raw.yellow),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLUE: [u8; 4] = [255, 0, 0, 255];
    const YELLOW: [u8; 4] = [0, 255, 255, 255];

    fn segmenter() -> MarkerSegmenter {
        MarkerSegmenter::new(&DetectionConfig::default())
    }

    #[test]
    fn test_frame_without_band_colors_gives_empty_masks() {
        // White, gray, red and green all fall outside both bands.
        let mut frame = VideoFrame::filled(20, 20, [255, 255, 255, 255], 0);
        frame.fill_rect(0, 0, 10, 10, [128, 128, 128, 255]);
        frame.fill_rect(10, 0, 10, 10, [0, 0, 255, 255]);
        frame.fill_rect(0, 10, 10, 10, [0, 255, 0, 255]);

        let masks = segmenter().segment(&frame);
        for class in MarkerClass::ALL {
            assert!(masks.get(class).pixels().all(|p| p[0] == 0));
        }
    }

    #[test]
    fn test_threshold_separates_classes() {
        let mut frame = VideoFrame::filled(4, 1, [0, 0, 0, 255], 0);
        frame.fill_rect(1, 0, 1, 1, BLUE);
        frame.fill_rect(2, 0, 1, 1, YELLOW);

        let masks = segmenter().threshold(&frame);
        assert_eq!(masks.blue.as_raw(), &vec![0, 255, 0, 0]);
        assert_eq!(masks.yellow.as_raw(), &vec![0, 0, 255, 0]);
    }

    #[test]
    fn test_dark_blue_below_value_floor_is_ignored() {
        // Hue and saturation match, value 30 is under the blue floor of 40.
        let frame = VideoFrame::filled(3, 3, [30, 0, 0, 255], 0);
        let masks = segmenter().threshold(&frame);
        assert!(masks.blue.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_segment_drops_isolated_pixels() {
        let mut frame = VideoFrame::filled(30, 30, [0, 0, 0, 255], 0);
        frame.fill_rect(3, 3, 2, 2, BLUE);
        frame.fill_rect(12, 12, 10, 10, BLUE);

        let masks = segmenter().segment(&frame);
        assert_eq!(masks.blue.get_pixel(3, 3)[0], 0);
        assert_eq!(masks.blue.get_pixel(16, 16)[0], 255);
    }
}
