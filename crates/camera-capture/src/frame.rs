//! Video frame types and processing

use image::{Rgb, RgbImage};

use crate::CameraError;

/// Pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Blue, green, red, alpha; alpha is ignored
    Bgra8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Bgra8 => 4,
        }
    }
}

/// BGRA video frame, row-major without padding
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    /// BGRA pixel data (width * height * 4)
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Capture timestamp (microseconds)
    pub timestamp_us: i64,
    /// Frame sequence number
    pub sequence: u64,
}

impl VideoFrame {
    /// Create a new video frame from raw BGRA data
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        timestamp_us: i64,
        sequence: u64,
    ) -> Result<Self, CameraError> {
        let expected = width as usize * height as usize * PixelFormat::Bgra8.bytes_per_pixel();
        if data.len() != expected {
            return Err(CameraError::Buffer {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            data,
            width,
            height,
            timestamp_us,
            sequence,
        })
    }

    /// Frame filled with a single BGRA color
    pub fn filled(width: u32, height: u32, bgra: [u8; 4], timestamp_us: i64) -> Self {
        let data = bgra
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();

        Self {
            data,
            width,
            height,
            timestamp_us,
            sequence: 0,
        }
    }

    pub fn format(&self) -> PixelFormat {
        PixelFormat::Bgra8
    }

    /// Get BGRA pixel at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        Some([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ])
    }

    /// Paint an axis-aligned rectangle, clipped to the frame
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, bgra: [u8; 4]) {
        let x_end = x.saturating_add(w).min(self.width);
        let y_end = y.saturating_add(h).min(self.height);

        for row in y..y_end {
            for col in x..x_end {
                let idx = ((row * self.width + col) * 4) as usize;
                self.data[idx..idx + 4].copy_from_slice(&bgra);
            }
        }
    }

    /// Pixels as (b, g, r) triples, alpha dropped
    pub fn bgr_pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.data.chunks_exact(4).map(|p| [p[0], p[1], p[2]])
    }

    /// Convert to an RGB image (used for rendering and export)
    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let idx = ((y * self.width + x) * 4) as usize;
            Rgb([self.data[idx + 2], self.data[idx + 1], self.data[idx]])
        })
    }

    /// Convert an RGB image into a BGRA frame
    pub fn from_rgb_image(image: &RgbImage, timestamp_us: i64, sequence: u64) -> Self {
        let mut data = Vec::with_capacity(image.width() as usize * image.height() as usize * 4);
        for pixel in image.pixels() {
            data.extend_from_slice(&[pixel[2], pixel[1], pixel[0], 255]);
        }

        Self {
            data,
            width: image.width(),
            height: image.height(),
            timestamp_us,
            sequence,
        }
    }
}
