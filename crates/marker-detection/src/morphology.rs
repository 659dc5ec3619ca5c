//! Morphological opening with an elliptical structuring element

use image::{GrayImage, Luma};
use imageproc::morphology::{grayscale_open, Mask};

/// Elliptical element and the imageproc mask built from it
#[derive(Debug, Clone)]
pub struct StructuringElement {
    size: u32,
    offsets: Vec<(i32, i32)>,
    mask: Mask,
}

impl StructuringElement {
    /// Ellipse inscribed in a `size` x `size` square.
    ///
    /// Row `dy` spans `round(r * sqrt(1 - dy^2 / r^2))` columns either side of
    /// the center, so the 5x5 element is a plus-capped full block:
    ///
    /// ```text
    /// . . # . .
    /// # # # # #
    /// # # # # #
    /// # # # # #
    /// . . # . .
    /// ```
    ///
    /// `size` must be odd and at most 511 (see `DetectionConfig::validate`).
    pub fn ellipse(size: u32) -> Self {
        let r = (size / 2) as i32;
        let mut offsets = Vec::new();

        for dy in -r..=r {
            let dx = if r == 0 {
                0
            } else {
                let inv_r2 = 1.0 / f64::from(r * r);
                (f64::from(r) * (f64::from(r * r - dy * dy) * inv_r2).sqrt()).round_ties_even() as i32
            };
            offsets.extend((-dx..=dx).map(|x| (x, dy)));
        }

        let mut kernel = GrayImage::new(size, size);
        for &(dx, dy) in &offsets {
            kernel.put_pixel((dx + r) as u32, (dy + r) as u32, Luma([255]));
        }
        let mask = Mask::from_image(&kernel, r as u8, r as u8);

        Self {
            size,
            offsets,
            mask,
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn offsets(&self) -> &[(i32, i32)] {
        &self.offsets
    }

    pub fn contains(&self, dx: i32, dy: i32) -> bool {
        self.offsets.contains(&(dx, dy))
    }

    /// Erosion followed by dilation: removes specks smaller than the element.
    ///
    /// Neighbours outside the image are ignored, so blobs touching the border
    /// are kept.
    pub fn open(&self, image: &GrayImage) -> GrayImage {
        grayscale_open(image, &self.mask)
    }
}
