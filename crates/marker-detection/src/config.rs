//! Detection calibration

use serde::{Deserialize, Serialize};

use crate::{DetectionError, Hsv};

/// Marker class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerClass {
    /// Left boundary markers
    Blue,
    /// Right boundary markers
    Yellow,
}

impl MarkerClass {
    pub const ALL: [MarkerClass; 2] = [MarkerClass::Blue, MarkerClass::Yellow];
}

/// Inclusive HSV range; hue uses the 0..180 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorBand {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl ColorBand {
    pub const BLUE: ColorBand = ColorBand {
        lower: [100, 120, 40],
        upper: [140, 255, 255],
    };

    pub const YELLOW: ColorBand = ColorBand {
        lower: [20, 100, 100],
        upper: [30, 255, 255],
    };

    #[inline]
    pub fn contains(&self, hsv: Hsv) -> bool {
        let [h, s, v] = hsv;
        (self.lower[0]..=self.upper[0]).contains(&h)
            && (self.lower[1]..=self.upper[1]).contains(&s)
            && (self.lower[2]..=self.upper[2]).contains(&v)
    }
}

/// Largest opening element the morphology mask accepts
pub const MAX_KERNEL_SIZE: u32 = 511;

/// Detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Blue marker band
    pub blue: ColorBand,

    /// Yellow marker band
    pub yellow: ColorBand,

    /// Width and height of the elliptical opening element
    pub kernel_size: u32,

    /// Boxes must cover more than this many pixels to be accepted
    pub min_box_area: i64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            blue: ColorBand::BLUE,
            yellow: ColorBand::YELLOW,
            kernel_size: 5,
            min_box_area: 80,
        }
    }
}

impl DetectionConfig {
    pub fn band(&self, class: MarkerClass) -> ColorBand {
        match class {
            MarkerClass::Blue => self.blue,
            MarkerClass::Yellow => self.yellow,
        }
    }

    pub fn validate(&self) -> Result<(), DetectionError> {
        if self.kernel_size == 0
            || self.kernel_size % 2 == 0
            || self.kernel_size > MAX_KERNEL_SIZE
        {
            return Err(DetectionError::InvalidKernel(self.kernel_size));
        }

        for class in MarkerClass::ALL {
            let band = self.band(class);
            if band.lower.iter().zip(band.upper.iter()).any(|(lo, hi)| lo > hi) {
                return Err(DetectionError::InvalidBand {
                    class,
                    reason: format!("lower {:?} exceeds upper {:?}", band.lower, band.upper),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_bounds_are_inclusive() {
        let band = ColorBand::YELLOW;
        assert!(band.contains([20, 100, 100]));
        assert!(band.contains([30, 255, 255]));
        assert!(!band.contains([19, 200, 200]));
        assert!(!band.contains([31, 200, 200]));
        assert!(!band.contains([25, 99, 200]));
    }

    #[test]
    fn test_inverted_band_is_rejected() {
        let config = DetectionConfig {
            blue: ColorBand {
                lower: [140, 120, 40],
                upper: [100, 255, 255],
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DetectionError::InvalidBand {
                class: MarkerClass::Blue,
                ..
            })
        ));
    }

    #[test]
    fn test_kernel_size_limits() {
        for kernel_size in [0, 4, 513] {
            let config = DetectionConfig {
                kernel_size,
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(DetectionError::InvalidKernel(kernel_size)));
        }
        let largest = DetectionConfig {
            kernel_size: MAX_KERNEL_SIZE,
            ..Default::default()
        };
        assert!(largest.validate().is_ok());
    }
}
