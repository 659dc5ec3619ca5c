//! Outer contours and their bounding boxes

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType, Contour};
use serde::{Deserialize, Serialize};

use crate::bearing::{bearing, class_bearing};
use crate::MarkerClass;

/// Axis-aligned box in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> i64 {
        i64::from(self.width) * i64::from(self.height)
    }

    /// Center with the half extents truncated to whole pixels
    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn is_accepted(&self, min_area: i64) -> bool {
        self.area() > min_area
    }

    pub fn bearing(&self) -> f64 {
        bearing(self)
    }

    /// Bearing with the arithmetic calibrated for `class`
    pub fn bearing_for(&self, class: MarkerClass) -> f64 {
        class_bearing(class, self)
    }

    fn enclosing(contour: &Contour<i32>) -> Option<Self> {
        let first = contour.points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &contour.points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
    }
}

/// Every box examined for one marker class, in iteration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassDetections {
    pub examined: Vec<BoundingBox>,
    pub min_area: i64,
}

impl ClassDetections {
    /// Boxes large enough to be treated as markers
    pub fn accepted(&self) -> impl Iterator<Item = &BoundingBox> + '_ {
        self.examined
            .iter()
            .filter(move |b| b.is_accepted(self.min_area))
    }

    /// The box iterated last, whether or not it was accepted
    pub fn last_examined(&self) -> Option<&BoundingBox> {
        self.examined.last()
    }

    pub fn is_empty(&self) -> bool {
        self.examined.is_empty()
    }
}

/// Reduces a binary mask to the bounding boxes of its outermost contours
pub struct ContourExtractor {
    min_area: i64,
}

impl ContourExtractor {
    pub fn new(min_area: i64) -> Self {
        Self { min_area }
    }

    /// Boxes of the outer borders that are not nested inside another region.
    ///
    /// The most recently found border comes first: boxes run in reverse raster
    /// order of their first pixel, bottom of the frame to top.
    pub fn extract(&self, mask: &GrayImage) -> ClassDetections {
        let examined = find_contours::<i32>(mask)
            .iter()
            .rev()
            .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
            .filter_map(BoundingBox::enclosing)
            .collect();

        ClassDetections {
            examined,
            min_area: self.min_area,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn paint(mask: &mut GrayImage, x0: u32, y0: u32, w: u32, h: u32, value: u8) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                mask.put_pixel(x, y, Luma([value]));
            }
        }
    }

    #[test]
    fn test_boxes_follow_reverse_raster_order() {
        let mut mask = GrayImage::new(40, 40);
        paint(&mut mask, 20, 2, 5, 5, 255);
        paint(&mut mask, 2, 10, 12, 8, 255);
        paint(&mut mask, 30, 10, 6, 6, 255);

        let detections = ContourExtractor::new(80).extract(&mask);
        assert_eq!(
            detections.examined,
            vec![
                BoundingBox::new(30, 10, 6, 6),
                BoundingBox::new(2, 10, 12, 8),
                BoundingBox::new(20, 2, 5, 5),
            ]
        );
        assert_eq!(detections.last_examined(), Some(&BoundingBox::new(20, 2, 5, 5)));
    }

    #[test]
    fn test_area_filter_keeps_last_examined() {
        let mut mask = GrayImage::new(40, 40);
        paint(&mut mask, 20, 2, 8, 10, 255);
        paint(&mut mask, 2, 20, 12, 8, 255);

        let detections = ContourExtractor::new(80).extract(&mask);
        let accepted: Vec<_> = detections.accepted().copied().collect();

        // 8 x 10 = 80 is not above the threshold.
        assert_eq!(accepted, vec![BoundingBox::new(2, 20, 12, 8)]);
        assert_eq!(
            detections.last_examined(),
            Some(&BoundingBox::new(20, 2, 8, 10))
        );
    }

    #[test]
    fn test_nested_regions_are_ignored() {
        let mut mask = GrayImage::new(30, 30);
        paint(&mut mask, 2, 2, 20, 20, 255);
        paint(&mut mask, 6, 6, 12, 12, 0);
        paint(&mut mask, 10, 10, 4, 4, 255);

        let detections = ContourExtractor::new(80).extract(&mask);
        assert_eq!(detections.examined, vec![BoundingBox::new(2, 2, 20, 20)]);
    }

    #[test]
    fn test_empty_mask_has_no_boxes() {
        let detections = ContourExtractor::new(80).extract(&GrayImage::new(10, 10));
        assert!(detections.is_empty());
        assert!(detections.last_examined().is_none());
        assert_eq!(detections.accepted().count(), 0);
    }

    #[test]
    fn test_center_truncates_half_extents() {
        assert_eq!(BoundingBox::new(3, 4, 5, 7).center(), (5, 7));
        assert_eq!(BoundingBox::new(0, 0, 1, 1).center(), (0, 0));
    }
}
