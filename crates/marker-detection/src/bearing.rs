//! Marker bearing from a bounding box

use crate::{BoundingBox, MarkerClass};

/// `atan(center_y / center_x)` of the box center, both measured from the
/// frame's top-left corner.
///
/// A center on the left edge divides by zero and follows IEEE semantics:
/// `+inf` gives `pi / 2`, and a center at the origin gives NaN.
pub fn bearing(b: &BoundingBox) -> f64 {
    let (cx, cy) = b.center();
    (f64::from(cy) / f64::from(cx)).atan()
}

/// Like [`bearing`], but the center ratio is an integer quotient truncated
/// toward zero before the `atan`.
///
/// A center on the left edge keeps the floating-point division of
/// [`bearing`].
pub fn truncated_bearing(b: &BoundingBox) -> f64 {
    let (cx, cy) = b.center();
    if cx == 0 {
        return bearing(b);
    }
    f64::from(cy / cx).atan()
}

/// Bearing as calibrated for each marker class: blue markers use the exact
/// ratio, yellow markers the truncated one.
pub fn class_bearing(class: MarkerClass, b: &BoundingBox) -> f64 {
    match class {
        MarkerClass::Blue => bearing(b),
        MarkerClass::Yellow => truncated_bearing(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    #[test]
    fn test_diagonal_center() {
        let b = BoundingBox::new(90, 90, 20, 20);
        assert!((bearing(&b) - FRAC_PI_4).abs() < 1e-12);
    }

    #[test]
    fn test_matches_formula() {
        let b = BoundingBox::new(300, 40, 25, 31);
        // center (312, 55)
        assert_eq!(bearing(&b), (55.0_f64 / 312.0).atan());
    }

    #[test]
    fn test_left_edge_center_is_defined() {
        let b = BoundingBox::new(0, 10, 1, 6);
        assert_eq!(bearing(&b), FRAC_PI_2);
        assert_eq!(b.bearing(), FRAC_PI_2);
    }

    #[test]
    fn test_origin_center_is_nan() {
        let b = BoundingBox::new(0, 0, 1, 1);
        assert!(bearing(&b).is_nan());
    }

    #[test]
    fn test_truncated_ratio_below_one_is_zero() {
        // center (160, 50): 50 / 160 truncates to 0
        let b = BoundingBox::new(150, 40, 20, 20);
        assert_eq!(truncated_bearing(&b), 0.0);
        assert_eq!(class_bearing(MarkerClass::Yellow, &b), 0.0);
        assert_eq!(class_bearing(MarkerClass::Blue, &b), (50.0_f64 / 160.0).atan());
    }

    #[test]
    fn test_truncated_ratio_drops_fraction() {
        // center (30, 95): 95 / 30 truncates to 3
        let b = BoundingBox::new(20, 85, 20, 20);
        assert_eq!(truncated_bearing(&b), 3.0_f64.atan());
        assert!(bearing(&b) > truncated_bearing(&b));
    }

    #[test]
    fn test_truncated_left_edge_center_is_defined() {
        let b = BoundingBox::new(0, 10, 1, 6);
        assert_eq!(truncated_bearing(&b), FRAC_PI_2);
        assert!(truncated_bearing(&BoundingBox::new(0, 0, 1, 1)).is_nan());
    }
}
