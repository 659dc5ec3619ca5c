//! 8-bit BGR to HSV conversion
//!
//! Fixed-point conversion with 12-bit division tables: hue on the 0..180
//! scale, saturation and value on 0..255. Thresholds are calibrated against
//! this exact rounding, so float conversions are not interchangeable.

use std::sync::OnceLock;

/// (hue, saturation, value)
pub type Hsv = [u8; 3];

const HSV_SHIFT: u32 = 12;
const HUE_RANGE: i32 = 180;

struct DivTables {
    sat: [i32; 256],
    hue: [i32; 256],
}

fn tables() -> &'static DivTables {
    static TABLES: OnceLock<DivTables> = OnceLock::new();
    TABLES.get_or_init(|| {
        let mut sat = [0i32; 256];
        let mut hue = [0i32; 256];
        for i in 1..256 {
            let d = i as f64;
            sat[i] = ((255i64 << HSV_SHIFT) as f64 / d).round_ties_even() as i32;
            hue[i] = ((i64::from(HUE_RANGE) << HSV_SHIFT) as f64 / (6.0 * d)).round_ties_even() as i32;
        }
        DivTables { sat, hue }
    })
}

/// Convert one BGR pixel
#[inline]
pub fn bgr_to_hsv([b, g, r]: [u8; 3]) -> Hsv {
    let tables = tables();
    let (b, g, r) = (i32::from(b), i32::from(g), i32::from(r));

    let v = b.max(g).max(r);
    let vmin = b.min(g).min(r);
    let diff = v - vmin;
    let round = 1 << (HSV_SHIFT - 1);

    let s = (diff * tables.sat[v as usize] + round) >> HSV_SHIFT;

    let h = if v == r {
        g - b
    } else if v == g {
        b - r + 2 * diff
    } else {
        r - g + 4 * diff
    };
    let mut h = (h * tables.hue[diff as usize] + round) >> HSV_SHIFT;
    if h < 0 {
        h += HUE_RANGE;
    }

    [h as u8, s as u8, v as u8]
}
