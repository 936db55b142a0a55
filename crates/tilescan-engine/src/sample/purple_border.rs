use arrayvec::ArrayVec;

use crate::core::{Rect, RgbaImageView};

/// Sample points per tile side.
pub const POINTS_PER_SIDE: usize = 7;
/// Total border sample points (four sides).
pub const BORDER_SAMPLES: usize = POINTS_PER_SIDE * 4;
/// Inset of the sample ring, as a fraction of the shorter tile side.
pub const BORDER_INSET_RATIO: f64 = 0.08;

/// Minimum number of purple hits for a tile to be flagged.
///
/// `max(3, floor(0.2 · 28)) = 5`.
pub const MIN_BORDER_HITS: usize = {
    let fifth = BORDER_SAMPLES / 5;
    if fifth > 3 { fifth } else { 3 }
};

/// Result of scanning a tile's border ring for purple pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderScan {
    pub hits: usize,
    pub samples: usize,
    pub flagged: bool,
}

/// Fixed-threshold "purple" test: strong red and blue, weak green.
#[must_use]
pub fn is_purple([r, g, b]: [u8; 3]) -> bool {
    r >= 110 && b >= 110 && g <= 120
}

/// Returns the 28 border sample points of `rect`.
///
/// The ring is inset by 8% of the shorter side; each side carries seven
/// points spaced at `(k + 1) / 8` of its length.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn border_points(rect: Rect) -> ArrayVec<(f64, f64), BORDER_SAMPLES> {
    let inset = rect.min_side() * BORDER_INSET_RATIO;
    let left = rect.x + inset;
    let right = rect.x + rect.width - inset;
    let top = rect.y + inset;
    let bottom = rect.y + rect.height - inset;

    let mut points = ArrayVec::new();
    for k in 0..POINTS_PER_SIDE {
        let t = (k + 1) as f64 / (POINTS_PER_SIDE + 1) as f64;
        let x = left + t * (right - left);
        let y = top + t * (bottom - top);
        points.push((x, top));
        points.push((right, y));
        points.push((x, bottom));
        points.push((left, y));
    }
    points
}

/// Scans the border ring of `rect` and flags the tile when at least
/// [`MIN_BORDER_HITS`] sample points are purple.
///
/// This detector is untrained; its thresholds are fixed.
#[must_use]
pub fn scan_purple_border(image: RgbaImageView<'_>, rect: Rect) -> BorderScan {
    let points = border_points(rect);
    let hits = points
        .iter()
        .filter(|&&(x, y)| is_purple(image.rgb_at(x, y)))
        .count();
    BorderScan {
        hits,
        samples: points.len(),
        flagged: hits >= MIN_BORDER_HITS,
    }
}
