use serde::{Deserialize, Serialize};
use tilescan_stats::descriptive::mean_and_std;
use tracing::debug;

use crate::{
    core::{BoardSpec, InvalidBoardSpecError, Rect, RgbaImageView},
    detect::edge_projection::{EdgeProfiles, project_edges},
};

/// Tunables of the grid detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridDetectionParams {
    /// Profile values must exceed `mean + threshold_sigma * std` to count.
    pub threshold_sigma: f64,
    /// Minimum index distance between two accepted peaks.
    ///
    /// Grid lines closer together than this are merged into one peak, which
    /// undercounts rows/columns on dense boards. Lower it for such boards.
    pub min_peak_separation: usize,
}

impl Default for GridDetectionParams {
    fn default() -> Self {
        Self {
            threshold_sigma: 0.8,
            min_peak_separation: 6,
        }
    }
}

/// A tile grid located in a screenshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectedBoard {
    pub bounds: Rect,
    pub rows: usize,
    pub cols: usize,
}

impl DetectedBoard {
    pub fn to_board_spec(&self) -> Result<BoardSpec, InvalidBoardSpecError> {
        BoardSpec::new(self.rows, self.cols, self.bounds)
    }
}

/// Returns `mean + sigma * std` of `profile`, or `None` if it is empty.
#[must_use]
pub fn profile_threshold(profile: &[f64], sigma: f64) -> Option<f64> {
    let (mean, std) = mean_and_std(profile)?;
    Some(mean + sigma * std)
}

/// Finds the first and last index whose value exceeds `threshold`.
///
/// Returns `None` if no value exceeds the threshold or the two indices do
/// not form a non-empty span.
#[must_use]
pub fn profile_bounds(profile: &[f64], threshold: f64) -> Option<(usize, usize)> {
    let min = profile.iter().position(|&v| v > threshold)?;
    let max = profile.iter().rposition(|&v| v > threshold)?;
    (max > min).then_some((min, max))
}

/// Finds local maxima above `threshold` inside `[min + 1, max - 2]`.
///
/// A value is a candidate if it exceeds the threshold and is not smaller than
/// either neighbor. When a candidate lies within `min_separation` of the last
/// accepted peak it replaces that peak only if strictly taller; otherwise it
/// is dropped. Plateaus therefore resolve to their leftmost index.
///
/// The outermost edge columns fall outside the search window. A grid drawn
/// with 1px lines loses its two border lines this way and reports two fewer
/// cells per axis. Lines at least 2px wide keep an interior peak and are
/// counted in full.
#[must_use]
pub fn detect_peaks(
    profile: &[f64],
    threshold: f64,
    (min, max): (usize, usize),
    min_separation: usize,
) -> Vec<usize> {
    let mut peaks: Vec<usize> = vec![];
    let end = max.saturating_sub(2).min(profile.len().saturating_sub(2));
    for i in (min + 1)..=end {
        let value = profile[i];
        if value <= threshold || value < profile[i - 1] || value < profile[i + 1] {
            continue;
        }
        match peaks.last_mut() {
            Some(last) if i - *last < min_separation => {
                if value > profile[*last] {
                    *last = i;
                }
            }
            _ => peaks.push(i),
        }
    }
    peaks
}

struct AxisGrid {
    min: usize,
    max: usize,
    cells: usize,
}

fn detect_axis(profile: &[f64], params: &GridDetectionParams, axis: &str) -> Option<AxisGrid> {
    let threshold = profile_threshold(profile, params.threshold_sigma)?;
    let Some((min, max)) = profile_bounds(profile, threshold) else {
        debug!(axis, threshold, "no contrast above threshold");
        return None;
    };
    let peaks = detect_peaks(profile, threshold, (min, max), params.min_peak_separation);
    if peaks.len() < 2 {
        debug!(axis, peaks = peaks.len(), "too few grid line peaks");
        return None;
    }
    Some(AxisGrid {
        min,
        max,
        cells: peaks.len() - 1,
    })
}

/// Infers the board grid from precomputed edge profiles.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn detect_board_from_profiles(
    profiles: &EdgeProfiles,
    params: &GridDetectionParams,
) -> Option<DetectedBoard> {
    let rows = detect_axis(&profiles.rows, params, "rows")?;
    let cols = detect_axis(&profiles.cols, params, "cols")?;
    if rows.cells <= 1 || cols.cells <= 1 {
        debug!(rows = rows.cells, cols = cols.cells, "grid too small");
        return None;
    }
    Some(DetectedBoard {
        bounds: Rect {
            x: cols.min as f64,
            y: rows.min as f64,
            width: (cols.max - cols.min) as f64,
            height: (rows.max - rows.min) as f64,
        },
        rows: rows.cells,
        cols: cols.cells,
    })
}

/// Locates a tile grid in `image` with the default parameters.
///
/// Returns `None` when the image lacks contrast or too few grid lines are
/// found; detection never panics on arbitrary input.
#[must_use]
pub fn detect_board(image: RgbaImageView<'_>) -> Option<DetectedBoard> {
    detect_board_with(image, &GridDetectionParams::default())
}

#[must_use]
pub fn detect_board_with(
    image: RgbaImageView<'_>,
    params: &GridDetectionParams,
) -> Option<DetectedBoard> {
    detect_board_from_profiles(&project_edges(image), params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RgbaRaster;

    const BLACK: [u8; 4] = [0, 0, 0, 255];
    const WHITE: [u8; 4] = [255, 255, 255, 255];

    /// Draws `cells + 1` black lines per axis, `thickness` pixels wide, the
    /// first starting at `start` and the rest every `spacing` pixels.
    fn grid_image(size: usize, start: usize, spacing: usize, cells: usize, thickness: usize) -> RgbaRaster {
        let end = start + spacing * cells + thickness - 1;
        let on_line = |v: usize| {
            (0..=cells).any(|k| {
                let p = start + k * spacing;
                (p..p + thickness).contains(&v)
            })
        };
        RgbaRaster::from_fn(size, size, |x, y| {
            let inside = (start..=end).contains(&x) && (start..=end).contains(&y);
            if inside && (on_line(x) || on_line(y)) {
                BLACK
            } else {
                WHITE
            }
        })
    }

    #[test]
    fn test_detects_drawn_grids() {
        for (size, start, spacing, cells) in [(120, 12, 30, 3), (120, 10, 25, 4), (160, 10, 24, 6)] {
            let image = grid_image(size, start, spacing, cells, 3);
            let board = detect_board(image.view()).unwrap();
            assert_eq!(board.rows, cells, "{cells}x{cells}");
            assert_eq!(board.cols, cells, "{cells}x{cells}");
        }
    }

    #[test]
    fn test_hairline_grids_lose_border_lines() {
        for (size, start, spacing, cells) in [(120, 10, 25, 4), (160, 10, 20, 5), (160, 10, 24, 6)] {
            let image = grid_image(size, start, spacing, cells, 1);
            let board = detect_board(image.view()).unwrap();
            assert_eq!((board.rows, board.cols), (cells - 2, cells - 2), "{cells}x{cells}");

            let image = grid_image(size, start, spacing, cells, 2);
            let board = detect_board(image.view()).unwrap();
            assert_eq!((board.rows, board.cols), (cells, cells), "{cells}x{cells}");
        }
        for (start, spacing, cells) in [(12, 30, 2), (12, 30, 3)] {
            let image = grid_image(120, start, spacing, cells, 1);
            assert!(detect_board(image.view()).is_none(), "{cells}x{cells}");
        }
    }

    #[test]
    fn test_detected_bounds_hug_the_grid() {
        let image = grid_image(120, 10, 25, 4, 3);
        let board = detect_board(image.view()).unwrap();
        // The outer lines span 10..=112; the contrast steps sit one pixel
        // outside on the leading edge and on the last line pixel.
        assert_eq!(board.bounds, Rect::new(9.0, 9.0, 103.0, 103.0));
        assert!(board.to_board_spec().is_ok());
    }

    #[test]
    fn test_flat_image_yields_none() {
        let image = RgbaRaster::filled(64, 48, [40, 80, 120, 255]);
        assert!(detect_board(image.view()).is_none());
    }

    #[test]
    fn test_single_stripe_yields_none() {
        // One dark bar: rows carry no structure and columns hold a single line.
        let image = RgbaRaster::from_fn(60, 60, |x, _| if (20..24).contains(&x) { BLACK } else { WHITE });
        assert!(detect_board(image.view()).is_none());
    }

    #[test]
    fn test_detection_is_deterministic() {
        let image = grid_image(120, 10, 25, 4, 3);
        assert_eq!(detect_board(image.view()), detect_board(image.view()));
    }

    #[test]
    fn test_profile_bounds() {
        let profile = [0.0, 5.0, 1.0, 6.0, 0.0];
        assert_eq!(profile_bounds(&profile, 2.0), Some((1, 3)));
        assert_eq!(profile_bounds(&profile, 5.5), None);
        assert_eq!(profile_bounds(&profile, 10.0), None);
        assert_eq!(profile_bounds(&[], 0.0), None);
    }

    #[test]
    fn test_profile_threshold() {
        let profile = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(profile_threshold(&profile, 0.8), Some(5.0 + 0.8 * 2.0));
        assert_eq!(profile_threshold(&[], 0.8), None);
    }

    #[test]
    fn test_peaks_ignore_bound_indices() {
        // Peaks at the bound indices themselves and at max - 1 are skipped.
        let mut profile = vec![0.0; 40];
        for i in [5, 15, 25, 34, 35] {
            profile[i] = 10.0;
        }
        let peaks = detect_peaks(&profile, 1.0, (5, 35), 6);
        assert_eq!(peaks, vec![15, 25]);
    }

    #[test]
    fn test_taller_close_peak_replaces_previous() {
        let mut profile = vec![0.0; 30];
        profile[10] = 5.0;
        profile[13] = 8.0;
        profile[20] = 6.0;
        let peaks = detect_peaks(&profile, 1.0, (1, 28), 6);
        assert_eq!(peaks, vec![13, 20]);
    }

    #[test]
    fn test_equal_close_peak_keeps_first() {
        let mut profile = vec![0.0; 30];
        profile[10] = 5.0;
        profile[14] = 5.0;
        let peaks = detect_peaks(&profile, 1.0, (1, 28), 6);
        assert_eq!(peaks, vec![10]);
    }

    #[test]
    fn test_closely_spaced_lines_merge_with_default_separation() {
        // Five real grid lines 4 indices apart: the default separation of 6
        // merges neighbours and reports fewer lines than exist.
        let mut profile = vec![0.0; 40];
        for i in [10, 14, 18, 22, 26] {
            profile[i] = 9.0;
        }
        let merged = detect_peaks(&profile, 1.0, (1, 38), 6);
        assert_eq!(merged, vec![10, 18, 26]);

        let resolved = detect_peaks(&profile, 1.0, (1, 38), 3);
        assert_eq!(resolved, vec![10, 14, 18, 22, 26]);
    }

    #[test]
    fn test_dense_board_needs_lower_separation() {
        // 5px cells with 3px lines put neighbouring lines' edges 5 indices
        // apart; the default separation merges them and loses a column.
        let image = grid_image(60, 6, 8, 5, 3);
        let default = detect_board(image.view()).unwrap();
        assert_eq!(default.cols, 4);
        assert_eq!(default.rows, 4);

        let params = GridDetectionParams {
            min_peak_separation: 4,
            ..GridDetectionParams::default()
        };
        let board = detect_board_with(image.view(), &params).unwrap();
        assert_eq!(board.cols, 5);
        assert_eq!(board.rows, 5);
    }
}
