use crate::core::RgbaImageView;

/// Row and column contrast-energy profiles of an image.
///
/// `rows[y]` is the summed edge strength of image row `y`, `cols[x]` the
/// summed edge strength of column `x`. Grid lines show up as spikes in both.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeProfiles {
    pub rows: Vec<f64>,
    pub cols: Vec<f64>,
}

/// Projects forward-difference luminance edges onto the row and column axes.
///
/// For every interior pixel `(x, y)` with `1 <= x < W-1` and `1 <= y < H-1`:
///
/// ```text
/// edge = |L(x,y) - L(x+1,y)| + |L(x,y) - L(x,y+1)|
/// rows[y] += edge
/// cols[x] += edge
/// ```
///
/// Border pixels contribute nothing, and images narrower or shorter than
/// three pixels produce all-zero profiles.
#[must_use]
pub fn project_edges(image: RgbaImageView<'_>) -> EdgeProfiles {
    let width = image.width();
    let height = image.height();
    let mut rows = vec![0.0; height];
    let mut cols = vec![0.0; width];

    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            let lum = image.luminance(x, y);
            let edge = (lum - image.luminance(x + 1, y)).abs()
                + (lum - image.luminance(x, y + 1)).abs();
            rows[y] += edge;
            cols[x] += edge;
        }
    }

    EdgeProfiles { rows, cols }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RgbaRaster;

    #[test]
    fn test_flat_image_has_no_energy() {
        let raster = RgbaRaster::filled(16, 12, [90, 120, 30, 255]);
        let profiles = project_edges(raster.view());
        assert_eq!(profiles.rows.len(), 12);
        assert_eq!(profiles.cols.len(), 16);
        assert!(profiles.rows.iter().chain(&profiles.cols).all(|&e| e == 0.0));
    }

    #[test]
    fn test_vertical_step_lands_in_one_column() {
        // Left half black, right half white: the only horizontal contrast is
        // between x = 4 and x = 5.
        let raster = RgbaRaster::from_fn(10, 6, |x, _| {
            if x < 5 { [0, 0, 0, 255] } else { [255, 255, 255, 255] }
        });
        let profiles = project_edges(raster.view());
        for (x, &e) in profiles.cols.iter().enumerate() {
            if x == 4 {
                // Four interior rows, each contributing 255.
                assert!((e - 4.0 * 255.0).abs() < 1e-6);
            } else {
                assert_eq!(e, 0.0, "column {x}");
            }
        }
        for y in 1..5 {
            assert!((profiles.rows[y] - 255.0).abs() < 1e-6);
        }
        assert_eq!(profiles.rows[0], 0.0);
        assert_eq!(profiles.rows[5], 0.0);
    }

    #[test]
    fn test_border_pixels_are_excluded() {
        // Contrast only on the outermost column never reaches the profile.
        let raster = RgbaRaster::from_fn(6, 6, |x, _| {
            if x == 0 { [255, 255, 255, 255] } else { [0, 0, 0, 255] }
        });
        let profiles = project_edges(raster.view());
        assert!(profiles.cols.iter().all(|&e| e == 0.0));
    }

    #[test]
    fn test_tiny_image() {
        let raster = RgbaRaster::filled(2, 1, [255, 0, 0, 255]);
        let profiles = project_edges(raster.view());
        assert_eq!(profiles.rows, vec![0.0]);
        assert_eq!(profiles.cols, vec![0.0, 0.0]);
    }

    #[test]
    fn test_projection_is_deterministic() {
        #[expect(clippy::cast_possible_truncation)]
        let raster = RgbaRaster::from_fn(20, 20, |x, y| [(x * 13) as u8, (y * 7) as u8, 50, 255]);
        assert_eq!(project_edges(raster.view()), project_edges(raster.view()));
    }
}
