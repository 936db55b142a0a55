use crate::core::{Rect, RgbaImageView};

/// Normalized color content of one tile: `3·N²` components in `[0, 1]`,
/// laid out as `R, G, B` per sample point in row-major order.
pub type FeatureVector = Vec<f64>;

/// Sample grid size used by the classifiers and the diagnostics harness.
pub const DEFAULT_SAMPLE_SIZE: usize = 14;

/// Number of components of a feature vector sampled on an `n × n` grid.
#[must_use]
pub const fn feature_len(sample_size: usize) -> usize {
    3 * sample_size * sample_size
}

/// Samples an `n × n` grid of pixels inside `rect` into a feature vector.
///
/// Sample `(i, j)` sits at the center of its cell:
///
/// ```text
/// x = rect.x + ((i + 0.5) / n) · rect.width
/// y = rect.y + ((j + 0.5) / n) · rect.height
/// ```
///
/// The pixel containing the point is read (floored, clamped to the image)
/// and its channels appended as `R/255, G/255, B/255`. Rows (`y`) are the
/// outer loop. A `sample_size` of zero is treated as one.
///
/// # Panics
///
/// Panics if the image is empty.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn extract_tile_vector(image: RgbaImageView<'_>, rect: Rect, sample_size: usize) -> FeatureVector {
    let n = sample_size.max(1);
    let mut vector = Vec::with_capacity(feature_len(n));
    for j in 0..n {
        let y = rect.y + ((j as f64 + 0.5) / n as f64) * rect.height;
        for i in 0..n {
            let x = rect.x + ((i as f64 + 0.5) / n as f64) * rect.width;
            let rgb = image.rgb_at(x, y);
            vector.extend(rgb.map(|c| f64::from(c) / 255.0));
        }
    }
    vector
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RgbaRaster;

    #[test]
    fn test_vector_shape_and_range() {
        #[expect(clippy::cast_possible_truncation)]
        let raster = RgbaRaster::from_fn(37, 23, |x, y| [(x * 7) as u8, (y * 11) as u8, (x ^ y) as u8, 255]);
        let rects = [
            Rect::new(0.0, 0.0, 37.0, 23.0),
            Rect::new(3.5, 2.25, 10.0, 7.0),
            Rect::new(30.0, 20.0, 20.0, 20.0),
            Rect::new(-5.0, -5.0, 4.0, 4.0),
        ];
        for rect in rects {
            for n in 1..6 {
                let v = extract_tile_vector(raster.view(), rect, n);
                assert_eq!(v.len(), 3 * n * n);
                assert!(v.iter().all(|c| (0.0..=1.0).contains(c)));
            }
        }
    }

    #[test]
    fn test_uniform_tile() {
        let raster = RgbaRaster::filled(8, 8, [255, 0, 51, 255]);
        let v = extract_tile_vector(raster.view(), Rect::new(0.0, 0.0, 8.0, 8.0), 2);
        assert_eq!(v, [1.0, 0.0, 0.2].repeat(4));
    }

    #[test]
    fn test_row_major_order() {
        // Quadrants: top-left red, top-right green, bottom-left blue, bottom-right white.
        let raster = RgbaRaster::from_fn(4, 4, |x, y| match (x < 2, y < 2) {
            (true, true) => [255, 0, 0, 255],
            (false, true) => [0, 255, 0, 255],
            (true, false) => [0, 0, 255, 255],
            (false, false) => [255, 255, 255, 255],
        });
        let v = extract_tile_vector(raster.view(), Rect::new(0.0, 0.0, 4.0, 4.0), 2);
        assert_eq!(
            v,
            vec![
                1.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, //
                0.0, 0.0, 1.0, //
                1.0, 1.0, 1.0,
            ]
        );
    }

    #[test]
    fn test_zero_sample_size_reads_center() {
        let raster = RgbaRaster::from_fn(3, 3, |x, y| if (x, y) == (1, 1) { [255, 255, 255, 255] } else { [0, 0, 0, 255] });
        let v = extract_tile_vector(raster.view(), Rect::new(0.0, 0.0, 3.0, 3.0), 0);
        assert_eq!(v, vec![1.0, 1.0, 1.0]);
    }
}
