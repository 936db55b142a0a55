use std::iter;

/// Root-mean-square Euclidean distance: `sqrt(Σ(a - b)² / dim)`.
///
/// Dividing by the dimension keeps distances comparable across sample
/// sizes. Empty vectors are at distance zero.
///
/// ```
/// # use tilescan_classifier::rms_distance;
/// assert_eq!(rms_distance(&[0.0, 0.0], &[1.0, 1.0]), 1.0);
/// assert_eq!(rms_distance(&[0.5; 3], &[0.5; 3]), 0.0);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn rms_distance(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "vectors must share a dimension");
    if a.is_empty() {
        return 0.0;
    }
    let sum = iter::zip(a, b).map(|(x, y)| (x - y).powi(2)).sum::<f64>();
    (sum / a.len() as f64).sqrt()
}
