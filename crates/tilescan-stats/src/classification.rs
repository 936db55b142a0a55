/// Divides `numerator` by `denominator`, returning `0.0` for an empty denominator.
///
/// Every ratio in a diagnostics report goes through this so that labels or
/// images without samples report `0.0` instead of `NaN`.
///
/// ```
/// # use tilescan_stats::classification::ratio;
/// assert_eq!(ratio(3, 4), 0.75);
/// assert_eq!(ratio(0, 0), 0.0);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Mean of `count` values summing to `sum`, `0.0` when `count` is zero.
///
/// ```
/// # use tilescan_stats::classification::average;
/// assert_eq!(average(3.0, 4), 0.75);
/// assert_eq!(average(1.0, 0), 0.0);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn average(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Precision, recall and F1 score for a single class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrecisionRecall {
    /// `correct / predicted`
    pub precision: f64,
    /// `correct / support`
    pub recall: f64,
    /// Harmonic mean of precision and recall, `0.0` when both are zero.
    pub f1: f64,
}

impl PrecisionRecall {
    /// Computes the scores from raw counts.
    ///
    /// # Arguments
    ///
    /// * `correct` - Samples of the class that were predicted as the class
    /// * `predicted` - Samples (of any class) predicted as the class
    /// * `support` - Samples whose ground truth is the class
    ///
    /// ```
    /// # use tilescan_stats::classification::PrecisionRecall;
    /// let pr = PrecisionRecall::from_counts(3, 4, 6);
    /// assert_eq!(pr.precision, 0.75);
    /// assert_eq!(pr.recall, 0.5);
    /// assert!((pr.f1 - 0.6).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn from_counts(correct: usize, predicted: usize, support: usize) -> Self {
        let precision = ratio(correct, predicted);
        let recall = ratio(correct, support);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        Self {
            precision,
            recall,
            f1,
        }
    }
}
