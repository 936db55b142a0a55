//! Aggregation of per-tile outcomes into diagnostics metrics.
//!
//! A tile counts as *non-unknown* when its ground-truth label is not
//! [`UNKNOWN_LABEL`]; `nonUnknownAccuracy` therefore measures how well the
//! real vocabulary is recognized.
//!
//! For a mismatch the predicted label receives a false positive unless the
//! prediction is [`UNKNOWN_LABEL`], in which case the expected label receives
//! a false unknown instead.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tilescan_classifier::{Classification, UNKNOWN_LABEL};
use tilescan_engine::TileCoordinate;
use tilescan_stats::classification::{PrecisionRecall, average, ratio};

/// Confusion pairs kept in a report.
pub const MAX_CONFUSIONS: usize = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetrics {
    pub total: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub non_unknown_total: usize,
    pub non_unknown_correct: usize,
    pub non_unknown_accuracy: f64,
    pub avg_distance: f64,
    pub images_evaluated: usize,
    pub images_skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelMetric {
    pub label: String,
    /// Tiles whose ground truth is this label.
    pub support: usize,
    /// Tiles predicted as this label.
    pub predicted: usize,
    pub correct: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Mean prediction distance over the label's support.
    pub avg_distance: f64,
    pub false_unknown: usize,
    pub false_positive: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetric {
    pub image: String,
    pub total: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub avg_distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfusionEntry {
    pub expected: String,
    pub predicted: String,
    pub count: usize,
    /// `count / support(expected)`
    pub rate: f64,
}

/// Tile preview rendered from its feature vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileThumbnail {
    pub width: usize,
    pub height: usize,
    /// Row-major RGB8 pixels.
    pub rgb: Vec<u8>,
}

impl TileThumbnail {
    /// Renders an `n × n` feature vector back into pixels.
    ///
    /// A vector whose length is not `3·n²` is rendered as a single row.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn from_vector(vector: &[f64]) -> Self {
        let pixels = vector.len() / 3;
        let side = pixels.isqrt();
        let (width, height) = if side * side == pixels {
            (side, side)
        } else {
            (pixels, usize::from(pixels > 0))
        };
        let rgb = vector[..pixels * 3]
            .iter()
            .map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect();
        Self { width, height, rgb }
    }
}

/// A tile whose prediction disagreed with its ground truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MismatchRow {
    pub image: String,
    pub row: usize,
    pub col: usize,
    pub expected: String,
    pub predicted: String,
    pub distance: f64,
    pub thumbnail: TileThumbnail,
}

/// Metrics of one evaluation mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReport {
    pub metrics: RunMetrics,
    pub label_metrics: Vec<LabelMetric>,
    pub image_metrics: Vec<ImageMetric>,
    pub confusions: Vec<ConfusionEntry>,
    pub rows: Vec<MismatchRow>,
}

/// Classification of one ground-truth tile.
#[derive(Debug, Clone)]
pub struct TileOutcome<'a> {
    pub coord: TileCoordinate,
    pub expected: &'a str,
    pub classification: Classification,
    pub vector: &'a [f64],
}

#[derive(Debug, Default)]
struct LabelCounts {
    support: usize,
    predicted: usize,
    correct: usize,
    distance_sum: f64,
    false_unknown: usize,
    false_positive: usize,
}

/// Collects tile outcomes image by image.
#[derive(Debug, Default)]
pub struct MetricsAccumulator {
    total: usize,
    correct: usize,
    non_unknown_total: usize,
    non_unknown_correct: usize,
    distance_sum: f64,
    images_skipped: usize,
    labels: BTreeMap<String, LabelCounts>,
    confusion: BTreeMap<(String, String), usize>,
    images: Vec<ImageMetric>,
    rows: Vec<MismatchRow>,
}

impl MetricsAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every classified tile of `image`. An image without outcomes
    /// counts as skipped.
    pub fn record_image<'a, I>(&mut self, image: &str, outcomes: I)
    where
        I: IntoIterator<Item = TileOutcome<'a>>,
    {
        let mut total = 0;
        let mut correct = 0;
        let mut distance_sum = 0.0;
        for outcome in outcomes {
            let TileOutcome {
                coord,
                expected,
                classification,
                vector,
            } = outcome;
            let predicted = classification.label.as_str();
            let hit = predicted == expected;

            total += 1;
            distance_sum += classification.distance;
            if hit {
                correct += 1;
            }
            if expected != UNKNOWN_LABEL {
                self.non_unknown_total += 1;
                if hit {
                    self.non_unknown_correct += 1;
                }
            }

            let expected_counts = self.labels.entry(expected.to_owned()).or_default();
            expected_counts.support += 1;
            expected_counts.distance_sum += classification.distance;
            if hit {
                expected_counts.correct += 1;
            } else if predicted == UNKNOWN_LABEL {
                expected_counts.false_unknown += 1;
            }
            let predicted_counts = self.labels.entry(predicted.to_owned()).or_default();
            predicted_counts.predicted += 1;
            if !hit && predicted != UNKNOWN_LABEL {
                predicted_counts.false_positive += 1;
            }

            if !hit {
                *self
                    .confusion
                    .entry((expected.to_owned(), predicted.to_owned()))
                    .or_default() += 1;
                self.rows.push(MismatchRow {
                    image: image.to_owned(),
                    row: coord.row,
                    col: coord.col,
                    expected: expected.to_owned(),
                    predicted: predicted.to_owned(),
                    distance: classification.distance,
                    thumbnail: TileThumbnail::from_vector(vector),
                });
            }
        }

        if total == 0 {
            self.skip_image();
            return;
        }
        self.total += total;
        self.correct += correct;
        self.distance_sum += distance_sum;
        self.images.push(ImageMetric {
            image: image.to_owned(),
            total,
            correct,
            accuracy: ratio(correct, total),
            avg_distance: average(distance_sum, total),
        });
    }

    /// Records an image that contributed nothing to the aggregates.
    pub fn skip_image(&mut self) {
        self.images_skipped += 1;
    }

    #[must_use]
    pub fn finish(self) -> EvaluationReport {
        let metrics = RunMetrics {
            total: self.total,
            correct: self.correct,
            accuracy: ratio(self.correct, self.total),
            non_unknown_total: self.non_unknown_total,
            non_unknown_correct: self.non_unknown_correct,
            non_unknown_accuracy: ratio(self.non_unknown_correct, self.non_unknown_total),
            avg_distance: average(self.distance_sum, self.total),
            images_evaluated: self.images.len(),
            images_skipped: self.images_skipped,
        };

        let mut label_metrics = self
            .labels
            .iter()
            .map(|(label, counts)| {
                let scores =
                    PrecisionRecall::from_counts(counts.correct, counts.predicted, counts.support);
                LabelMetric {
                    label: label.clone(),
                    support: counts.support,
                    predicted: counts.predicted,
                    correct: counts.correct,
                    precision: scores.precision,
                    recall: scores.recall,
                    f1: scores.f1,
                    avg_distance: average(counts.distance_sum, counts.support),
                    false_unknown: counts.false_unknown,
                    false_positive: counts.false_positive,
                }
            })
            .collect::<Vec<_>>();
        // Labels are already sorted by name; the stable sort keeps that for ties.
        label_metrics.sort_by(|a, b| b.support.cmp(&a.support));

        let mut confusions = self
            .confusion
            .into_iter()
            .map(|((expected, predicted), count)| {
                let support = self.labels.get(&expected).map_or(0, |c| c.support);
                ConfusionEntry {
                    rate: ratio(count, support),
                    expected,
                    predicted,
                    count,
                }
            })
            .collect::<Vec<_>>();
        confusions.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| b.rate.total_cmp(&a.rate))
        });
        confusions.truncate(MAX_CONFUSIONS);

        EvaluationReport {
            metrics,
            label_metrics,
            image_metrics: self.images,
            confusions,
            rows: self.rows,
        }
    }
}
