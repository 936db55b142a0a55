use std::collections::BTreeMap;

use serde::Serialize;
use tilescan_engine::FeatureVector;
use tilescan_stats::descriptive::mean_and_std;

use crate::{distance::rms_distance, training_set::TrainingSet};

/// Standard deviations above the mean intra-class distance at which a match
/// is rejected.
pub const REJECT_SIGMA: f64 = 2.25;

/// Mean vector of one label plus the spread of its training vectors around it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Centroid {
    pub label: String,
    pub vector: FeatureVector,
    /// Mean RMS distance of the training vectors to `vector`.
    pub mean_distance: f64,
    /// Population standard deviation of those distances.
    pub std_distance: f64,
}

impl Centroid {
    /// Builds a centroid from same-length vectors. Returns `None` if empty.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_vectors(label: &str, vectors: &[&[f64]]) -> Option<Self> {
        let dim = vectors.first()?.len();
        debug_assert!(vectors.iter().all(|v| v.len() == dim));

        let n = vectors.len() as f64;
        let mut mean = vec![0.0; dim];
        for v in vectors {
            for (m, x) in mean.iter_mut().zip(*v) {
                *m += x;
            }
        }
        for m in &mut mean {
            *m /= n;
        }

        let distances = vectors
            .iter()
            .map(|v| rms_distance(v, &mean))
            .collect::<Vec<_>>();
        let (mean_distance, std_distance) = mean_and_std(&distances)?;

        Some(Self {
            label: label.to_owned(),
            vector: mean,
            mean_distance,
            std_distance,
        })
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.vector.len()
    }

    /// Largest distance still accepted as this label.
    #[must_use]
    pub fn reject_threshold(&self) -> f64 {
        self.mean_distance + REJECT_SIGMA * self.std_distance
    }

    #[must_use]
    pub fn accepts(&self, distance: f64) -> bool {
        distance <= self.reject_threshold()
    }

    #[must_use]
    pub fn distance_to(&self, vector: &[f64]) -> f64 {
        rms_distance(&self.vector, vector)
    }
}

/// Centroids of every label in a training set.
///
/// A label whose vectors come in several lengths gets one centroid per
/// length; queries only ever compare against centroids of their own length.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CentroidSet {
    centroids: Vec<Centroid>,
}

impl CentroidSet {
    #[must_use]
    pub fn build(training: &TrainingSet) -> Self {
        let mut centroids = vec![];
        for (label, vectors) in training.groups() {
            let mut by_dim: BTreeMap<usize, Vec<&[f64]>> = BTreeMap::new();
            for v in vectors {
                by_dim.entry(v.len()).or_default().push(v);
            }
            centroids.extend(
                by_dim
                    .values()
                    .filter_map(|group| Centroid::from_vectors(label, group)),
            );
        }
        Self { centroids }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.centroids.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Centroid> {
        self.centroids.iter()
    }

    /// Centroid of `label` with dimensionality `dim`.
    #[must_use]
    pub fn get(&self, label: &str, dim: usize) -> Option<&Centroid> {
        self.centroids
            .iter()
            .find(|c| c.label == label && c.dim() == dim)
    }

    /// Closest centroid of matching dimensionality, without any reject
    /// threshold.
    ///
    /// This measures raw separability for diagnostics; use a
    /// [`Classifier`](crate::Classifier) to get thresholded labels. Ties go
    /// to the label that sorts first.
    #[must_use]
    pub fn find_nearest(&self, vector: &[f64]) -> Option<(&Centroid, f64)> {
        self.centroids
            .iter()
            .filter(|c| c.dim() == vector.len())
            .map(|c| (c, c.distance_to(vector)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}
