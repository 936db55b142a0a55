//! Tile classification against a small labeled vocabulary.
//!
//! A classifier is trained from a [`TrainingSet`] (label → feature vectors)
//! and maps a tile's feature vector to a label plus the distance that backed
//! the decision.
//!
//! # Strategies
//!
//! Both strategies implement [`Classifier`] and share one reject policy,
//! computed from the per-label [`Centroid`] statistics:
//!
//! ```text
//! reject if distance > meanDistance + 2.25 · stdDistance
//! ```
//!
//! - [`NearestCentroid`] - picks the closest per-label mean vector
//! - [`KNearestNeighbors`] - majority vote over the `k` closest training
//!   vectors, ties broken by centroid proximity
//!
//! A rejected match is not an error: it is reported as [`UNKNOWN_LABEL`]
//! with the measured distance. A classifier without any centroid of the
//! query's dimensionality returns `None` instead.
//!
//! # Example
//!
//! ```
//! use tilescan_classifier::{Classifier, Strategy, TrainingSet};
//!
//! let mut training = TrainingSet::new();
//! training.insert("red", vec![1.0, 0.0, 0.0]);
//! training.insert("red", vec![0.9, 0.1, 0.0]);
//! training.insert("blue", vec![0.0, 0.0, 1.0]);
//! training.insert("blue", vec![0.1, 0.0, 0.9]);
//!
//! let classifier = Strategy::KNearestNeighbors { k: 1 }.train(training);
//! let result = classifier.classify(&[1.0, 0.0, 0.0]).unwrap();
//! assert_eq!(result.label, "red");
//! assert_eq!(result.distance, 0.0);
//! ```
//!
//! Training data and centroids are plain values owned by the classifier;
//! nothing is cached between classifiers, so independently trained
//! classifiers never share state.

use serde::Serialize;

pub use self::{
    auto_label::*, centroid::*, distance::*, knn::*, nearest_centroid::*, strategy::*,
    training_set::*,
};

mod auto_label;
mod centroid;
mod distance;
mod knn;
mod nearest_centroid;
mod strategy;
mod training_set;

/// Label reported for matches outside every reject threshold.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Outcome of classifying one feature vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub label: String,
    /// Distance that backed the decision (nearest centroid, or mean distance
    /// of the winning k-NN votes). Reported even when the label is rejected.
    pub distance: f64,
}

impl Classification {
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.label == UNKNOWN_LABEL
    }
}

/// Maps feature vectors to labels.
pub trait Classifier {
    /// Per-label centroids backing the reject threshold.
    fn centroids(&self) -> &CentroidSet;

    /// Classifies `vector`.
    ///
    /// Returns `None` when nothing of matching dimensionality was trained.
    fn classify(&self, vector: &[f64]) -> Option<Classification>;
}
