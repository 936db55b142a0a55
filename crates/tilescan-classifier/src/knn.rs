use std::collections::BTreeMap;

use crate::{
    Classification, Classifier, UNKNOWN_LABEL, centroid::CentroidSet, distance::rms_distance,
    training_set::TrainingSet,
};

/// Neighbour count used when auto-labelling a board.
pub const AUTO_LABEL_K: usize = 5;

#[derive(Debug, Default)]
struct Vote {
    count: usize,
    distance_sum: f64,
}

/// Majority vote over the `k` closest training vectors.
///
/// Ties between equally voted labels go to the label whose centroid is
/// closest to the query. The winner is downgraded to [`UNKNOWN_LABEL`] when
/// the mean distance of its votes exceeds its centroid's reject threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct KNearestNeighbors {
    training: TrainingSet,
    centroids: CentroidSet,
    k: usize,
}

impl KNearestNeighbors {
    /// Trains on `training`; a `k` of zero is treated as one.
    #[must_use]
    pub fn train(training: TrainingSet, k: usize) -> Self {
        let centroids = CentroidSet::build(&training);
        Self {
            training,
            centroids,
            k: k.max(1),
        }
    }

    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    #[must_use]
    pub fn training(&self) -> &TrainingSet {
        &self.training
    }
}

impl Classifier for KNearestNeighbors {
    fn centroids(&self) -> &CentroidSet {
        &self.centroids
    }

    #[expect(clippy::cast_precision_loss)]
    fn classify(&self, vector: &[f64]) -> Option<Classification> {
        let dim = vector.len();
        let mut neighbours = self
            .training
            .iter()
            .filter(|(_, v)| v.len() == dim)
            .map(|(label, v)| (label, rms_distance(v, vector)))
            .collect::<Vec<_>>();
        if neighbours.is_empty() {
            return None;
        }
        // Stable sort: equidistant vectors keep training-set order.
        neighbours.sort_by(|a, b| a.1.total_cmp(&b.1));
        neighbours.truncate(self.k);

        let mut votes: BTreeMap<&str, Vote> = BTreeMap::new();
        for (label, distance) in neighbours {
            let vote = votes.entry(label).or_default();
            vote.count += 1;
            vote.distance_sum += distance;
        }
        let top = votes.values().map(|v| v.count).max()?;
        let centroid_distance = |label: &str| {
            self.centroids
                .get(label, dim)
                .map_or(f64::INFINITY, |c| c.distance_to(vector))
        };
        let (winner, vote) = votes
            .iter()
            .filter(|(_, v)| v.count == top)
            .min_by(|a, b| centroid_distance(*a.0).total_cmp(&centroid_distance(*b.0)))?;

        let distance = vote.distance_sum / vote.count as f64;
        let accepted = self
            .centroids
            .get(winner, dim)
            .is_none_or(|c| c.accepts(distance));
        let label = if accepted { *winner } else { UNKNOWN_LABEL };
        Some(Classification {
            label: label.to_owned(),
            distance,
        })
    }
}
