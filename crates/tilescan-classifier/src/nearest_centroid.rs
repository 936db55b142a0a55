use crate::{
    Classification, Classifier, UNKNOWN_LABEL, centroid::CentroidSet, training_set::TrainingSet,
};

/// Classifies by the closest per-label mean vector.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestCentroid {
    centroids: CentroidSet,
}

impl NearestCentroid {
    #[must_use]
    pub fn train(training: &TrainingSet) -> Self {
        Self::from_centroids(CentroidSet::build(training))
    }

    #[must_use]
    pub fn from_centroids(centroids: CentroidSet) -> Self {
        Self { centroids }
    }
}

impl Classifier for NearestCentroid {
    fn centroids(&self) -> &CentroidSet {
        &self.centroids
    }

    fn classify(&self, vector: &[f64]) -> Option<Classification> {
        let (centroid, distance) = self.centroids.find_nearest(vector)?;
        let label = if centroid.accepts(distance) {
            centroid.label.clone()
        } else {
            UNKNOWN_LABEL.to_owned()
        };
        Some(Classification { label, distance })
    }
}
