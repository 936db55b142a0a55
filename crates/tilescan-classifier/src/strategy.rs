use crate::{
    Classification, Classifier, centroid::CentroidSet, knn::KNearestNeighbors,
    nearest_centroid::NearestCentroid, training_set::TrainingSet,
};

/// Which classification algorithm to train.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    NearestCentroid,
    KNearestNeighbors { k: usize },
}

impl Strategy {
    /// Trains a fresh classifier; nothing is shared with earlier classifiers.
    #[must_use]
    pub fn train(self, training: TrainingSet) -> TrainedClassifier {
        match self {
            Self::NearestCentroid => {
                TrainedClassifier::NearestCentroid(NearestCentroid::train(&training))
            }
            Self::KNearestNeighbors { k } => {
                TrainedClassifier::KNearestNeighbors(KNearestNeighbors::train(training, k))
            }
        }
    }
}

/// A classifier trained with one of the [`Strategy`] variants.
#[derive(Debug, Clone, PartialEq)]
pub enum TrainedClassifier {
    NearestCentroid(NearestCentroid),
    KNearestNeighbors(KNearestNeighbors),
}

impl Classifier for TrainedClassifier {
    fn centroids(&self) -> &CentroidSet {
        match self {
            Self::NearestCentroid(c) => c.centroids(),
            Self::KNearestNeighbors(c) => c.centroids(),
        }
    }

    fn classify(&self, vector: &[f64]) -> Option<Classification> {
        match self {
            Self::NearestCentroid(c) => c.classify(vector),
            Self::KNearestNeighbors(c) => c.classify(vector),
        }
    }
}
