use std::collections::BTreeMap;

use tilescan_engine::FeatureVector;

/// Labeled training vectors, grouped by label.
///
/// Labels iterate in sorted order and vectors in insertion order, so every
/// consumer sees the same sequence for the same input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingSet {
    by_label: BTreeMap<String, Vec<FeatureVector>>,
}

impl TrainingSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<L>(&mut self, label: L, vector: FeatureVector)
    where
        L: Into<String>,
    {
        self.by_label.entry(label.into()).or_default().push(vector);
    }

    /// Replaces all vectors of `label`. An empty replacement removes the label.
    pub fn replace_label<L>(&mut self, label: L, vectors: Vec<FeatureVector>)
    where
        L: Into<String>,
    {
        let label = label.into();
        if vectors.is_empty() {
            self.by_label.remove(&label);
        } else {
            self.by_label.insert(label, vectors);
        }
    }

    /// Number of vectors across all labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_label.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }

    #[must_use]
    pub fn label_count(&self) -> usize {
        self.by_label.len()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.by_label.keys().map(String::as_str)
    }

    #[must_use]
    pub fn vectors(&self, label: &str) -> &[FeatureVector] {
        self.by_label.get(label).map_or(&[], Vec::as_slice)
    }

    /// Iterates `(label, vectors)` groups.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &[FeatureVector])> {
        self.by_label
            .iter()
            .map(|(label, vectors)| (label.as_str(), vectors.as_slice()))
    }

    /// Iterates every `(label, vector)` pair.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureVector)> {
        self.groups()
            .flat_map(|(label, vectors)| vectors.iter().map(move |v| (label, v)))
    }
}

impl<L> FromIterator<(L, FeatureVector)> for TrainingSet
where
    L: Into<String>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (L, FeatureVector)>,
    {
        let mut set = Self::new();
        for (label, vector) in iter {
            set.insert(label, vector);
        }
        set
    }
}

impl<L> Extend<(L, FeatureVector)> for TrainingSet
where
    L: Into<String>,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (L, FeatureVector)>,
    {
        for (label, vector) in iter {
            self.insert(label, vector);
        }
    }
}
