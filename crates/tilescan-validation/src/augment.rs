//! Training-set augmentation for the leave-one-image-out pass.
//!
//! Every training vector gains [`AugmentParams::copies`] jittered copies:
//! independent Gaussian noise per component, clamped back to `[0, 1]`.
//! The `unknown` label is then randomly subsampled so a large pool of
//! rejected tiles does not drown out the real labels.

use rand::{Rng, seq::IndexedRandom};
use rand_distr::Normal;
use tilescan_classifier::{TrainingSet, UNKNOWN_LABEL};
use tilescan_engine::FeatureVector;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AugmentParams {
    /// Jittered copies added per training vector.
    pub copies: usize,
    /// Standard deviation of the per-component noise.
    pub sigma: f64,
    /// Upper bound on `unknown` vectors after augmentation.
    pub unknown_cap: Option<usize>,
}

impl Default for AugmentParams {
    fn default() -> Self {
        Self {
            copies: 4,
            sigma: 0.035,
            unknown_cap: Some(80),
        }
    }
}

/// Adds independent noise to every component, clamped to `[0, 1]`.
pub fn jitter<R>(vector: &[f64], noise: &Normal<f64>, rng: &mut R) -> FeatureVector
where
    R: Rng + ?Sized,
{
    vector
        .iter()
        .map(|v| (v + rng.sample(noise)).clamp(0.0, 1.0))
        .collect()
}

/// Returns an augmented copy of `training`.
///
/// Original vectors are kept in front of their jittered copies. A `sigma`
/// that is negative or not finite disables the jitter.
pub fn augment<R>(training: &TrainingSet, params: &AugmentParams, rng: &mut R) -> TrainingSet
where
    R: Rng + ?Sized,
{
    let mut augmented = training.clone();
    // `Normal::new` accepts a negative deviation.
    let noise = if params.sigma.is_finite() && params.sigma >= 0.0 {
        Normal::new(0.0, params.sigma).ok()
    } else {
        None
    };
    match noise {
        Some(noise) => {
            for (label, vectors) in training.groups() {
                let mut expanded = Vec::with_capacity(vectors.len() * (params.copies + 1));
                for vector in vectors {
                    expanded.push(vector.clone());
                    expanded.extend((0..params.copies).map(|_| jitter(vector, &noise, rng)));
                }
                augmented.replace_label(label, expanded);
            }
        }
        _ => warn!(sigma = params.sigma, "invalid noise sigma, augmentation skipped"),
    }
    if let Some(cap) = params.unknown_cap {
        cap_label(&mut augmented, UNKNOWN_LABEL, cap, rng);
    }
    debug!(before = training.len(), after = augmented.len(), "augmented training set");
    augmented
}

/// Keeps a random subset of at most `cap` vectors of `label`.
pub fn cap_label<R>(training: &mut TrainingSet, label: &str, cap: usize, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let vectors = training.vectors(label);
    if vectors.len() <= cap {
        return;
    }
    let kept = vectors
        .choose_multiple(rng, cap)
        .cloned()
        .collect::<Vec<_>>();
    training.replace_label(label, kept);
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(42)
    }

    #[test]
    fn test_jitter_stays_in_unit_range() {
        let noise = Normal::new(0.0, 0.5).unwrap();
        let mut rng = rng();
        for _ in 0..100 {
            let jittered = jitter(&[0.0, 1.0, 0.5, 0.99], &noise, &mut rng);
            assert_eq!(jittered.len(), 4);
            assert!(jittered.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn test_augment_multiplies_every_label() {
        let training: TrainingSet = [
            ("a", vec![0.2, 0.2]),
            ("a", vec![0.3, 0.2]),
            ("b", vec![0.8, 0.9]),
        ]
        .into_iter()
        .collect();
        let augmented = augment(&training, &AugmentParams::default(), &mut rng());
        assert_eq!(augmented.vectors("a").len(), 10);
        assert_eq!(augmented.vectors("b").len(), 5);
        assert_eq!(augmented.vectors("b")[0], vec![0.8, 0.9]);
        assert!(
            augmented.vectors("b")[1..]
                .iter()
                .all(|v| v.iter().zip([0.8, 0.9]).all(|(x, y)| (x - y).abs() < 0.5))
        );
    }

    #[test]
    fn test_unknown_is_capped() {
        let training: TrainingSet = (0..30)
            .map(|i| (UNKNOWN_LABEL, vec![f64::from(i) / 30.0]))
            .chain([("a", vec![0.5])])
            .collect();
        let augmented = augment(&training, &AugmentParams::default(), &mut rng());
        assert_eq!(augmented.vectors(UNKNOWN_LABEL).len(), 80);
        assert_eq!(augmented.vectors("a").len(), 5);

        let uncapped = AugmentParams {
            unknown_cap: None,
            ..AugmentParams::default()
        };
        let augmented = augment(&training, &uncapped, &mut rng());
        assert_eq!(augmented.vectors(UNKNOWN_LABEL).len(), 150);
    }

    #[test]
    fn test_augment_is_deterministic_per_seed() {
        let training: TrainingSet = [("a", vec![0.1, 0.2, 0.3])].into_iter().collect();
        let params = AugmentParams::default();
        assert_eq!(
            augment(&training, &params, &mut rng()),
            augment(&training, &params, &mut rng())
        );
    }

    #[test]
    fn test_invalid_sigma_keeps_originals() {
        let training: TrainingSet = [("a", vec![0.1]), ("a", vec![0.2])].into_iter().collect();
        let params = AugmentParams {
            sigma: -1.0,
            ..AugmentParams::default()
        };
        assert_eq!(augment(&training, &params, &mut rng()), training);
    }

    #[test]
    fn test_non_finite_sigma_keeps_originals() {
        let training: TrainingSet = [("a", vec![0.1]), ("a", vec![0.2])].into_iter().collect();
        for sigma in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, -0.001] {
            let params = AugmentParams {
                sigma,
                unknown_cap: None,
                ..AugmentParams::default()
            };
            assert_eq!(augment(&training, &params, &mut rng()), training);
        }
    }

    #[test]
    fn test_zero_sigma_duplicates_vectors() {
        let training: TrainingSet = [("a", vec![0.1])].into_iter().collect();
        let params = AugmentParams {
            sigma: 0.0,
            copies: 2,
            unknown_cap: None,
        };
        let augmented = augment(&training, &params, &mut rng());
        assert_eq!(augmented.vectors("a"), &[vec![0.1], vec![0.1], vec![0.1]]);
    }

    #[test]
    fn test_cap_label_below_cap_is_noop() {
        let mut training: TrainingSet = [("a", vec![0.1]), ("a", vec![0.2])].into_iter().collect();
        let before = training.clone();
        cap_label(&mut training, "a", 2, &mut rng());
        assert_eq!(training, before);
        cap_label(&mut training, "a", 1, &mut rng());
        assert_eq!(training.vectors("a").len(), 1);
    }
}
