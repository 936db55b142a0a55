//! Cross-validation over a labeled dataset.
//!
//! A run extracts the tile vectors of every image once, then evaluates two
//! fold sets over them:
//!
//! - **baseline**: each image is classified by a 1-NN trained on the whole
//!   dataset, itself included. Every labeled tile is its own nearest
//!   neighbour, so anything below 100% points at conflicting labels.
//! - **augmented**: leave-one-image-out. The training set of each fold holds
//!   the other images only, augmented with jittered copies, and a 5-NN
//!   classifies the held-out image.
//!
//! Classifiers are trained from scratch for every fold. The only randomness
//! comes from the caller's `rng`, so a run is reproducible from its seed.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};

use chrono::{DateTime, Utc};
use rand::Rng;
use tilescan_classifier::{AUTO_LABEL_K, Classifier, Strategy, TrainingSet};
use tilescan_engine::DEFAULT_SAMPLE_SIZE;
use tracing::{debug, info, warn};

use crate::{
    augment::{AugmentParams, augment},
    dataset::{ExtractedImage, RasterSource, load_raster},
    labels::LabelExport,
    metrics::{EvaluationReport, MetricsAccumulator, TileOutcome},
    report::{BaselineSection, DiagnosticsOutcome, DiagnosticsReport},
};

/// Shared flag for stopping a run from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum RunError {
    #[display("diagnostics run cancelled after {processed} image(s)")]
    Cancelled { processed: usize },
    #[display("diagnostics run exceeded its deadline after {processed} image(s)")]
    DeadlineExceeded { processed: usize },
}

/// Stop conditions checked at every image boundary.
#[derive(Debug, Clone, Default)]
pub struct RunLimits {
    pub deadline: Option<Instant>,
    pub cancel: CancelToken,
}

impl RunLimits {
    /// Fails when the run should stop; `processed` is the number of images
    /// finished by the current phase.
    pub fn check(&self, processed: usize) -> Result<(), RunError> {
        if self.cancel.is_cancelled() {
            warn!(processed, "diagnostics run cancelled");
            return Err(RunError::Cancelled { processed });
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            warn!(processed, "diagnostics run exceeded its deadline");
            return Err(RunError::DeadlineExceeded { processed });
        }
        Ok(())
    }
}

/// How one fold set is trained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoldOptions {
    /// Excludes the evaluated image from its own training set.
    pub leave_one_out: bool,
    pub augment: Option<AugmentParams>,
    pub strategy: Strategy,
}

impl FoldOptions {
    /// Resubstitution with a 1-NN classifier.
    #[must_use]
    pub fn baseline() -> Self {
        Self {
            leave_one_out: false,
            augment: None,
            strategy: Strategy::KNearestNeighbors { k: 1 },
        }
    }

    /// Leave-one-image-out with augmented training data.
    #[must_use]
    pub fn augmented() -> Self {
        Self {
            leave_one_out: true,
            augment: Some(AugmentParams::default()),
            strategy: Strategy::KNearestNeighbors { k: AUTO_LABEL_K },
        }
    }
}

#[derive(Debug, Clone)]
pub struct CrossValidationOptions {
    /// Classifier version stamped into the report.
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub sample_size: usize,
    pub baseline: FoldOptions,
    pub augmented: FoldOptions,
    pub limits: RunLimits,
}

impl Default for CrossValidationOptions {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_owned(),
            generated_at: DateTime::default(),
            sample_size: DEFAULT_SAMPLE_SIZE,
            baseline: FoldOptions::baseline(),
            augmented: FoldOptions::augmented(),
            limits: RunLimits::default(),
        }
    }
}

/// Tile vectors of every image whose raster could be loaded.
#[derive(Debug, Clone, Default)]
pub struct ExtractedDataset {
    pub images: Vec<ExtractedImage>,
    /// Exports whose raster was unavailable.
    pub missing: usize,
}

impl ExtractedDataset {
    /// Normalizes every export and extracts its labeled tiles, one image at
    /// a time.
    pub fn extract<S>(
        dataset: &[LabelExport],
        rasters: &mut S,
        sample_size: usize,
        limits: &RunLimits,
    ) -> Result<Self, RunError>
    where
        S: RasterSource + ?Sized,
    {
        let mut extracted = Self::default();
        for (processed, export) in dataset.iter().enumerate() {
            limits.check(processed)?;
            let export = export.clone().normalize();
            let Some(raster) = load_raster(rasters, &export) else {
                extracted.missing += 1;
                continue;
            };
            if raster.width() == 0 || raster.height() == 0 {
                warn!(image = %export.image, "empty image, skipping");
                extracted.missing += 1;
                continue;
            }
            extracted
                .images
                .push(ExtractedImage::extract(&export, &raster, sample_size));
        }
        Ok(extracted)
    }

    fn sample_count(&self) -> usize {
        self.images.iter().map(|image| image.samples.len()).sum()
    }
}

/// Evaluates every image of `images` with a classifier trained per `fold`.
///
/// Images whose fold has no training data, or whose tiles cannot be
/// classified, are counted as skipped.
pub fn evaluate_fold_set<R>(
    images: &[ExtractedImage],
    fold: &FoldOptions,
    limits: &RunLimits,
    rng: &mut R,
) -> Result<EvaluationReport, RunError>
where
    R: Rng + ?Sized,
{
    let mut acc = MetricsAccumulator::new();
    for (index, held_out) in images.iter().enumerate() {
        limits.check(index)?;

        let mut training = images
            .iter()
            .enumerate()
            .filter(|(other, _)| !fold.leave_one_out || *other != index)
            .flat_map(|(_, image)| &image.samples)
            .map(|sample| (sample.label.as_str(), sample.vector.clone()))
            .collect::<TrainingSet>();
        if let Some(params) = &fold.augment {
            training = augment(&training, params, rng);
        }
        let classifier = fold.strategy.train(training);
        if classifier.centroids().is_empty() {
            debug!(image = %held_out.image, "no training data for fold, skipping");
            acc.skip_image();
            continue;
        }

        let outcomes = held_out.samples.iter().filter_map(|sample| {
            let classification = classifier.classify(&sample.vector)?;
            Some(TileOutcome {
                coord: sample.coord,
                expected: &sample.label,
                classification,
                vector: &sample.vector,
            })
        });
        acc.record_image(&held_out.image, outcomes);
    }
    Ok(acc.finish())
}

/// Runs the baseline and augmented evaluations over `dataset`.
///
/// Missing rasters are skipped. A dataset without any labeled tile that can
/// be evaluated yields [`DiagnosticsOutcome::NoData`].
pub fn run_diagnostics<S, R>(
    dataset: &[LabelExport],
    rasters: &mut S,
    options: &CrossValidationOptions,
    rng: &mut R,
) -> Result<DiagnosticsOutcome, RunError>
where
    S: RasterSource + ?Sized,
    R: Rng + ?Sized,
{
    let extracted =
        ExtractedDataset::extract(dataset, rasters, options.sample_size, &options.limits)?;
    if extracted.sample_count() == 0 {
        info!(
            exports = dataset.len(),
            missing = extracted.missing,
            "no labeled tiles to evaluate"
        );
        return Ok(DiagnosticsOutcome::NoData);
    }
    info!(
        images = extracted.images.len(),
        samples = extracted.sample_count(),
        missing = extracted.missing,
        "running diagnostics"
    );

    let mut baseline =
        evaluate_fold_set(&extracted.images, &options.baseline, &options.limits, rng)?;
    baseline.metrics.images_skipped += extracted.missing;
    let mut augmented =
        evaluate_fold_set(&extracted.images, &options.augmented, &options.limits, rng)?;
    augmented.metrics.images_skipped += extracted.missing;

    info!(
        baseline_accuracy = baseline.metrics.accuracy,
        accuracy = augmented.metrics.accuracy,
        non_unknown_accuracy = augmented.metrics.non_unknown_accuracy,
        "diagnostics finished"
    );
    Ok(DiagnosticsOutcome::Report(Box::new(DiagnosticsReport {
        version: options.version.clone(),
        generated_at: options.generated_at,
        baseline: BaselineSection {
            metrics: baseline.metrics,
        },
        augmented,
    })))
}
