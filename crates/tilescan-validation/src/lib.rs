//! Classifier quality measurement over a labeled screenshot dataset.
//!
//! # Pipeline
//!
//! 1. [`LabelExport`]s are normalized and matched with their rasters through
//!    a [`RasterSource`]; images without a raster are skipped
//! 2. [`run_diagnostics`] evaluates a baseline and an augmented
//!    leave-one-image-out fold set (see [`harness`])
//! 3. The [`DiagnosticsReport`] is summarized into a [`DiagnosticsRun`] and
//!    recorded in the [`RunHistory`] through a [`HistoryStore`]
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng;
//! use tilescan_validation::{
//!     CrossValidationOptions, DiagnosticsOutcome, MemoryRasters, run_diagnostics,
//! };
//!
//! let mut rasters = MemoryRasters::new();
//! let mut rng = rand_pcg::Pcg32::seed_from_u64(0);
//! let outcome = run_diagnostics(&[], &mut rasters, &CrossValidationOptions::default(), &mut rng);
//! assert_eq!(outcome.unwrap(), DiagnosticsOutcome::NoData);
//! ```

pub use self::{augment::*, dataset::*, harness::*, history::*, labels::*, metrics::*, report::*};

pub mod augment;
mod dataset;
pub mod harness;
mod history;
mod labels;
mod metrics;
mod report;
