use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use chrono::Utc;
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use tilescan_engine::DEFAULT_SAMPLE_SIZE;
use tilescan_stats::descriptive::DescriptiveStats;
use tilescan_validation::{
    CancelToken, CrossValidationOptions, DiagnosticsRun, RunLimits, record_run, run_diagnostics,
};
use tracing::{info, warn};

use crate::util::{DirectoryRasters, JsonFileHistory, Output, read_label_dir};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct DiagnoseArg {
    /// Directory of label exports
    labels: PathBuf,
    /// Directory of the labeled images [default: the label directory]
    #[arg(long)]
    images: Option<PathBuf>,
    /// Seed of the augmentation noise [default: random]
    #[arg(long)]
    seed: Option<u64>,
    /// Samples per tile side
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE)]
    sample_size: usize,
    /// History file the run is recorded in
    #[arg(long)]
    history: Option<PathBuf>,
    /// Give up after this many seconds
    #[arg(long)]
    deadline_secs: Option<u64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &DiagnoseArg) -> anyhow::Result<()> {
    let DiagnoseArg {
        labels,
        images,
        seed,
        sample_size,
        history,
        deadline_secs,
        output,
    } = arg;

    let exports = read_label_dir(labels)?;
    let mut rasters = DirectoryRasters::new(images.clone().unwrap_or_else(|| labels.clone()));
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    info!(seed, "augmentation seed");
    let mut rng = Pcg32::seed_from_u64(seed);

    let options = CrossValidationOptions {
        generated_at: Utc::now(),
        sample_size: *sample_size,
        limits: RunLimits {
            deadline: deadline_secs.map(|secs| Instant::now() + Duration::from_secs(secs)),
            cancel: CancelToken::new(),
        },
        ..CrossValidationOptions::default()
    };
    let outcome = run_diagnostics(&exports, &mut rasters, &options, &mut rng)?;
    let Some(report) = outcome.report() else {
        eprintln!("No labeled tiles found in {}", labels.display());
        return Output::save_json(&outcome, output.as_deref());
    };

    let baseline = &report.baseline.metrics;
    let augmented = &report.augmented.metrics;
    eprintln!("Baseline (resubstitution, 1-NN):");
    eprintln!("  Accuracy:    {:.1}% of {} tiles", baseline.accuracy * 100.0, baseline.total);
    eprintln!("Leave-one-image-out (augmented):");
    eprintln!("  Accuracy:    {:.1}% of {} tiles", augmented.accuracy * 100.0, augmented.total);
    eprintln!("  Non-unknown: {:.1}%", augmented.non_unknown_accuracy * 100.0);
    eprintln!("  Distance:    {:.4}", augmented.avg_distance);
    eprintln!(
        "  Images:      {} evaluated, {} skipped",
        augmented.images_evaluated, augmented.images_skipped
    );
    if let Some(stats) =
        DescriptiveStats::new(report.augmented.image_metrics.iter().map(|m| m.accuracy))
    {
        eprintln!(
            "  Per image:   min {:.1}%, median {:.1}%, max {:.1}%",
            stats.min * 100.0,
            stats.median * 100.0,
            stats.max * 100.0
        );
    }
    if !report.augmented.confusions.is_empty() {
        eprintln!("  Top confusions:");
        for entry in report.augmented.confusions.iter().take(5) {
            eprintln!(
                "    {} -> {}: {} ({:.0}%)",
                entry.expected,
                entry.predicted,
                entry.count,
                entry.rate * 100.0
            );
        }
    }

    if let Some(path) = history {
        let mut store = JsonFileHistory::new(path.clone());
        let history = record_run(&mut store, DiagnosticsRun::from_report(report));
        eprintln!("History: {} runs in {}", history.runs().len(), path.display());
        if let Some(delta) = history.latest_delta() {
            eprintln!(
                "  Change: accuracy {:+.1}pt, non-unknown {:+.1}pt, distance {:+.4}",
                delta.accuracy * 100.0,
                delta.non_unknown_accuracy * 100.0,
                delta.avg_distance
            );
            if delta.is_regression() {
                warn!(
                    accuracy = delta.accuracy,
                    non_unknown_accuracy = delta.non_unknown_accuracy,
                    "accuracy regressed since the previous run"
                );
            }
        }
    }

    Output::save_json(&outcome, output.as_deref())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tilescan_engine::Rect;
    use tilescan_validation::{LabelExport, TileLabel};

    use super::*;

    fn arg(labels: PathBuf, output: PathBuf) -> DiagnoseArg {
        DiagnoseArg {
            labels,
            images: None,
            seed: Some(3),
            sample_size: 4,
            history: None,
            deadline_secs: None,
            output: Some(output),
        }
    }

    fn write_board(dir: &std::path::Path, image: &str) {
        let pixels = image::RgbaImage::from_fn(90, 90, |x, y| {
            let v = u8::try_from(20 * (y / 30) + 60 * (x / 30) + 10).unwrap();
            image::Rgba([v, v, 255 - v, 255])
        });
        pixels.save(dir.join(image)).unwrap();
        let labels = (0..3)
            .flat_map(|row| (0..3).map(move |col| (row, col)))
            .map(|(row, col)| TileLabel {
                row,
                col,
                label: format!("t{row}{col}"),
            })
            .collect();
        let export = LabelExport {
            image: image.to_owned(),
            rows: 3,
            cols: 3,
            bounds: Rect::new(0.0, 0.0, 90.0, 90.0),
            labels,
            created_at: None,
        };
        let json = serde_json::to_vec(&export).unwrap();
        fs::write(dir.join(format!("{image}.json")), json).unwrap();
    }

    fn read_output(path: &std::path::Path) -> serde_json::Value {
        serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
    }

    #[test]
    fn test_report_output_is_tagged() {
        let dir = tempfile::tempdir().unwrap();
        write_board(dir.path(), "a.png");
        write_board(dir.path(), "b.png");
        let output = dir.path().join("diagnostics.out");
        run(&arg(dir.path().to_owned(), output.clone())).unwrap();

        let json = read_output(&output);
        assert_eq!(json["status"], "report");
        assert_eq!(json["baseline"]["metrics"]["total"], 18);
        assert!(json["augmented"]["metrics"]["accuracy"].is_number());
    }

    #[test]
    fn test_empty_dataset_output_is_tagged() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("diagnostics.out");
        run(&arg(dir.path().to_owned(), output.clone())).unwrap();

        let json = read_output(&output);
        assert_eq!(json["status"], "noData");
    }
}
