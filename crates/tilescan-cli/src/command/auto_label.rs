use std::path::PathBuf;

use anyhow::Context;
use tilescan_classifier::{AUTO_LABEL_K, Strategy, TrainingSet, UNKNOWN_LABEL, label_board};
use tilescan_engine::{DEFAULT_SAMPLE_SIZE, detect_board};
use tilescan_validation::{ExtractedDataset, LabelExport, RunLimits};

use crate::util::{DirectoryRasters, Output, load_image, read_json_file, read_label_dir};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AutoLabelArg {
    /// Board screenshot to label
    image: PathBuf,
    /// Directory of label exports used as training data
    #[arg(long)]
    labels: PathBuf,
    /// Directory of the training images [default: the label directory]
    #[arg(long)]
    images: Option<PathBuf>,
    /// Label export whose grid is used instead of detecting one
    #[arg(long)]
    board: Option<PathBuf>,
    /// Samples per tile side
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE)]
    sample_size: usize,
    /// Neighbours voting on each tile
    #[arg(long, default_value_t = AUTO_LABEL_K)]
    k: usize,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &AutoLabelArg) -> anyhow::Result<()> {
    let AutoLabelArg {
        image,
        labels,
        images,
        board,
        sample_size,
        k,
        output,
    } = arg;

    let raster = load_image(image)?;
    let board = match board {
        Some(path) => {
            let export: LabelExport = read_json_file("label", path)?;
            export
                .normalize()
                .board_spec()
                .with_context(|| format!("Unusable grid in {}", path.display()))?
        }
        None => detect_board(raster.view())
            .with_context(|| format!("No tile grid found in {}, pass --board", image.display()))?
            .to_board_spec()?,
    };
    eprintln!("Board: {}x{} tiles", board.rows(), board.cols());

    let exports = read_label_dir(labels)?;
    let mut rasters = DirectoryRasters::new(images.clone().unwrap_or_else(|| labels.clone()));
    let dataset =
        ExtractedDataset::extract(&exports, &mut rasters, *sample_size, &RunLimits::default())?;
    let training = dataset
        .images
        .iter()
        .flat_map(|image| &image.samples)
        .map(|sample| (sample.label.as_str(), sample.vector.clone()))
        .collect::<TrainingSet>();
    eprintln!(
        "Training set: {} vectors, {} labels from {} images ({} missing)",
        training.len(),
        training.label_count(),
        dataset.images.len(),
        dataset.missing,
    );

    let classifier = Strategy::KNearestNeighbors { k: *k }.train(training);
    let predictions = label_board(raster.view(), &board, &classifier, *sample_size);

    let labeled = predictions.iter().filter(|p| p.label.is_some()).count();
    let unknown = predictions
        .iter()
        .filter(|p| p.label.as_deref() == Some(UNKNOWN_LABEL))
        .count();
    let slugs = predictions.iter().filter(|p| p.slug_lie).count();
    eprintln!("Predictions:");
    eprintln!("  Labeled:      {labeled}/{}", predictions.len());
    eprintln!("  Unknown:      {unknown}");
    eprintln!("  Purple tiles: {slugs}");

    Output::save_json(&predictions, output.as_deref())
}
