use std::path::PathBuf;

use anyhow::bail;
use tilescan_engine::{GridDetectionParams, detect_board_with};

use crate::util::{Output, load_image};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct DetectGridArg {
    /// Board screenshot
    image: PathBuf,
    /// Minimum distance between two grid lines, in pixels
    #[arg(long, default_value_t = GridDetectionParams::default().min_peak_separation)]
    min_peak_separation: usize,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &DetectGridArg) -> anyhow::Result<()> {
    let DetectGridArg {
        image,
        min_peak_separation,
        output,
    } = arg;
    let raster = load_image(image)?;
    let params = GridDetectionParams {
        min_peak_separation: *min_peak_separation,
        ..GridDetectionParams::default()
    };
    let Some(board) = detect_board_with(raster.view(), &params) else {
        bail!("No tile grid found in {}", image.display());
    };

    eprintln!("Detected {}x{} grid", board.rows, board.cols);
    eprintln!(
        "  Bounds: x={:.0} y={:.0} width={:.0} height={:.0}",
        board.bounds.x, board.bounds.y, board.bounds.width, board.bounds.height
    );
    Output::save_json(&board, output.as_deref())
}
