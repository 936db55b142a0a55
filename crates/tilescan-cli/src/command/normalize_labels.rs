use std::path::PathBuf;

use tilescan_validation::LabelExport;

use crate::util::{Output, read_json_file};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct NormalizeLabelsArg {
    /// Label export to normalize
    labels: PathBuf,
    /// Output file path (may be the input file)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &NormalizeLabelsArg) -> anyhow::Result<()> {
    let NormalizeLabelsArg { labels, output } = arg;
    let export: LabelExport = read_json_file("label", labels)?;
    let before = (export.rows, export.cols, export.labels.len());
    let normalized = export.normalize();

    eprintln!("Normalized {}", labels.display());
    eprintln!("  Grid:   {}x{} -> {}x{}", before.0, before.1, normalized.rows, normalized.cols);
    eprintln!("  Labels: {} -> {}", before.2, normalized.labels.len());
    Output::save_json(&normalized, output.as_deref())
}
