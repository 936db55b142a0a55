use clap::{Parser, Subcommand};

use self::{
    auto_label::AutoLabelArg, detect_grid::DetectGridArg, diagnose::DiagnoseArg,
    history::HistoryArg, normalize_labels::NormalizeLabelsArg,
};

mod auto_label;
mod detect_grid;
mod diagnose;
mod history;
mod normalize_labels;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log at debug level (overridden by `RUST_LOG`)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Locate the tile grid of a screenshot
    DetectGrid(#[clap(flatten)] DetectGridArg),
    /// Suggest labels for every tile of a screenshot
    AutoLabel(#[clap(flatten)] AutoLabelArg),
    /// Cross-validate the classifier over a labeled dataset
    Diagnose(#[clap(flatten)] DiagnoseArg),
    /// Repair a label export
    NormalizeLabels(#[clap(flatten)] NormalizeLabelsArg),
    /// Show recorded diagnostics runs
    History(#[clap(flatten)] HistoryArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    crate::logging::init_tracing(args.verbose);
    match args.mode {
        Mode::DetectGrid(arg) => detect_grid::run(&arg)?,
        Mode::AutoLabel(arg) => auto_label::run(&arg)?,
        Mode::Diagnose(arg) => diagnose::run(&arg)?,
        Mode::NormalizeLabels(arg) => normalize_labels::run(&arg)?,
        Mode::History(arg) => history::run(&arg)?,
    }
    Ok(())
}
