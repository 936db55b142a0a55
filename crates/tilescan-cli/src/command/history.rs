use std::path::PathBuf;

use tilescan_validation::{HistoryStore as _, RunHistory};

use crate::util::{JsonFileHistory, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct HistoryArg {
    /// History file written by `diagnose --history`
    history: PathBuf,
    /// Print the runs as JSON instead of a table
    #[arg(long)]
    json: bool,
}

pub(crate) fn run(arg: &HistoryArg) -> anyhow::Result<()> {
    let HistoryArg { history, json } = arg;
    let history = RunHistory::from_runs(JsonFileHistory::new(history.clone()).load()?);
    if *json {
        return Output::save_json(&history, None);
    }

    if history.runs().is_empty() {
        eprintln!("No diagnostics runs recorded");
        return Ok(());
    }
    println!(
        "{:<25} {:<10} {:>8} {:>11} {:>9} {:>6}",
        "Recorded at", "Version", "Accuracy", "Non-unknown", "Distance", "Tiles"
    );
    for run in history.runs() {
        println!(
            "{:<25} {:<10} {:>7.1}% {:>10.1}% {:>9.4} {:>6}",
            run.recorded_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            run.version,
            run.accuracy * 100.0,
            run.non_unknown_accuracy * 100.0,
            run.avg_distance,
            run.total,
        );
    }
    if let Some(delta) = history.latest_delta() {
        println!();
        println!(
            "Latest change: accuracy {:+.1}pt, non-unknown {:+.1}pt, distance {:+.4}",
            delta.accuracy * 100.0,
            delta.non_unknown_accuracy * 100.0,
            delta.avg_distance,
        );
    }
    Ok(())
}
