use std::error::Error;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::report::DiagnosticsReport;

/// Runs kept in a history.
pub const HISTORY_LIMIT: usize = 20;

/// Summary of one diagnostics run, as kept in the history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsRun {
    pub version: String,
    pub recorded_at: DateTime<Utc>,
    pub accuracy: f64,
    pub non_unknown_accuracy: f64,
    pub avg_distance: f64,
    pub total: usize,
}

impl DiagnosticsRun {
    /// Summarizes the augmented (leave-one-image-out) metrics of `report`.
    #[must_use]
    pub fn from_report(report: &DiagnosticsReport) -> Self {
        let metrics = &report.augmented.metrics;
        Self {
            version: report.version.clone(),
            recorded_at: report.generated_at,
            accuracy: metrics.accuracy,
            non_unknown_accuracy: metrics.non_unknown_accuracy,
            avg_distance: metrics.avg_distance,
            total: metrics.total,
        }
    }
}

/// Change from the previous run to the newest one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracyDelta {
    pub accuracy: f64,
    pub non_unknown_accuracy: f64,
    pub avg_distance: f64,
}

impl AccuracyDelta {
    #[must_use]
    pub fn between(previous: &DiagnosticsRun, latest: &DiagnosticsRun) -> Self {
        Self {
            accuracy: latest.accuracy - previous.accuracy,
            non_unknown_accuracy: latest.non_unknown_accuracy - previous.non_unknown_accuracy,
            avg_distance: latest.avg_distance - previous.avg_distance,
        }
    }

    /// Whether either accuracy dropped.
    #[must_use]
    pub fn is_regression(&self) -> bool {
        self.accuracy < 0.0 || self.non_unknown_accuracy < 0.0
    }
}

/// Newest-first log of diagnostics runs, capped at [`HISTORY_LIMIT`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunHistory {
    runs: Vec<DiagnosticsRun>,
}

impl RunHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps stored runs, assumed newest-first, dropping any beyond the cap.
    #[must_use]
    pub fn from_runs(mut runs: Vec<DiagnosticsRun>) -> Self {
        runs.truncate(HISTORY_LIMIT);
        Self { runs }
    }

    pub fn record(&mut self, run: DiagnosticsRun) {
        self.runs.insert(0, run);
        self.runs.truncate(HISTORY_LIMIT);
    }

    #[must_use]
    pub fn runs(&self) -> &[DiagnosticsRun] {
        &self.runs
    }

    #[must_use]
    pub fn latest(&self) -> Option<&DiagnosticsRun> {
        self.runs.first()
    }

    /// Delta between the two newest runs.
    #[must_use]
    pub fn latest_delta(&self) -> Option<AccuracyDelta> {
        match self.runs.as_slice() {
            [latest, previous, ..] => Some(AccuracyDelta::between(previous, latest)),
            _ => None,
        }
    }
}

#[derive(Debug, derive_more::Display)]
#[display("failed to {action} run history")]
pub struct HistoryStoreError {
    action: &'static str,
    source: Box<dyn Error + Send + Sync>,
}

impl Error for HistoryStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.source)
    }
}

impl HistoryStoreError {
    pub fn load<E>(source: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        Self {
            action: "load",
            source: source.into(),
        }
    }

    pub fn save<E>(source: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        Self {
            action: "save",
            source: source.into(),
        }
    }
}

/// Persistence of the run history, owned by the host.
pub trait HistoryStore {
    /// Loads the stored runs, newest first.
    fn load(&mut self) -> Result<Vec<DiagnosticsRun>, HistoryStoreError>;

    fn save(&mut self, runs: &[DiagnosticsRun]) -> Result<(), HistoryStoreError>;
}

/// History kept in memory for the lifetime of the store.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryStore {
    runs: Vec<DiagnosticsRun>,
}

impl MemoryHistoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&mut self) -> Result<Vec<DiagnosticsRun>, HistoryStoreError> {
        Ok(self.runs.clone())
    }

    fn save(&mut self, runs: &[DiagnosticsRun]) -> Result<(), HistoryStoreError> {
        self.runs = runs.to_vec();
        Ok(())
    }
}

/// Loads the history, records `run` and saves it back.
///
/// A store that fails to load is treated as empty and a failed save is only
/// logged; the updated history is returned either way.
pub fn record_run<S>(store: &mut S, run: DiagnosticsRun) -> RunHistory
where
    S: HistoryStore + ?Sized,
{
    let runs = store.load().unwrap_or_else(|err| {
        warn!(error = %err, cause = %err.source, "starting from an empty history");
        Vec::new()
    });
    let mut history = RunHistory::from_runs(runs);
    history.record(run);
    if let Err(err) = store.save(history.runs()) {
        warn!(error = %err, cause = %err.source, "history not persisted");
    }
    history
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    fn run(accuracy: f64) -> DiagnosticsRun {
        DiagnosticsRun {
            version: "0.1.0".to_owned(),
            recorded_at: DateTime::default(),
            accuracy,
            non_unknown_accuracy: accuracy,
            avg_distance: 1.0 - accuracy,
            total: 10,
        }
    }

    #[test]
    fn test_record_is_newest_first_and_capped() {
        let mut history = RunHistory::new();
        for i in 0..25 {
            history.record(run(f64::from(i) / 100.0));
        }
        assert_eq!(history.runs().len(), HISTORY_LIMIT);
        assert_eq!(history.latest().unwrap().accuracy, 0.24);
        assert_eq!(history.runs().last().unwrap().accuracy, 0.05);
    }

    #[test]
    fn test_latest_delta() {
        let mut history = RunHistory::new();
        history.record(run(0.8));
        assert!(history.latest_delta().is_none());
        history.record(run(0.7));
        let delta = history.latest_delta().unwrap();
        assert!((delta.accuracy + 0.1).abs() < 1e-12);
        assert!((delta.avg_distance - 0.1).abs() < 1e-12);
        assert!(delta.is_regression());

        history.record(run(0.9));
        assert!(!history.latest_delta().unwrap().is_regression());
    }

    #[test]
    fn test_from_runs_truncates() {
        let history = RunHistory::from_runs(vec![run(0.5); 30]);
        assert_eq!(history.runs().len(), HISTORY_LIMIT);
    }

    #[test]
    fn test_record_run_with_memory_store() {
        let mut store = MemoryHistoryStore::new();
        record_run(&mut store, run(0.5));
        let history = record_run(&mut store, run(0.6));
        assert_eq!(history.runs().len(), 2);
        assert_eq!(store.load().unwrap(), history.runs());
    }

    struct BrokenStore;

    impl HistoryStore for BrokenStore {
        fn load(&mut self) -> Result<Vec<DiagnosticsRun>, HistoryStoreError> {
            Err(HistoryStoreError::load(io::Error::other("unreadable")))
        }

        fn save(&mut self, _runs: &[DiagnosticsRun]) -> Result<(), HistoryStoreError> {
            Err(HistoryStoreError::save("read-only"))
        }
    }

    #[test]
    fn test_broken_store_degrades_to_empty_history() {
        let history = record_run(&mut BrokenStore, run(0.5));
        assert_eq!(history.runs(), &[run(0.5)]);
    }

    #[test]
    fn test_json_is_plain_array() {
        let mut history = RunHistory::new();
        history.record(run(0.5));
        let json = serde_json::to_value(&history).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["nonUnknownAccuracy"], 0.5);
        assert!(json[0]["recordedAt"].is_string());
        let parsed: RunHistory = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, history);
    }
}
