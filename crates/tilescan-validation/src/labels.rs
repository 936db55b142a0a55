use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tilescan_engine::{BoardSpec, InvalidBoardSpecError, Rect, TileCoordinate, tile_rect_in};

/// Ground-truth label of one tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLabel {
    pub row: usize,
    pub col: usize,
    pub label: String,
}

impl TileLabel {
    #[must_use]
    pub fn coord(&self) -> TileCoordinate {
        TileCoordinate::new(self.row, self.col)
    }
}

/// Ground-truth annotation of one board screenshot, as persisted by the
/// labelling UI.
///
/// Exports are accepted as written; [`LabelExport::normalize`] repairs
/// inconsistent dimensions instead of rejecting the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelExport {
    /// Image file name, relative to the dataset.
    pub image: String,
    #[serde(default)]
    pub rows: usize,
    #[serde(default)]
    pub cols: usize,
    pub bounds: Rect,
    #[serde(default)]
    pub labels: Vec<TileLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl LabelExport {
    /// Makes the export self-consistent.
    ///
    /// - `rows` grows to cover the highest labeled row (`cols` likewise)
    /// - labels are ordered by `(row, col)`; for a coordinate labeled twice
    ///   the later entry wins
    ///
    /// Normalizing an already normalized export returns it unchanged.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        let mut by_coord = BTreeMap::new();
        for label in self.labels {
            by_coord.insert(label.coord(), label);
        }
        self.labels = by_coord.into_values().collect();

        for label in &self.labels {
            self.rows = self.rows.max(label.row.saturating_add(1));
            self.cols = self.cols.max(label.col.saturating_add(1));
        }
        self
    }

    /// Pixel rectangle of the tile at `coord`.
    #[must_use]
    pub fn tile_rect(&self, coord: TileCoordinate) -> Rect {
        tile_rect_in(self.bounds, self.rows, self.cols, coord)
    }

    pub fn board_spec(&self) -> Result<BoardSpec, InvalidBoardSpecError> {
        BoardSpec::new(self.rows, self.cols, self.bounds)
    }
}
