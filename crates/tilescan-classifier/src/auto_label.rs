use serde::Serialize;
use tilescan_engine::{BoardSpec, RgbaImageView, extract_tile_vector, scan_purple_border};
use tracing::debug;

use crate::Classifier;

/// Suggested label for one board tile.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TilePrediction {
    pub row: usize,
    pub col: usize,
    /// `None` when the classifier had nothing to compare against.
    pub label: Option<String>,
    pub distance: Option<f64>,
    /// Whether the tile carries a purple border.
    pub slug_lie: bool,
}

/// Classifies every tile of `board` in row-major order.
///
/// This is the fast path used to pre-fill a board's labels; pair it with a
/// [`KNearestNeighbors`](crate::KNearestNeighbors) classifier trained with
/// [`AUTO_LABEL_K`](crate::AUTO_LABEL_K) neighbours.
pub fn label_board<C>(
    image: RgbaImageView<'_>,
    board: &BoardSpec,
    classifier: &C,
    sample_size: usize,
) -> Vec<TilePrediction>
where
    C: Classifier + ?Sized,
{
    board
        .tiles()
        .map(|coord| {
            let rect = board.tile_rect(coord);
            let vector = extract_tile_vector(image, rect, sample_size);
            let classification = classifier.classify(&vector);
            if classification.is_none() {
                debug!(row = coord.row, col = coord.col, "no centroid to compare against");
            }
            let (label, distance) = classification.map(|c| (c.label, c.distance)).unzip();
            TilePrediction {
                row: coord.row,
                col: coord.col,
                label,
                distance,
                slug_lie: scan_purple_border(image, rect).flagged,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use tilescan_engine::{Rect, RgbaRaster};

    use super::*;
    use crate::{AUTO_LABEL_K, Strategy, TrainingSet};

    const SAMPLE_SIZE: usize = 4;

    /// Two-by-two board, 20px tiles: red, purple / green, white.
    fn board_image() -> (RgbaRaster, BoardSpec) {
        let raster = RgbaRaster::from_fn(40, 40, |x, y| match (x < 20, y < 20) {
            (true, true) => [220, 20, 20, 255],
            (false, true) => [150, 50, 150, 255],
            (true, false) => [20, 200, 20, 255],
            (false, false) => [255, 255, 255, 255],
        });
        let board = BoardSpec::new(2, 2, Rect::new(0.0, 0.0, 40.0, 40.0)).unwrap();
        (raster, board)
    }

    #[test]
    fn test_labels_every_tile() {
        let (raster, board) = board_image();
        let image = raster.view();
        let mut training = TrainingSet::new();
        for (coord, label) in board.tiles().zip(["red", "slug", "green", "white"]) {
            let vector = extract_tile_vector(image, board.tile_rect(coord), SAMPLE_SIZE);
            for _ in 0..AUTO_LABEL_K {
                training.insert(label, vector.clone());
            }
        }
        let classifier = Strategy::KNearestNeighbors { k: AUTO_LABEL_K }.train(training);

        let predictions = label_board(image, &board, &classifier, SAMPLE_SIZE);
        let labels = predictions
            .iter()
            .map(|p| p.label.as_deref().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(labels, vec!["red", "slug", "green", "white"]);
        assert!(predictions.iter().all(|p| p.distance == Some(0.0)));

        let slugs = predictions.iter().map(|p| p.slug_lie).collect::<Vec<_>>();
        assert_eq!(slugs, vec![false, true, false, false]);
    }

    #[test]
    fn test_prediction_json_keys() {
        let prediction = TilePrediction {
            row: 1,
            col: 2,
            label: None,
            distance: None,
            slug_lie: true,
        };
        let json = serde_json::to_value(prediction).unwrap();
        assert_eq!(json["slugLie"], true);
        assert!(json["label"].is_null());
    }

    #[test]
    fn test_untrained_classifier_leaves_labels_empty() {
        let (raster, board) = board_image();
        let classifier = Strategy::NearestCentroid.train(TrainingSet::new());
        let predictions = label_board(raster.view(), &board, &classifier, SAMPLE_SIZE);
        assert_eq!(predictions.len(), 4);
        assert!(predictions.iter().all(|p| p.label.is_none() && p.distance.is_none()));
    }
}
