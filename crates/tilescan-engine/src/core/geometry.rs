use serde::{Deserialize, Serialize};

/// Floating-point rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Length of the shorter side.
    #[must_use]
    pub fn min_side(&self) -> f64 {
        f64::min(self.width, self.height)
    }
}

/// Zero-indexed position of a tile inside a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileCoordinate {
    pub row: usize,
    pub col: usize,
}

impl TileCoordinate {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("board must have more than one row and column (got {rows}x{cols})")]
pub struct InvalidBoardSpecError {
    pub rows: usize,
    pub cols: usize,
}

/// A rectangular region partitioned into a `rows × cols` tile grid.
///
/// Construction guarantees `rows > 1` and `cols > 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoardSpec {
    rows: usize,
    cols: usize,
    bounds: Rect,
}

impl BoardSpec {
    pub fn new(rows: usize, cols: usize, bounds: Rect) -> Result<Self, InvalidBoardSpecError> {
        if rows <= 1 || cols <= 1 {
            return Err(InvalidBoardSpecError { rows, cols });
        }
        Ok(Self { rows, cols, bounds })
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Returns the pixel rectangle of the tile at `coord`.
    ///
    /// Coordinates outside the grid extrapolate past `bounds`; callers
    /// iterate [`Self::tiles`] to stay inside.
    #[must_use]
    pub fn tile_rect(&self, coord: TileCoordinate) -> Rect {
        tile_rect_in(self.bounds, self.rows, self.cols, coord)
    }

    /// Iterates every tile coordinate in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = TileCoordinate> + use<> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |row| (0..cols).map(move |col| TileCoordinate::new(row, col)))
    }
}

/// Splits `bounds` evenly into `rows × cols` cells and returns the cell at `coord`.
///
/// `rows` and `cols` of zero are treated as one.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn tile_rect_in(bounds: Rect, rows: usize, cols: usize, coord: TileCoordinate) -> Rect {
    let tile_width = bounds.width / cols.max(1) as f64;
    let tile_height = bounds.height / rows.max(1) as f64;
    Rect {
        x: bounds.x + coord.col as f64 * tile_width,
        y: bounds.y + coord.row as f64 * tile_height,
        width: tile_width,
        height: tile_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_spec_rejects_single_row_or_col() {
        let bounds = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(BoardSpec::new(1, 3, bounds).is_err());
        assert!(BoardSpec::new(3, 1, bounds).is_err());
        assert!(BoardSpec::new(0, 0, bounds).is_err());
        assert!(BoardSpec::new(2, 2, bounds).is_ok());
    }

    #[test]
    fn test_tile_rect_partitions_bounds() {
        let board = BoardSpec::new(2, 4, Rect::new(10.0, 20.0, 80.0, 40.0)).unwrap();
        let rect = board.tile_rect(TileCoordinate::new(1, 3));
        assert_eq!(rect, Rect::new(70.0, 40.0, 20.0, 20.0));
    }

    #[test]
    fn test_tiles_row_major() {
        let board = BoardSpec::new(2, 3, Rect::new(0.0, 0.0, 3.0, 2.0)).unwrap();
        let tiles = board.tiles().collect::<Vec<_>>();
        assert_eq!(tiles.len(), 6);
        assert_eq!(tiles[0], TileCoordinate::new(0, 0));
        assert_eq!(tiles[2], TileCoordinate::new(0, 2));
        assert_eq!(tiles[3], TileCoordinate::new(1, 0));
    }

    #[test]
    fn test_rect_serialization() {
        let rect = Rect::new(1.5, 2.0, 3.0, 4.25);
        let json = serde_json::to_string(&rect).unwrap();
        assert_eq!(json, r#"{"x":1.5,"y":2.0,"width":3.0,"height":4.25}"#);
        let back: Rect = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rect);
    }
}
