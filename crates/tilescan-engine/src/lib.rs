//! Image-side building blocks for board screenshots.
//!
//! This crate locates a tile grid inside a decoded RGBA screenshot and turns
//! tiles into feature vectors. It knows nothing about labels or training;
//! see `tilescan-classifier` for that.
//!
//! # Modules
//!
//! - [`core`]: geometry ([`Rect`], [`BoardSpec`], [`TileCoordinate`]) and
//!   RGBA raster views
//! - [`detect`]: edge projection and grid bounds detection
//! - [`sample`]: tile feature vectors and the purple border heuristic
//!
//! # Example
//!
//! ```
//! use tilescan_engine::{RgbaRaster, detect_board};
//!
//! // A flat image has no grid.
//! let image = RgbaRaster::filled(32, 32, [10, 10, 10, 255]);
//! assert!(detect_board(image.view()).is_none());
//! ```

pub use self::{core::*, detect::*, sample::*};

pub mod core;
pub mod detect;
pub mod sample;
