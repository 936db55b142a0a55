//! Per-tile sampling.
//!
//! - [`extract_tile_vector`] turns a tile rectangle into a normalized color
//!   [`FeatureVector`] for the classifiers
//! - [`scan_purple_border`] is the untrained border heuristic used to flag
//!   "slug" tiles

pub use self::{purple_border::*, tile_vector::*};

mod purple_border;
mod tile_vector;
