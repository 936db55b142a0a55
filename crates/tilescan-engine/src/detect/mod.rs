//! Grid auto-detection.
//!
//! Detection runs in two stages:
//!
//! 1. [`project_edges`] collapses luminance edges onto row and column profiles
//! 2. [`detect_board`] thresholds each profile at `mean + 0.8·std`, takes the
//!    outermost crossings as the board bounds and counts the grid line peaks
//!    between them
//!
//! Every failure (flat image, too few lines, a single row or column) is
//! reported as `None`.

pub use self::{edge_projection::*, grid_bounds::*};

mod edge_projection;
mod grid_bounds;
