pub use self::{geometry::*, raster::*};

pub(crate) mod geometry;
pub(crate) mod raster;
