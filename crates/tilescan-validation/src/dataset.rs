use std::collections::BTreeMap;

use tilescan_engine::{FeatureVector, RgbaRaster, TileCoordinate, extract_tile_vector};
use tracing::{debug, warn};

use crate::labels::LabelExport;

/// Supplies the decoded screenshot for a label export.
pub trait RasterSource {
    /// Loads the raster named `image`, or `None` when it is unavailable.
    fn load(&mut self, image: &str) -> Option<RgbaRaster>;
}

/// Rasters held in memory, keyed by image name.
#[derive(Debug, Clone, Default)]
pub struct MemoryRasters {
    rasters: BTreeMap<String, RgbaRaster>,
}

impl MemoryRasters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<S>(&mut self, image: S, raster: RgbaRaster)
    where
        S: Into<String>,
    {
        self.rasters.insert(image.into(), raster);
    }
}

impl RasterSource for MemoryRasters {
    fn load(&mut self, image: &str) -> Option<RgbaRaster> {
        self.rasters.get(image).cloned()
    }
}

/// One labeled tile with its feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSample {
    pub coord: TileCoordinate,
    pub label: String,
    pub vector: FeatureVector,
}

/// Labeled samples of one screenshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedImage {
    pub image: String,
    pub samples: Vec<LabeledSample>,
}

impl ExtractedImage {
    /// Extracts one feature vector per label of a normalized export.
    #[must_use]
    pub fn extract(export: &LabelExport, raster: &RgbaRaster, sample_size: usize) -> Self {
        let image = raster.view();
        let samples = export
            .labels
            .iter()
            .map(|label| {
                let coord = label.coord();
                LabeledSample {
                    coord,
                    label: label.label.clone(),
                    vector: extract_tile_vector(image, export.tile_rect(coord), sample_size),
                }
            })
            .collect::<Vec<_>>();
        debug!(image = %export.image, samples = samples.len(), "extracted tile vectors");
        Self {
            image: export.image.clone(),
            samples,
        }
    }
}

/// Loads the raster of `export`, warning when it is unavailable.
pub(crate) fn load_raster<S>(rasters: &mut S, export: &LabelExport) -> Option<RgbaRaster>
where
    S: RasterSource + ?Sized,
{
    let raster = rasters.load(&export.image);
    if raster.is_none() {
        warn!(image = %export.image, "image unavailable, skipping");
    }
    raster
}
