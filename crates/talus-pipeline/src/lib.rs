//! talus-pipeline: Pure slope raster analysis pipeline (sans-IO).
//!
//! Runs a slope-percent raster through:
//! clip to AOI boundary -> reclassify into slope bands -> aggregate
//! per-band area in hectares. An optional vectorize stage dissolves
//! the reclassified raster into per-class polygon zones.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! rasters and geometries and returns structured data. All file
//! interaction (GeoTIFF, GeoJSON) lives in `talus-io`.

pub mod area;
pub mod clip;
pub mod reclass;
pub mod types;
pub mod vectorize;

pub use area::aggregate;
pub use clip::{DEFAULT_NODATA, clip};
pub use reclass::{classify, reclassify};
pub use types::{
    AreaReport, BandTable, Boundary, ClassArea, ClassRaster, Dimensions, GridTransform,
    MultiPolygon, NO_CLASS, PipelineError, Raster, SlopeBand,
};
pub use vectorize::{ClassZone, vectorize};

/// Result of running the full slope analysis pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct SlopeAnalysis {
    /// Stage 1: raster clipped to the AOI boundary.
    pub clipped: Raster,
    /// Stage 2: clipped raster reclassified into band codes.
    pub classified: ClassRaster,
    /// Stage 3: per-band areas in hectares.
    pub report: AreaReport,
}

/// Run the full analysis: clip, reclassify, aggregate.
///
/// Each stage fully materializes its output before the next begins,
/// and every intermediate is returned so callers can persist them.
/// Data flows strictly forward; nothing is mutated in place.
///
/// # Errors
///
/// Propagates the first stage failure unchanged: see [`clip::clip`],
/// [`reclass::reclassify`], and [`area::aggregate`].
pub fn analyze(
    raster: &Raster,
    boundary: &Boundary,
    table: &BandTable,
) -> Result<SlopeAnalysis, PipelineError> {
    // 1. Clip to the AOI boundary.
    let clipped = clip::clip(raster, boundary)?;

    // 2. Reclassify into band codes.
    let classified = reclass::reclassify(&clipped, table)?;

    // 3. Aggregate per-band areas.
    let report = area::aggregate(&classified, table)?;

    Ok(SlopeAnalysis {
        clipped,
        classified,
        report,
    })
}
