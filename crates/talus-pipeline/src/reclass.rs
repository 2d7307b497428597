//! Reclassification: map slope-percent samples to ordinal class codes.
//!
//! Every sample is assigned the code of the band whose range contains
//! it, evaluated in ascending band order. Boundary values belong to the
//! lower band: `classify(20)` is 1, `classify(20.0001)` is 2.
//!
//! No-data sentinels, non-finite values, and values below the first
//! band's lower bound map to [`NO_CLASS`] and are excluded from every
//! downstream count. The alternative — letting out-of-range sentinels
//! fall through into the steepest band — silently reports phantom
//! "extreme slope" area and is deliberately not supported.

use crate::types::{BandTable, ClassRaster, NO_CLASS, PipelineError, Raster};

/// Classify a single slope-percent value against a band table.
///
/// Returns `None` for values that are not finite or lie below the first
/// band's lower bound, and for values above a finite final bound.
#[must_use]
pub fn classify(value: f64, table: &BandTable) -> Option<u8> {
    if !value.is_finite() {
        return None;
    }
    let first = table.bands().first()?;
    if value < first.lower {
        return None;
    }
    // Bands are contiguous and ascending, so the first band whose upper
    // bound is not exceeded is the containing one.
    table
        .bands()
        .iter()
        .find(|band| value <= band.upper)
        .map(|band| band.code)
}

/// Reclassify a raster of slope-percent samples into class codes.
///
/// The output shares the input's dimensions, transform, and CRS. Samples
/// matching the raster's no-data sentinel become [`NO_CLASS`].
///
/// # Errors
///
/// Returns [`PipelineError::InvalidRaster`] if the raster's transform is
/// unusable, or [`PipelineError::InvalidConfig`] via [`BandTable::new`]
/// validation having been bypassed (a table constructed normally cannot
/// trigger this).
pub fn reclassify(raster: &Raster, table: &BandTable) -> Result<ClassRaster, PipelineError> {
    if !raster.transform().is_valid() {
        return Err(PipelineError::InvalidRaster(
            "raster transform has zero or non-finite pixel size".to_owned(),
        ));
    }

    let codes = raster
        .samples()
        .iter()
        .map(|&v| {
            if raster.is_nodata(v) {
                NO_CLASS
            } else {
                classify(v, table).unwrap_or(NO_CLASS)
            }
        })
        .collect();

    ClassRaster::new(
        codes,
        raster.dimensions(),
        *raster.transform(),
        raster.crs().map(str::to_owned),
    )
}
