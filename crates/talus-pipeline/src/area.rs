//! Area aggregation: per-class pixel counts to hectares.
//!
//! `pixel_area = |pixel_width × pixel_height|` in squared projection
//! units (typically m²); `area_ha = count × pixel_area / 10_000`.
//! Samples holding [`NO_CLASS`](crate::types::NO_CLASS) are never
//! counted, so the per-class areas sum to the valid (non-masked) raster
//! area and nothing more.

use crate::types::{AreaReport, BandTable, ClassArea, ClassRaster, PipelineError};

/// Square meters per hectare.
const SQUARE_METERS_PER_HECTARE: f64 = 10_000.0;

/// Aggregate a reclassified raster into per-class areas.
///
/// One entry is produced per band in the table, in table order, with a
/// zero area for codes that do not occur in the raster.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidRaster`] if the pixel resolution is
/// zero or non-finite, or the raster has no samples (structurally ruled
/// out by [`ClassRaster::new`], but asserted here since the guarantee
/// belongs to this stage).
pub fn aggregate(raster: &ClassRaster, table: &BandTable) -> Result<AreaReport, PipelineError> {
    let pixel_area = raster.transform().pixel_area();
    if !pixel_area.is_finite() || pixel_area == 0.0 {
        return Err(PipelineError::InvalidRaster(
            "pixel resolution is zero or non-finite".to_owned(),
        ));
    }
    if raster.codes().is_empty() {
        return Err(PipelineError::InvalidRaster(
            "raster has no samples".to_owned(),
        ));
    }

    let mut counts = [0_usize; 256];
    for &code in raster.codes() {
        counts[code as usize] += 1;
    }

    let entries = table
        .bands()
        .iter()
        .map(|band| {
            let count = counts[band.code as usize];
            #[allow(clippy::cast_precision_loss)]
            let hectares = count as f64 * pixel_area / SQUARE_METERS_PER_HECTARE;
            ClassArea {
                code: band.code,
                count,
                hectares,
            }
        })
        .collect();

    Ok(AreaReport::new(entries))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Dimensions, GridTransform, NO_CLASS};

    fn class_raster(codes: Vec<u8>, width: u32, height: u32, pixel: f64) -> ClassRaster {
        ClassRaster::new(
            codes,
            Dimensions { width, height },
            GridTransform::new(0.0, 0.0, pixel, -pixel),
            None,
        )
        .unwrap()
    }

    #[test]
    fn aggregate_counts_and_converts() {
        // 10x10 m pixels: each pixel is 100 m² = 0.01 ha.
        let raster = class_raster(vec![1, 1, 2, 3, 3, 3], 3, 2, 10.0);
        let report = aggregate(&raster, &BandTable::default()).unwrap();
        let entries = report.entries();
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0].count, 2);
        assert!((entries[0].hectares - 0.02).abs() < 1e-12);
        assert_eq!(entries[1].count, 1);
        assert!((entries[1].hectares - 0.01).abs() < 1e-12);
        assert_eq!(entries[2].count, 3);
        assert!((entries[2].hectares - 0.03).abs() < 1e-12);
        assert_eq!(entries[3].count, 0);
        assert!(entries[3].hectares.abs() < 1e-12);
        assert_eq!(entries[4].count, 0);
    }

    #[test]
    fn aggregate_report_is_in_ascending_code_order() {
        let raster = class_raster(vec![5, 4, 3, 2], 2, 2, 1.0);
        let report = aggregate(&raster, &BandTable::default()).unwrap();
        let codes: Vec<u8> = report.entries().iter().map(|e| e.code).collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn aggregate_excludes_no_class_samples() {
        let raster = class_raster(vec![NO_CLASS, NO_CLASS, 1, 2], 2, 2, 10.0);
        let report = aggregate(&raster, &BandTable::default()).unwrap();
        let total_count: usize = report.entries().iter().map(|e| e.count).sum();
        assert_eq!(total_count, 2);
        assert!((report.total_hectares() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn aggregate_conserves_total_area() {
        // Sum over classes equals valid sample count × pixel area.
        let codes = vec![1, 2, 3, 4, 5, 5, 3, 1, NO_CLASS];
        let raster = class_raster(codes, 3, 3, 25.0);
        let report = aggregate(&raster, &BandTable::default()).unwrap();
        #[allow(clippy::cast_precision_loss)]
        let expected = raster.classified_count() as f64 * 625.0 / 10_000.0;
        assert!((report.total_hectares() - expected).abs() < 1e-9);
    }

    #[test]
    fn aggregate_uses_absolute_pixel_area() {
        // Negative pixel height (north-up) must not produce negative area.
        let raster = class_raster(vec![1], 1, 1, 10.0);
        let report = aggregate(&raster, &BandTable::default()).unwrap();
        assert!(report.hectares_for(1).unwrap() > 0.0);
    }

    #[test]
    fn aggregate_rejects_zero_resolution() {
        let raster = ClassRaster::new(
            vec![1],
            Dimensions {
                width: 1,
                height: 1,
            },
            GridTransform::new(0.0, 0.0, 0.0, -10.0),
            None,
        )
        .unwrap();
        assert!(matches!(
            aggregate(&raster, &BandTable::default()),
            Err(PipelineError::InvalidRaster(_)),
        ));
    }
}
