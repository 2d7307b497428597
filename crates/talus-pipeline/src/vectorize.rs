//! Optional raster-to-vector stage: dissolve class codes into polygons.
//!
//! Not part of the mandatory clip/reclassify/aggregate flow. Consumes a
//! [`ClassRaster`] and produces one dissolved zone per class code: the
//! union of all that code's pixel footprints in map coordinates, with
//! the summed area attached. Each contiguous region becomes one polygon
//! of the zone's `MultiPolygon`, so the per-code union *is* the
//! dissolve.
//!
//! Pixel footprints are merged per row into horizontal runs before the
//! union to keep the number of boolean operations proportional to the
//! run count rather than the pixel count.

use std::collections::BTreeMap;

use geo::{Area, BooleanOps, MultiPolygon, Polygon, Rect, coord};

use crate::types::{ClassRaster, NO_CLASS, PipelineError};

/// Square meters per hectare.
const SQUARE_METERS_PER_HECTARE: f64 = 10_000.0;

/// One dissolved class zone: every pixel of a class code, unioned.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassZone {
    /// Ordinal class code.
    pub code: u8,
    /// Union of the code's pixel footprints; one polygon per
    /// contiguous region.
    pub geometry: MultiPolygon<f64>,
    /// Total zone area in hectares, from the dissolved geometry.
    pub area_ha: f64,
}

/// Vectorize a reclassified raster into dissolved per-class zones.
///
/// Zones are returned in ascending code order. [`NO_CLASS`] samples
/// produce no geometry. Codes absent from the raster produce no zone.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidRaster`] if the raster transform is
/// unusable.
pub fn vectorize(raster: &ClassRaster) -> Result<Vec<ClassZone>, PipelineError> {
    let transform = raster.transform();
    if !transform.is_valid() {
        return Err(PipelineError::InvalidRaster(
            "raster transform has zero or non-finite pixel size".to_owned(),
        ));
    }

    let dims = raster.dimensions();
    let codes = raster.codes();
    let mut runs: BTreeMap<u8, Vec<Polygon<f64>>> = BTreeMap::new();

    for row in 0..dims.height {
        let row_start = row as usize * dims.width as usize;
        let mut col = 0_u32;
        while col < dims.width {
            let code = codes[row_start + col as usize];
            if code == NO_CLASS {
                col += 1;
                continue;
            }
            let mut end = col + 1;
            while end < dims.width && codes[row_start + end as usize] == code {
                end += 1;
            }
            let (x0, y0) = transform.pixel_corner(col, row);
            let (x1, y1) = transform.pixel_corner(end, row + 1);
            let footprint =
                Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 }).to_polygon();
            runs.entry(code).or_default().push(footprint);
            col = end;
        }
    }

    let zones = runs
        .into_iter()
        .filter_map(|(code, polygons)| {
            let mut polygons = polygons.into_iter();
            let mut geometry = MultiPolygon::new(vec![polygons.next()?]);
            for polygon in polygons {
                geometry = geometry.union(&MultiPolygon::new(vec![polygon]));
            }
            let area_ha = geometry.unsigned_area() / SQUARE_METERS_PER_HECTARE;
            Some(ClassZone {
                code,
                geometry,
                area_ha,
            })
        })
        .collect();

    Ok(zones)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{BandTable, Dimensions, GridTransform};

    fn class_raster(codes: Vec<u8>, width: u32, height: u32) -> ClassRaster {
        ClassRaster::new(
            codes,
            Dimensions { width, height },
            GridTransform::new(0.0, f64::from(height) * 10.0, 10.0, -10.0),
            None,
        )
        .unwrap()
    }

    #[test]
    fn vectorize_single_code_block() {
        let raster = class_raster(vec![1, 1, 1, 1], 2, 2);
        let zones = vectorize(&raster).unwrap();
        assert_eq!(zones.len(), 1);
        let zone = &zones[0];
        assert_eq!(zone.code, 1);
        // One contiguous 20x20 m region.
        assert_eq!(zone.geometry.0.len(), 1);
        assert!((zone.area_ha - 0.04).abs() < 1e-9);
    }

    #[test]
    fn vectorize_splits_codes_into_separate_zones() {
        let raster = class_raster(vec![1, 1, 2, 2], 2, 2);
        let zones = vectorize(&raster).unwrap();
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].code, 1);
        assert_eq!(zones[1].code, 2);
        assert!((zones[0].area_ha - 0.02).abs() < 1e-9);
        assert!((zones[1].area_ha - 0.02).abs() < 1e-9);
    }

    #[test]
    fn vectorize_zones_are_in_ascending_code_order() {
        let raster = class_raster(vec![5, 3, 1, 4], 2, 2);
        let zones = vectorize(&raster).unwrap();
        let codes: Vec<u8> = zones.iter().map(|z| z.code).collect();
        assert_eq!(codes, vec![1, 3, 4, 5]);
    }

    #[test]
    fn vectorize_dissolves_disconnected_regions_into_one_zone() {
        // Code 2 in two opposite corners, separated by code 1.
        let raster = class_raster(vec![2, 1, 1, 1, 1, 1, 1, 1, 2], 3, 3);
        let zones = vectorize(&raster).unwrap();
        let zone2 = zones.iter().find(|z| z.code == 2).unwrap();
        // One dissolved zone, two contiguous regions.
        assert_eq!(zone2.geometry.0.len(), 2);
        assert!((zone2.area_ha - 0.02).abs() < 1e-9);
    }

    #[test]
    fn vectorize_merges_vertically_adjacent_runs() {
        // A 1x3 vertical strip of code 4 must be a single region.
        let raster = class_raster(vec![4, 1, 4, 1, 4, 1], 2, 3);
        let zones = vectorize(&raster).unwrap();
        let zone4 = zones.iter().find(|z| z.code == 4).unwrap();
        assert_eq!(zone4.geometry.0.len(), 1);
        assert!((zone4.area_ha - 0.03).abs() < 1e-9);
    }

    #[test]
    fn vectorize_excludes_no_class() {
        let raster = class_raster(vec![NO_CLASS, NO_CLASS, 1, NO_CLASS], 2, 2);
        let zones = vectorize(&raster).unwrap();
        assert_eq!(zones.len(), 1);
        assert!((zones[0].area_ha - 0.01).abs() < 1e-9);
    }

    #[test]
    fn vectorize_empty_class_raster_yields_no_zones() {
        let raster = class_raster(vec![NO_CLASS; 4], 2, 2);
        let zones = vectorize(&raster).unwrap();
        assert!(zones.is_empty());
    }

    #[test]
    fn vectorize_areas_agree_with_aggregation() {
        let codes = vec![1, 2, 2, 3, 3, 3, 5, 5, NO_CLASS];
        let raster = class_raster(codes, 3, 3);
        let zones = vectorize(&raster).unwrap();
        let report = crate::area::aggregate(&raster, &BandTable::default()).unwrap();
        for zone in &zones {
            let reported = report.hectares_for(zone.code).unwrap();
            assert!(
                (zone.area_ha - reported).abs() < 1e-9,
                "zone {} area {} != reported {}",
                zone.code,
                zone.area_ha,
                reported,
            );
        }
    }

    #[test]
    fn vectorize_rejects_degenerate_transform() {
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
            vectorize(&raster),
            Err(PipelineError::InvalidRaster(_)),
        ));
    }
}
