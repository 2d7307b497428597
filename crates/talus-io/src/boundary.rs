//! GeoJSON boundaries in, dissolved class zones out.
//!
//! The AOI boundary is any GeoJSON document (geometry, feature, or
//! feature collection); every polygonal geometry in it contributes to
//! the clip mask, everything else is ignored. GeoJSON carries no CRS of
//! its own, so the boundary's CRS is left undeclared and reconciliation
//! is the pipeline's concern.

use std::fs;
use std::path::Path;

use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry};
use talus_pipeline::{Boundary, ClassZone, MultiPolygon};

use crate::error::{IoError, Result};

/// Read an AOI polygon boundary from a GeoJSON file.
///
/// # Errors
///
/// Returns [`IoError::Geojson`] for malformed documents and
/// [`IoError::InvalidBoundary`] when no polygonal geometry is present.
pub fn read_boundary(path: &Path) -> Result<Boundary> {
    let text = fs::read_to_string(path)?;
    let geojson: GeoJson = text.parse()?;
    let collection = geojson::quick_collection(&geojson)?;

    let mut polygons = Vec::new();
    for geometry in collection {
        match geometry {
            geo::Geometry::Polygon(p) => polygons.push(p),
            geo::Geometry::MultiPolygon(mp) => polygons.extend(mp.0),
            _ => {}
        }
    }
    if polygons.is_empty() {
        return Err(IoError::InvalidBoundary(format!(
            "{} contains no polygon geometry",
            path.display(),
        )));
    }
    Ok(Boundary::new(MultiPolygon::new(polygons), None))
}

/// Write dissolved class zones as a GeoJSON `FeatureCollection`.
///
/// One feature per zone, attributed with `class_code` and `area_ha`.
///
/// # Errors
///
/// Returns [`IoError::Json`] on serialization failure and
/// [`IoError::FileIo`] on write failure.
pub fn write_zones(path: &Path, zones: &[ClassZone]) -> Result<()> {
    let features = zones
        .iter()
        .map(|zone| {
            let mut properties = serde_json::Map::new();
            properties.insert(
                "class_code".to_owned(),
                serde_json::Value::Number(serde_json::Number::from(zone.code)),
            );
            properties.insert(
                "area_ha".to_owned(),
                serde_json::Number::from_f64(zone.area_ha)
                    .map_or(serde_json::Value::Null, serde_json::Value::Number),
            );
            Feature {
                bbox: None,
                geometry: Some(Geometry::new(geojson::Value::from(&zone.geometry))),
                id: Some(Id::Number(serde_json::Number::from(zone.code))),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    fs::write(path, serde_json::to_string_pretty(&collection)?)?;
    Ok(())
}
