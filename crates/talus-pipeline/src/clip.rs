//! Clipping: mask a raster to an AOI polygon boundary.
//!
//! The output raster is cropped to the intersection of the raster
//! extent and the boundary's bounding rectangle, with an updated
//! transform. Samples whose pixel center falls outside every boundary
//! polygon are set to the no-data sentinel.
//!
//! Geometry predicates (bounding rectangles, point-in-polygon) are
//! delegated to the `geo` crate. CRS reconciliation is a plain string
//! comparison; re-projection is out of scope.

use geo::{BoundingRect, Contains, Intersects, Point, Rect, coord};

use crate::types::{Boundary, Dimensions, PipelineError, Raster};

/// Sentinel written to masked-out samples when the source raster does
/// not define its own no-data value.
pub const DEFAULT_NODATA: f64 = -9999.0;

/// Clip a raster to a polygon boundary.
///
/// # Errors
///
/// Returns [`PipelineError::GeometryMismatch`] if the raster and
/// boundary both declare a CRS and the declarations differ, or the
/// boundary has no extent; [`PipelineError::EmptyIntersection`] if the
/// boundary does not overlap the raster extent or covers no pixel
/// center; [`PipelineError::InvalidRaster`] if the raster transform is
/// unusable.
pub fn clip(raster: &Raster, boundary: &Boundary) -> Result<Raster, PipelineError> {
    let transform = raster.transform();
    if !transform.is_valid() {
        return Err(PipelineError::InvalidRaster(
            "raster transform has zero or non-finite pixel size".to_owned(),
        ));
    }
    if let (Some(raster_crs), Some(boundary_crs)) = (raster.crs(), boundary.crs())
        && raster_crs != boundary_crs
    {
        return Err(PipelineError::GeometryMismatch(format!(
            "raster CRS '{raster_crs}' does not match boundary CRS '{boundary_crs}'",
        )));
    }

    let boundary_rect = boundary
        .geometry()
        .bounding_rect()
        .ok_or_else(|| PipelineError::GeometryMismatch("boundary has no extent".to_owned()))?;

    let dims = raster.dimensions();
    let (x0, y0) = transform.pixel_corner(0, 0);
    let (x1, y1) = transform.pixel_corner(dims.width, dims.height);
    let extent = Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 });
    if !extent.intersects(&boundary_rect) {
        return Err(PipelineError::EmptyIntersection);
    }

    let (col0, col1) = axis_window(
        boundary_rect.min().x,
        boundary_rect.max().x,
        transform.origin_x,
        transform.pixel_width,
        dims.width,
    );
    let (row0, row1) = axis_window(
        boundary_rect.min().y,
        boundary_rect.max().y,
        transform.origin_y,
        transform.pixel_height,
        dims.height,
    );
    if col0 >= col1 || row0 >= row1 {
        return Err(PipelineError::EmptyIntersection);
    }

    let out_dims = Dimensions {
        width: col1 - col0,
        height: row1 - row0,
    };
    let nodata = raster.nodata().unwrap_or(DEFAULT_NODATA);
    let geometry = boundary.geometry();

    let mut samples = Vec::with_capacity(out_dims.len());
    let mut inside_count = 0_usize;
    for row in row0..row1 {
        for col in col0..col1 {
            let (cx, cy) = transform.pixel_center(col, row);
            if geometry.contains(&Point::new(cx, cy)) {
                inside_count += 1;
                // sample() cannot miss: col/row are clamped to the grid.
                samples.push(raster.sample(col, row).unwrap_or(nodata));
            } else {
                samples.push(nodata);
            }
        }
    }
    if inside_count == 0 {
        return Err(PipelineError::EmptyIntersection);
    }

    Raster::new(
        samples,
        out_dims,
        transform.window(col0, row0),
        raster.crs().map(str::to_owned),
        Some(nodata),
    )
}

/// Pixel index range `[lo, hi)` covering the map interval
/// `[coord_a, coord_b]` along one axis, clamped to `[0, size]`.
///
/// Handles either sign of `pixel_size`: map-space min/max can land on
/// either end of the index axis.
fn axis_window(coord_a: f64, coord_b: f64, origin: f64, pixel_size: f64, size: u32) -> (u32, u32) {
    let fa = (coord_a - origin) / pixel_size;
    let fb = (coord_b - origin) / pixel_size;
    let limit = f64::from(size);
    let lo = fa.min(fb).floor().clamp(0.0, limit);
    let hi = fa.max(fb).ceil().clamp(0.0, limit);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let window = (lo as u32, hi as u32);
    window
}
