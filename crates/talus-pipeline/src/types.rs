//! Shared types for the talus slope analysis pipeline.

use serde::{Deserialize, Serialize};

/// Re-export `MultiPolygon` so downstream crates can build boundaries
/// without depending on `geo` directly.
pub use geo::MultiPolygon;

/// Class code reserved for samples that carry no valid measurement:
/// no-data sentinels, non-finite values, and values below the first
/// band's lower bound. Never counted, reported, or vectorized.
pub const NO_CLASS: u8 = 0;

/// Raster grid size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels (columns).
    pub width: u32,
    /// Height in pixels (rows).
    pub height: u32,
}

impl Dimensions {
    /// Total number of samples in a single-band grid of this size.
    #[must_use]
    pub const fn len(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns `true` if either dimension is zero.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Affine georeference of a north-up raster grid.
///
/// `origin_x`/`origin_y` are the map coordinates of the outer corner of
/// the top-left pixel. `pixel_width` is positive for east-growing
/// columns; `pixel_height` is negative for the usual top-down row order.
/// Rotated grids are not modeled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridTransform {
    /// Map X of the top-left corner of pixel (0, 0).
    pub origin_x: f64,
    /// Map Y of the top-left corner of pixel (0, 0).
    pub origin_y: f64,
    /// Signed pixel size along X, in projection units.
    pub pixel_width: f64,
    /// Signed pixel size along Y, in projection units.
    pub pixel_height: f64,
}

impl GridTransform {
    /// Create a new transform.
    #[must_use]
    pub const fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
        }
    }

    /// Map coordinates of the center of pixel (`col`, `row`).
    #[must_use]
    pub fn pixel_center(&self, col: u32, row: u32) -> (f64, f64) {
        (
            (f64::from(col) + 0.5).mul_add(self.pixel_width, self.origin_x),
            (f64::from(row) + 0.5).mul_add(self.pixel_height, self.origin_y),
        )
    }

    /// Map coordinates of the outer corner of pixel (`col`, `row`),
    /// i.e. the corner shared with pixel (`col - 1`, `row - 1`).
    #[must_use]
    pub fn pixel_corner(&self, col: u32, row: u32) -> (f64, f64) {
        (
            f64::from(col).mul_add(self.pixel_width, self.origin_x),
            f64::from(row).mul_add(self.pixel_height, self.origin_y),
        )
    }

    /// Absolute area of one pixel in squared projection units.
    #[must_use]
    pub fn pixel_area(&self) -> f64 {
        (self.pixel_width * self.pixel_height).abs()
    }

    /// The transform of a sub-window whose top-left pixel is
    /// (`col_off`, `row_off`) in this grid.
    #[must_use]
    pub fn window(&self, col_off: u32, row_off: u32) -> Self {
        let (origin_x, origin_y) = self.pixel_corner(col_off, row_off);
        Self {
            origin_x,
            origin_y,
            pixel_width: self.pixel_width,
            pixel_height: self.pixel_height,
        }
    }

    /// Returns `true` if both pixel sizes are finite and non-zero and
    /// the origin is finite.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.origin_x.is_finite()
            && self.origin_y.is_finite()
            && self.pixel_width.is_finite()
            && self.pixel_height.is_finite()
            && self.pixel_width != 0.0
            && self.pixel_height != 0.0
    }
}

/// A single-band raster of numeric samples plus its spatial metadata.
///
/// Samples are stored row-major, top row first. Every derived raster
/// preserves the source transform/CRS unless explicitly clipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    samples: Vec<f64>,
    dimensions: Dimensions,
    transform: GridTransform,
    crs: Option<String>,
    nodata: Option<f64>,
}

impl Raster {
    /// Create a raster from row-major samples.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidRaster`] if either dimension is
    /// zero or the sample count does not match the dimensions.
    pub fn new(
        samples: Vec<f64>,
        dimensions: Dimensions,
        transform: GridTransform,
        crs: Option<String>,
        nodata: Option<f64>,
    ) -> Result<Self, PipelineError> {
        if dimensions.is_empty() {
            return Err(PipelineError::InvalidRaster(format!(
                "raster has zero extent ({}x{})",
                dimensions.width, dimensions.height,
            )));
        }
        if samples.len() != dimensions.len() {
            return Err(PipelineError::InvalidRaster(format!(
                "sample count {} does not match {}x{} grid",
                samples.len(),
                dimensions.width,
                dimensions.height,
            )));
        }
        Ok(Self {
            samples,
            dimensions,
            transform,
            crs,
            nodata,
        })
    }

    /// Row-major samples, top row first.
    #[must_use]
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// The sample at (`col`, `row`), or `None` outside the grid.
    #[must_use]
    pub fn sample(&self, col: u32, row: u32) -> Option<f64> {
        if col >= self.dimensions.width || row >= self.dimensions.height {
            return None;
        }
        let idx = row as usize * self.dimensions.width as usize + col as usize;
        self.samples.get(idx).copied()
    }

    /// Grid size in pixels.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Affine georeference.
    #[must_use]
    pub const fn transform(&self) -> &GridTransform {
        &self.transform
    }

    /// Coordinate reference system description, if known.
    #[must_use]
    pub fn crs(&self) -> Option<&str> {
        self.crs.as_deref()
    }

    /// No-data sentinel value, if defined.
    #[must_use]
    pub const fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    /// Returns `true` if `value` is this raster's no-data sentinel or
    /// is not a number.
    #[must_use]
    pub fn is_nodata(&self, value: f64) -> bool {
        if value.is_nan() {
            return true;
        }
        self.nodata.is_some_and(|nd| value == nd)
    }

    /// Number of samples that carry a valid measurement.
    #[must_use]
    pub fn valid_count(&self) -> usize {
        self.samples.iter().filter(|&&v| !self.is_nodata(v)).count()
    }
}

/// A raster of ordinal class codes sharing the source raster's
/// spatial metadata. Code [`NO_CLASS`] marks excluded samples.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassRaster {
    codes: Vec<u8>,
    dimensions: Dimensions,
    transform: GridTransform,
    crs: Option<String>,
}

impl ClassRaster {
    /// Create a class raster from row-major codes.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidRaster`] if either dimension is
    /// zero or the code count does not match the dimensions.
    pub fn new(
        codes: Vec<u8>,
        dimensions: Dimensions,
        transform: GridTransform,
        crs: Option<String>,
    ) -> Result<Self, PipelineError> {
        if dimensions.is_empty() {
            return Err(PipelineError::InvalidRaster(format!(
                "class raster has zero extent ({}x{})",
                dimensions.width, dimensions.height,
            )));
        }
        if codes.len() != dimensions.len() {
            return Err(PipelineError::InvalidRaster(format!(
                "code count {} does not match {}x{} grid",
                codes.len(),
                dimensions.width,
                dimensions.height,
            )));
        }
        Ok(Self {
            codes,
            dimensions,
            transform,
            crs,
        })
    }

    /// Row-major class codes, top row first.
    #[must_use]
    pub fn codes(&self) -> &[u8] {
        &self.codes
    }

    /// Grid size in pixels.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Affine georeference, carried over from the source raster.
    #[must_use]
    pub const fn transform(&self) -> &GridTransform {
        &self.transform
    }

    /// Coordinate reference system description, if known.
    #[must_use]
    pub fn crs(&self) -> Option<&str> {
        self.crs.as_deref()
    }

    /// Number of samples holding a real class (not [`NO_CLASS`]).
    #[must_use]
    pub fn classified_count(&self) -> usize {
        self.codes.iter().filter(|&&c| c != NO_CLASS).count()
    }
}

/// An AOI polygon boundary used to clip a raster.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    geometry: MultiPolygon<f64>,
    crs: Option<String>,
}

impl Boundary {
    /// Create a boundary from one or more polygons.
    #[must_use]
    pub const fn new(geometry: MultiPolygon<f64>, crs: Option<String>) -> Self {
        Self { geometry, crs }
    }

    /// The boundary polygons.
    #[must_use]
    pub const fn geometry(&self) -> &MultiPolygon<f64> {
        &self.geometry
    }

    /// Coordinate reference system description, if known.
    #[must_use]
    pub fn crs(&self) -> Option<&str> {
        self.crs.as_deref()
    }
}

/// One slope-percent range mapped to an ordinal class code.
///
/// The range is `(lower, upper]` — the lower bound belongs to the
/// previous band — except for the table's first band, which also
/// includes its lower bound (`[0, 20]` in the default table).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlopeBand {
    /// Lower bound in slope percent (exclusive except for the first band).
    pub lower: f64,
    /// Upper bound in slope percent (inclusive). Omitted in JSON input
    /// for an unbounded final band.
    #[serde(default = "unbounded")]
    pub upper: f64,
    /// Ordinal class code. Must not be [`NO_CLASS`].
    pub code: u8,
}

const fn unbounded() -> f64 {
    f64::INFINITY
}

/// An ordered list of slope bands partitioning `[first.lower, last.upper]`.
///
/// The default table is the five fixed slope-percent bands:
///
/// | Code | Range (percent) |
/// |---|---|
/// | 1 | \[0, 20\] |
/// | 2 | (20, 45\] |
/// | 3 | (45, 70\] |
/// | 4 | (70, 80\] |
/// | 5 | (80, ∞) |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandTable(Vec<SlopeBand>);

impl BandTable {
    /// Create a band table from an ordered list of bands.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if the list is empty,
    /// any band is degenerate or out of order, bands are not contiguous,
    /// or any code is zero or repeated.
    pub fn new(bands: Vec<SlopeBand>) -> Result<Self, PipelineError> {
        if bands.is_empty() {
            return Err(PipelineError::InvalidConfig(
                "band table is empty".to_owned(),
            ));
        }
        let mut seen = [false; 256];
        for (i, band) in bands.iter().enumerate() {
            if band.code == NO_CLASS {
                return Err(PipelineError::InvalidConfig(format!(
                    "band {i} uses reserved code {NO_CLASS}",
                )));
            }
            if seen[band.code as usize] {
                return Err(PipelineError::InvalidConfig(format!(
                    "class code {} appears more than once",
                    band.code,
                )));
            }
            seen[band.code as usize] = true;
            if !band.lower.is_finite() || band.upper.is_nan() || band.upper <= band.lower {
                return Err(PipelineError::InvalidConfig(format!(
                    "band {i} has a degenerate range ({} to {})",
                    band.lower, band.upper,
                )));
            }
            if i > 0 && band.lower != bands[i - 1].upper {
                return Err(PipelineError::InvalidConfig(format!(
                    "band {i} starts at {} but the previous band ends at {}",
                    band.lower,
                    bands[i - 1].upper,
                )));
            }
        }
        Ok(Self(bands))
    }

    /// Bands in ascending range order.
    #[must_use]
    pub fn bands(&self) -> &[SlopeBand] {
        &self.0
    }
}

impl Default for BandTable {
    fn default() -> Self {
        Self(vec![
            SlopeBand {
                lower: 0.0,
                upper: 20.0,
                code: 1,
            },
            SlopeBand {
                lower: 20.0,
                upper: 45.0,
                code: 2,
            },
            SlopeBand {
                lower: 45.0,
                upper: 70.0,
                code: 3,
            },
            SlopeBand {
                lower: 70.0,
                upper: 80.0,
                code: 4,
            },
            SlopeBand {
                lower: 80.0,
                upper: f64::INFINITY,
                code: 5,
            },
        ])
    }
}

/// Area of one class in the report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassArea {
    /// Ordinal class code.
    pub code: u8,
    /// Number of samples holding this code.
    pub count: usize,
    /// Physical area in hectares.
    pub hectares: f64,
}

/// Per-class areas in ascending code order. Computed once per run and
/// handed to the caller for display; never persisted by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaReport(Vec<ClassArea>);

impl AreaReport {
    /// Create a report from entries already in ascending code order.
    #[must_use]
    pub const fn new(entries: Vec<ClassArea>) -> Self {
        Self(entries)
    }

    /// Entries in ascending code order, one per band.
    #[must_use]
    pub fn entries(&self) -> &[ClassArea] {
        &self.0
    }

    /// Area in hectares for `code`, or `None` if the code is not in
    /// the report.
    #[must_use]
    pub fn hectares_for(&self, code: u8) -> Option<f64> {
        self.0.iter().find(|e| e.code == code).map(|e| e.hectares)
    }

    /// Sum of all per-class areas in hectares.
    #[must_use]
    pub fn total_hectares(&self) -> f64 {
        self.0.iter().map(|e| e.hectares).sum()
    }
}

/// Errors that can occur during pipeline processing.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The raster or its metadata is unusable for the requested stage.
    #[error("invalid raster: {0}")]
    InvalidRaster(String),

    /// The boundary and raster cannot be reconciled geometrically.
    #[error("geometry mismatch: {0}")]
    GeometryMismatch(String),

    /// The boundary does not overlap the raster extent.
    #[error("boundary does not overlap the raster extent")]
    EmptyIntersection,

    /// The band table or other configuration is malformed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
