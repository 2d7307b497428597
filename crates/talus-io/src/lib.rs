//! talus-io: file I/O for the talus slope analysis pipeline.
//!
//! Reads and writes the formats the pipeline touches -- single-band
//! GeoTIFF rasters and GeoJSON boundaries/zones -- and lays out the
//! output folders under a workspace root. All analysis lives in
//! `talus-pipeline`; this crate only moves data between files and the
//! pipeline's in-memory types.

pub mod boundary;
pub mod error;
pub mod geotiff;
pub mod layout;

pub use boundary::{read_boundary, write_zones};
pub use error::{IoError, Result};
pub use geotiff::{read_geotiff, write_class_geotiff, write_geotiff};
pub use layout::OutputLayout;
