//! Error taxonomy for file I/O around the pipeline.

use talus_pipeline::PipelineError;

/// Convenience alias for I/O results.
pub type Result<T> = std::result::Result<T, IoError>;

/// Errors raised while reading or writing pipeline files.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Missing input file, unreadable data, or unwritable output.
    #[error("file I/O error: {0}")]
    FileIo(#[from] std::io::Error),

    /// Malformed or unreadable TIFF container.
    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    /// Malformed GeoJSON document.
    #[error("GeoJSON error: {0}")]
    Geojson(#[from] geojson::Error),

    /// JSON serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file decoded, but not into something the pipeline accepts.
    #[error("unsupported raster: {0}")]
    UnsupportedRaster(String),

    /// The decoded boundary holds no usable polygon.
    #[error("invalid boundary: {0}")]
    InvalidBoundary(String),

    /// A pipeline invariant was violated by decoded data.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}
