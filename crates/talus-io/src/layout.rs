//! Output folder layout under the workspace root.
//!
//! The pipeline writes its intermediates into fixed subfolders --
//! `Masked/` for the clipped raster, `Reclass/` for the reclassified
//! raster, `Vector/` for dissolved zones -- creating them on demand.
//! Each stage's output path is derived from the *previous stage's
//! path*, handed over explicitly; nothing scans directories for
//! matching suffixes.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Resolved output directories for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    masked_dir: PathBuf,
    reclass_dir: PathBuf,
    vector_dir: Option<PathBuf>,
}

impl OutputLayout {
    /// Create the output folders under `workspace`, including
    /// `Vector/` only when the vectorize stage is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`crate::IoError::FileIo`] if a folder cannot be created.
    pub fn prepare(workspace: &Path, with_vector: bool) -> Result<Self> {
        let masked_dir = workspace.join("Masked");
        let reclass_dir = workspace.join("Reclass");
        fs::create_dir_all(&masked_dir)?;
        fs::create_dir_all(&reclass_dir)?;
        let vector_dir = if with_vector {
            let dir = workspace.join("Vector");
            fs::create_dir_all(&dir)?;
            Some(dir)
        } else {
            None
        };
        Ok(Self {
            masked_dir,
            reclass_dir,
            vector_dir,
        })
    }

    /// Path for the clipped raster, named after the AOI file:
    /// `Masked/<aoi>_slope.tif`.
    #[must_use]
    pub fn masked_raster(&self, aoi: &Path) -> PathBuf {
        self.masked_dir.join(format!("{}_slope.tif", stem(aoi)))
    }

    /// Path for the reclassified raster, named after the clipped
    /// raster: `Reclass/<clipped>_reclass.tif`.
    #[must_use]
    pub fn reclass_raster(&self, masked: &Path) -> PathBuf {
        self.reclass_dir.join(format!("{}_reclass.tif", stem(masked)))
    }

    /// Path for the dissolved zone vector, named after the
    /// reclassified raster: `Vector/<reclass>_dissolve.geojson`.
    /// `None` when the vectorize stage is disabled.
    #[must_use]
    pub fn zone_vector(&self, reclass: &Path) -> Option<PathBuf> {
        self.vector_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}_dissolve.geojson", stem(reclass))))
    }
}

fn stem(path: &Path) -> &str {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("output")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn prepare_creates_folders() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::prepare(dir.path(), false).unwrap();
        assert!(dir.path().join("Masked").is_dir());
        assert!(dir.path().join("Reclass").is_dir());
        assert!(!dir.path().join("Vector").exists());
        assert!(layout.zone_vector(Path::new("x.tif")).is_none());
    }

    #[test]
    fn prepare_with_vector_creates_vector_folder() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::prepare(dir.path(), true).unwrap();
        assert!(dir.path().join("Vector").is_dir());
        assert!(layout.zone_vector(Path::new("x.tif")).is_some());
    }

    #[test]
    fn prepare_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        OutputLayout::prepare(dir.path(), true).unwrap();
        assert!(OutputLayout::prepare(dir.path(), true).is_ok());
    }

    #[test]
    fn stage_paths_chain_from_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::prepare(dir.path(), true).unwrap();

        let masked = layout.masked_raster(Path::new("/data/AOI/sheep_creek.geojson"));
        assert_eq!(
            masked.file_name().unwrap().to_str().unwrap(),
            "sheep_creek_slope.tif",
        );

        let reclass = layout.reclass_raster(&masked);
        assert_eq!(
            reclass.file_name().unwrap().to_str().unwrap(),
            "sheep_creek_slope_reclass.tif",
        );

        let vector = layout.zone_vector(&reclass).unwrap();
        assert_eq!(
            vector.file_name().unwrap().to_str().unwrap(),
            "sheep_creek_slope_reclass_dissolve.geojson",
        );
    }
}
