//! talus: one-shot slope-band area analysis.
//!
//! Clips a slope-percent raster to an AOI polygon, reclassifies the
//! result into five slope bands, and prints the per-band area in
//! hectares -- one line per band, ascending code order, on stdout.
//! Progress goes to stderr so the stdout report stays parseable.
//!
//! # Usage
//!
//! ```text
//! talus <WORKSPACE> --slope Slope/sheep_creek_slopePercent.tif \
//!     --aoi AOI/aoi.geojson [--vectorize]
//! ```
//!
//! Intermediate rasters land in `<WORKSPACE>/Masked` and
//! `<WORKSPACE>/Reclass` (and dissolved zones in `<WORKSPACE>/Vector`
//! with `--vectorize`), created on demand.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use talus_io::OutputLayout;
use talus_pipeline::BandTable;

/// Slope-band area analysis over a clipped raster.
///
/// Runs clip -> reclassify -> aggregate and reports hectares per slope
/// band. All paths are explicit; each stage receives the previous
/// stage's output path directly.
#[derive(Parser)]
#[command(name = "talus", version)]
struct Cli {
    /// Workspace root directory; output folders are created beneath it.
    workspace: PathBuf,

    /// Single-band slope raster in percent (GeoTIFF).
    #[arg(long)]
    slope: PathBuf,

    /// AOI polygon boundary (GeoJSON).
    #[arg(long)]
    aoi: PathBuf,

    /// Also dissolve the reclassified raster into per-class polygon
    /// zones under Vector/.
    #[arg(long)]
    vectorize: bool,

    /// Band table as a JSON array of {"lower", "upper", "code"}
    /// objects (omit "upper" on the final band for an unbounded
    /// range). Defaults to the fixed five slope-percent bands.
    #[arg(long)]
    bands_json: Option<String>,
}

/// Build the band table from CLI arguments.
///
/// A `--bands-json` table is re-validated through [`BandTable::new`]
/// so malformed tables fail here rather than mid-pipeline.
fn bands_from_cli(cli: &Cli) -> Result<BandTable, String> {
    let Some(ref json) = cli.bands_json else {
        return Ok(BandTable::default());
    };
    let table: BandTable =
        serde_json::from_str(json).map_err(|e| format!("Error parsing --bands-json: {e}"))?;
    BandTable::new(table.bands().to_vec()).map_err(|e| format!("Invalid --bands-json: {e}"))
}

/// Run the full job: read inputs, run the pipeline stages in order,
/// persist every intermediate, print the report.
fn run(cli: &Cli) -> Result<(), String> {
    let table = bands_from_cli(cli)?;
    let layout = OutputLayout::prepare(&cli.workspace, cli.vectorize)
        .map_err(|e| format!("Error preparing {}: {e}", cli.workspace.display()))?;

    // Stage 1: clip to the AOI boundary.
    eprintln!("Clipping in progress...");
    let raster = talus_io::read_geotiff(&cli.slope)
        .map_err(|e| format!("Error reading {}: {e}", cli.slope.display()))?;
    let boundary = talus_io::read_boundary(&cli.aoi)
        .map_err(|e| format!("Error reading {}: {e}", cli.aoi.display()))?;
    let clipped = talus_pipeline::clip(&raster, &boundary).map_err(|e| format!("Clip: {e}"))?;
    let masked_path = layout.masked_raster(&cli.aoi);
    talus_io::write_geotiff(&masked_path, &clipped)
        .map_err(|e| format!("Error writing {}: {e}", masked_path.display()))?;
    eprintln!("Raster clipped: {}", masked_path.display());

    // Stage 2: reclassify into band codes.
    eprintln!("Reclassification in progress...");
    let classified =
        talus_pipeline::reclassify(&clipped, &table).map_err(|e| format!("Reclassify: {e}"))?;
    let reclass_path = layout.reclass_raster(&masked_path);
    talus_io::write_class_geotiff(&reclass_path, &classified)
        .map_err(|e| format!("Error writing {}: {e}", reclass_path.display()))?;
    eprintln!("Raster reclassified: {}", reclass_path.display());

    // Stage 3: aggregate and report, one hectare value per band.
    let report =
        talus_pipeline::aggregate(&classified, &table).map_err(|e| format!("Aggregate: {e}"))?;
    for entry in report.entries() {
        println!("{}", entry.hectares);
    }

    // Optional stage: dissolve class zones into polygons.
    if let Some(vector_path) = layout.zone_vector(&reclass_path) {
        eprintln!("Vectorizing raster...");
        let zones =
            talus_pipeline::vectorize(&classified).map_err(|e| format!("Vectorize: {e}"))?;
        talus_io::write_zones(&vector_path, &zones)
            .map_err(|e| format!("Error writing {}: {e}", vector_path.display()))?;
        eprintln!("Raster vectorized: {}", vector_path.display());
    }

    eprintln!("Process completed");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}
