//! Splits a point cloud into tiles along its scan centerline.
//!
//! Usage:
//!   create_tiles --input_path scan.laz --output_path tiles.geojson
//!
//! The tile polygons are written as a GeoJSON feature collection with ids
//! starting at 1 in traversal order.

use anyhow::{Context, Result};
use clap::Parser;
use constants::dataset::DEFAULT_SEED;
use constants::tiling::{
    DEFAULT_CONCAVITY, DEFAULT_SAMPLE_DIVISOR, DEFAULT_TILE_LENGTH, DEFAULT_TILE_WIDTH,
    DIVIDER_OVERSHOOT,
};
use log::info;
use point_cloud_pre_processing::config::TilingConfig;
use point_cloud_pre_processing::laz::read_point_cloud;
use point_cloud_pre_processing::tile_file::{write_debug_geometry, write_tile_file};
use point_cloud_pre_processing::tiling::{create_tiles, project_xy};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Point cloud to tile (.las or .laz)
    #[arg(long = "input_path")]
    input_path: PathBuf,

    /// Output tile file
    #[arg(long = "output_path")]
    output_path: PathBuf,

    /// Tile length along the centerline
    #[arg(long = "tile_length", default_value_t = DEFAULT_TILE_LENGTH)]
    tile_length: f64,

    /// Tile width across the centerline
    #[arg(long = "tile_width", default_value_t = DEFAULT_TILE_WIDTH)]
    tile_width: f64,

    /// One in this many points is used for the concave hull
    #[arg(long = "sample_divisor", default_value_t = DEFAULT_SAMPLE_DIVISOR)]
    sample_divisor: usize,

    /// Seed of the point sampling
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Concavity of the hull
    #[arg(long, default_value_t = DEFAULT_CONCAVITY)]
    concavity: f64,

    /// Divider length as a multiple of the tile width
    #[arg(long = "divider_overshoot", default_value_t = DIVIDER_OVERSHOOT)]
    divider_overshoot: f64,

    /// Also write the hull and centerline as GeoJSON here
    #[arg(long = "debug_geometry_path")]
    debug_geometry_path: Option<PathBuf>,
}

fn main() -> Result<()> {
    point_cloud_pre_processing::init_logging();
    let args = Args::parse();

    let config = TilingConfig {
        tile_length: args.tile_length,
        tile_width: args.tile_width,
        sample_divisor: args.sample_divisor,
        seed: args.seed,
        concavity: args.concavity,
        divider_overshoot: args.divider_overshoot,
        ..TilingConfig::default()
    };
    config.validate()?;

    let (_, points) = read_point_cloud(&args.input_path)
        .with_context(|| format!("Failed to read {}", args.input_path.display()))?;
    let projection = project_xy(&points);
    drop(points);

    info!("Creating tiles...");
    let mut rng = StdRng::seed_from_u64(config.seed);
    let tiling = create_tiles(&projection, &config, &mut rng).context("Tiling failed")?;

    if let Some(path) = &args.debug_geometry_path {
        write_debug_geometry(path, &tiling.hull, &tiling.centerline)?;
    }
    write_tile_file(&args.output_path, &tiling.tiles)?;
    info!("Created {} tiles", tiling.tiles.len());
    Ok(())
}
