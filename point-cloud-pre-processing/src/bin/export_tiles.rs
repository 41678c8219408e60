//! Crops a point cloud to the tiles of a tile file, one output file per tile.

use anyhow::{Context, Result};
use clap::Parser;
use constants::tiling::DEFAULT_TILE_TEMPLATE;
use log::info;
use point_cloud_pre_processing::config::{ExportConfig, default_workers};
use point_cloud_pre_processing::exporter::export_tiles;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source point cloud (.las or .laz)
    #[arg(long = "input_path", visible_alias = "las_path")]
    input_path: PathBuf,

    /// Tile file written by create_tiles
    #[arg(long = "tiles_path")]
    tiles_path: PathBuf,

    /// Directory receiving one file per tile
    #[arg(long = "output_dir")]
    output_dir: PathBuf,

    /// Optional file of newline-separated 1-based tile indices
    #[arg(long = "tiles_selection")]
    tiles_selection: Option<PathBuf>,

    /// Output file name, '#' is replaced by the tile id
    #[arg(long = "filename_template", default_value = DEFAULT_TILE_TEMPLATE)]
    filename_template: String,

    /// Worker threads cropping tiles
    #[arg(long = "num_workers", default_value_t = default_workers())]
    num_workers: usize,
}

fn main() -> Result<()> {
    point_cloud_pre_processing::init_logging();
    let args = Args::parse();

    let config = ExportConfig {
        tiles_selection: args.tiles_selection,
        filename_template: args.filename_template,
        num_workers: args.num_workers,
        ..ExportConfig::new(args.input_path, args.tiles_path, args.output_dir)
    };

    let written = export_tiles(&config).context("Tile export failed")?;
    info!("Exported {} tiles to {}", written, config.output_dir.display());
    Ok(())
}
