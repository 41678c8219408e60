//! Merges every point cloud below a directory into a single file.

use anyhow::{Context, Result};
use clap::Parser;
use constants::dataset::{DEFAULT_MERGE_POINT_FORMAT, DEFAULT_SEED};
use point_cloud_pre_processing::config::MergeConfig;
use point_cloud_pre_processing::merge::merge_point_clouds;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory searched recursively for .las/.laz files
    #[arg(long = "input_dir")]
    input_dir: PathBuf,

    /// Merged output ending in .las or .laz
    #[arg(long = "output_path")]
    output_path: PathBuf,

    /// Keep one in this many points, 1 keeps everything
    #[arg(long = "sample_prop", default_value_t = 1.0)]
    sample_prop: f64,

    /// Seed of the point sampling
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// LAS point format of the merged file
    #[arg(long = "point_format", default_value_t = DEFAULT_MERGE_POINT_FORMAT)]
    point_format: u8,
}

fn main() -> Result<()> {
    point_cloud_pre_processing::init_logging();
    let args = Args::parse();

    let config = MergeConfig {
        sample_prop: args.sample_prop,
        seed: args.seed,
        point_format: args.point_format,
        ..MergeConfig::new(args.input_dir, args.output_path)
    };

    merge_point_clouds(&config).with_context(|| {
        format!(
            "Failed to merge point clouds from {}",
            config.input_dir.display()
        )
    })?;
    Ok(())
}
