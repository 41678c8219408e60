//! Adds predicted labels to the original test point clouds.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use point_cloud_pre_processing::config::{PredictionConfig, default_workers};
use point_cloud_pre_processing::predictions::export_predictions;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the .npy predictions
    #[arg(long = "result_dir")]
    result_dir: PathBuf,

    /// Directory holding the original test point clouds
    #[arg(long = "test_root")]
    test_root: PathBuf,

    /// Directory receiving the labelled point clouds
    #[arg(long = "output_dir")]
    output_dir: PathBuf,

    /// Worker threads
    #[arg(long = "num_workers", default_value_t = default_workers())]
    num_workers: usize,
}

fn main() -> Result<()> {
    point_cloud_pre_processing::init_logging();
    let args = Args::parse();

    let config = PredictionConfig {
        result_dir: args.result_dir,
        test_root: args.test_root,
        output_dir: args.output_dir,
        num_workers: args.num_workers,
    };

    let written = export_predictions(&config).context("Exporting predictions failed")?;
    info!("Saved {} point clouds to {}", written, config.output_dir.display());
    Ok(())
}
