//! Converts a LiDAR dataset with train/val/test splits into training arrays.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use constants::dataset::DEFAULT_SEED;
use log::info;
use point_cloud_pre_processing::config::{DatasetConfig, DatasetKind, default_workers};
use point_cloud_pre_processing::dataset::preprocess_dataset;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Dataset {
    /// InternRail tiles, every file of each split
    Internrail,
    /// RailCloud-HdF, a seeded sample of each split
    Railcloudhdf,
}

impl From<Dataset> for DatasetKind {
    fn from(dataset: Dataset) -> Self {
        match dataset {
            Dataset::Internrail => DatasetKind::InternRail,
            Dataset::Railcloudhdf => DatasetKind::RailCloudHdf,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Which dataset layout to read
    #[arg(long, value_enum)]
    dataset: Dataset,

    /// Dataset root containing train, val and test folders
    #[arg(long = "dataset_root")]
    dataset_root: PathBuf,

    /// Output root for the preprocessed splits
    #[arg(long = "output_root")]
    output_root: PathBuf,

    /// Seed of the file sampling
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Worker threads
    #[arg(long = "num_workers", default_value_t = default_workers())]
    num_workers: usize,
}

fn main() -> Result<()> {
    point_cloud_pre_processing::init_logging();
    let args = Args::parse();

    let config = DatasetConfig {
        kind: args.dataset.into(),
        dataset_root: args.dataset_root,
        output_root: args.output_root,
        seed: args.seed,
        num_workers: args.num_workers,
    };

    let written = preprocess_dataset(&config).with_context(|| {
        format!("Preprocessing {} failed", config.dataset_root.display())
    })?;
    info!("Processed {} tiles into {}", written, config.output_root.display());
    Ok(())
}
