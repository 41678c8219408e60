//! Offline data-preparation tools for LiDAR segmentation datasets.
//!
//! Each binary under `src/bin` wraps one of the modules here: tiling a long
//! scan along its centerline, exporting tiles, merging clouds, attaching
//! predictions and converting datasets into training arrays.
pub mod batch;
pub mod config;
pub mod dataset;
pub mod error;
pub mod exporter;
pub mod laz;
pub mod merge;
pub mod npy;
pub mod predictions;
pub mod progress;
pub mod selection;
pub mod tile_file;
pub mod tiling;

pub use error::{GeometryError, PreprocessError, Result};

/// Installs the `env_logger` backend with `info` as the default level.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
