//! Validated parameter sets for each tool.
use crate::error::{PreprocessError, Result};
use constants::dataset::{DEFAULT_MERGE_POINT_FORMAT, DEFAULT_SEED};
use constants::tiling::{
    DEFAULT_CONCAVITY, DEFAULT_SAMPLE_DIVISOR, DEFAULT_TILE_LENGTH, DEFAULT_TILE_TEMPLATE,
    DEFAULT_TILE_WIDTH, DIVIDER_OVERSHOOT, MIN_BRANCH_FACTOR, TILE_ID_PLACEHOLDER,
};
use std::path::PathBuf;

/// Parameters of the centerline, transect and splitting stages.
#[derive(Debug, Clone)]
pub struct TilingConfig {
    /// Tile length along the centerline, also the transect step.
    pub tile_length: f64,
    /// Tile width across the centerline.
    pub tile_width: f64,
    /// One in this many points feeds the concave hull.
    pub sample_divisor: usize,
    /// Seed of the sampling RNG.
    pub seed: u64,
    /// Concavity of the hull.
    pub concavity: f64,
    /// Minimum skeleton branch length in multiples of `tile_length`.
    pub min_branch_factor: f64,
    /// Divider length in multiples of `tile_width`.
    pub divider_overshoot: f64,
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            tile_length: DEFAULT_TILE_LENGTH,
            tile_width: DEFAULT_TILE_WIDTH,
            sample_divisor: DEFAULT_SAMPLE_DIVISOR,
            seed: DEFAULT_SEED,
            concavity: DEFAULT_CONCAVITY,
            min_branch_factor: MIN_BRANCH_FACTOR,
            divider_overshoot: DIVIDER_OVERSHOOT,
        }
    }
}

impl TilingConfig {
    pub fn validate(&self) -> Result<()> {
        require_positive("tile_length", self.tile_length)?;
        require_positive("tile_width", self.tile_width)?;
        require_positive("concavity", self.concavity)?;
        if self.sample_divisor == 0 {
            return Err(PreprocessError::Config(
                "sample_divisor must be at least 1".into(),
            ));
        }
        if !(self.min_branch_factor >= 0.0) {
            return Err(PreprocessError::Config(format!(
                "min_branch_factor must be non-negative, got {}",
                self.min_branch_factor
            )));
        }
        if !(self.divider_overshoot > 1.0) {
            return Err(PreprocessError::Config(format!(
                "divider_overshoot must exceed 1.0, got {}",
                self.divider_overshoot
            )));
        }
        Ok(())
    }

    /// Minimum length of a skeleton branch that survives pruning.
    pub fn min_branch_length(&self) -> f64 {
        self.min_branch_factor * self.tile_length
    }

    /// Length of every divider line.
    pub fn divider_length(&self) -> f64 {
        self.tile_width * self.divider_overshoot
    }
}

/// Parameters of the tile exporter.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub input_path: PathBuf,
    pub tiles_path: PathBuf,
    pub output_dir: PathBuf,
    pub tiles_selection: Option<PathBuf>,
    /// Output file name with `#` standing in for the tile id.
    pub filename_template: String,
    pub num_workers: usize,
}

impl ExportConfig {
    pub fn new(input_path: PathBuf, tiles_path: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            input_path,
            tiles_path,
            output_dir,
            tiles_selection: None,
            filename_template: DEFAULT_TILE_TEMPLATE.to_string(),
            num_workers: default_workers(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.filename_template.contains(TILE_ID_PLACEHOLDER) {
            return Err(PreprocessError::Config(format!(
                "filename template '{}' has no '{}' placeholder",
                self.filename_template, TILE_ID_PLACEHOLDER
            )));
        }
        require_workers(self.num_workers)
    }

    /// Output path for the tile with the given id.
    pub fn tile_output_path(&self, tile_id: u32) -> PathBuf {
        let name = self
            .filename_template
            .replace(TILE_ID_PLACEHOLDER, &tile_id.to_string());
        self.output_dir.join(name)
    }
}

/// Parameters of the point cloud merger.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    pub input_dir: PathBuf,
    pub output_path: PathBuf,
    /// Keep one in `sample_prop` points; 1 keeps everything.
    pub sample_prop: f64,
    pub seed: u64,
    pub point_format: u8,
}

impl MergeConfig {
    pub fn new(input_dir: PathBuf, output_path: PathBuf) -> Self {
        Self {
            input_dir,
            output_path,
            sample_prop: 1.0,
            seed: DEFAULT_SEED,
            point_format: DEFAULT_MERGE_POINT_FORMAT,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.sample_prop >= 1.0) {
            return Err(PreprocessError::Config(format!(
                "sample_prop must be at least 1, got {}",
                self.sample_prop
            )));
        }
        if self.point_format > 10 {
            return Err(PreprocessError::Config(format!(
                "unsupported point format {}",
                self.point_format
            )));
        }
        Ok(())
    }
}

/// Source dataset handled by the preprocessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    InternRail,
    RailCloudHdf,
}

/// Parameters of the dataset preprocessor.
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    pub kind: DatasetKind,
    pub dataset_root: PathBuf,
    pub output_root: PathBuf,
    pub seed: u64,
    pub num_workers: usize,
}

impl DatasetConfig {
    pub fn validate(&self) -> Result<()> {
        require_workers(self.num_workers)
    }
}

/// Parameters of the prediction exporter.
#[derive(Debug, Clone)]
pub struct PredictionConfig {
    pub result_dir: PathBuf,
    pub test_root: PathBuf,
    pub output_dir: PathBuf,
    pub num_workers: usize,
}

impl PredictionConfig {
    pub fn validate(&self) -> Result<()> {
        require_workers(self.num_workers)
    }
}

/// Number of logical CPUs, the default pool size.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(PreprocessError::Config(format!(
            "{name} must be a positive number, got {value}"
        )))
    }
}

fn require_workers(num_workers: usize) -> Result<()> {
    if num_workers == 0 {
        return Err(PreprocessError::Config(
            "num_workers must be at least 1".into(),
        ));
    }
    Ok(())
}
