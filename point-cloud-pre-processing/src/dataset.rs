//! Conversion of labelled LiDAR datasets into per-tile training arrays.
use crate::batch::run_batch;
use crate::config::{DatasetConfig, DatasetKind};
use crate::error::{PreprocessError, Result};
use crate::laz::read_point_cloud;
use crate::merge::discover_point_clouds;
use crate::npy::write_npy;
use constants::class::{RAILCLOUD_HDF_REMAP, remap_class};
use constants::coordinate_system::{FEET_TILE_PREFIX, feet_to_meters};
use constants::dataset::{RAILCLOUD_HDF_SAMPLES, SPLITS};
use las::Point;
use log::{info, warn};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::path::{Path, PathBuf};

/// One input tile and the split it belongs to.
#[derive(Debug, Clone)]
pub struct TileJob {
    pub path: PathBuf,
    pub split: &'static str,
}

impl DatasetKind {
    /// Whether split directories are searched below their direct children.
    fn recursive(self) -> bool {
        matches!(self, DatasetKind::RailCloudHdf)
    }

    /// Files sampled from each split, or `None` to keep them all.
    fn sample_sizes(self) -> Option<[usize; 3]> {
        match self {
            DatasetKind::InternRail => None,
            DatasetKind::RailCloudHdf => Some(RAILCLOUD_HDF_SAMPLES),
        }
    }

    fn has_strength(self) -> bool {
        matches!(self, DatasetKind::RailCloudHdf)
    }
}

/// Picks `amount` files at random, clamped to what is available, in path order.
pub fn sample_files<R: Rng + ?Sized>(
    files: Vec<PathBuf>,
    amount: usize,
    split: &str,
    rng: &mut R,
) -> Vec<PathBuf> {
    let available = files.len();
    if amount > available {
        warn!("Split {split} has {available} files, fewer than the {amount} requested");
    }
    let amount = amount.min(available);
    let mut chosen: Vec<PathBuf> = rand::seq::index::sample(rng, available, amount)
        .into_iter()
        .map(|idx| files[idx].clone())
        .collect();
    chosen.sort();
    chosen
}

/// Lists the tiles of every split, sampling them where the dataset requires it.
pub fn collect_jobs(config: &DatasetConfig) -> Result<Vec<TileJob>> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut jobs = Vec::new();

    for (idx, &split) in SPLITS.iter().enumerate() {
        let split_dir = config.dataset_root.join(split);
        if !split_dir.is_dir() {
            warn!("Split directory {} is missing", split_dir.display());
            continue;
        }

        let mut files = discover_point_clouds(&split_dir, config.kind.recursive())?;
        if let Some(sizes) = config.kind.sample_sizes() {
            files = sample_files(files, sizes[idx], split, &mut rng);
        }
        info!("Split {split}: {} tiles", files.len());
        jobs.extend(files.into_iter().map(|path| TileJob { path, split }));
    }
    Ok(jobs)
}

fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| PreprocessError::Input(format!("bad file name {}", path.display())))
}

/// Flattened xyz coordinates, converted to metres for feet-based tiles.
fn coordinates(points: &[Point], in_feet: bool) -> Vec<f32> {
    points
        .iter()
        .flat_map(|p| {
            let (x, y, z) = if in_feet {
                feet_to_meters(p.x, p.y, p.z)
            } else {
                (p.x, p.y, p.z)
            };
            [x as f32, y as f32, z as f32]
        })
        .collect()
}

/// Classification codes as training labels.
fn segments(points: &[Point], kind: DatasetKind) -> Vec<u8> {
    points
        .iter()
        .map(|p| {
            let code = u8::from(p.classification);
            match kind {
                DatasetKind::RailCloudHdf => remap_class(RAILCLOUD_HDF_REMAP, code),
                DatasetKind::InternRail => code,
            }
        })
        .collect()
}

/// Intensity scaled to `[0, 1]`.
fn strengths(points: &[Point]) -> Vec<f32> {
    points
        .iter()
        .map(|p| f32::from(p.intensity) / f32::from(u16::MAX))
        .collect()
}

/// Converts one tile into `<output_root>/<split>/<stem>/*.npy`.
pub fn parse_tile(job: &TileJob, kind: DatasetKind, output_root: &Path) -> Result<PathBuf> {
    let stem = file_stem(&job.path)?;
    info!("Parsing tile {stem} in {} split", job.split);

    let (_, points) = read_point_cloud(&job.path)?;
    let count = points.len();
    let in_feet = kind == DatasetKind::InternRail && stem.starts_with(FEET_TILE_PREFIX);

    let save_path = output_root.join(job.split).join(&stem);
    fs::create_dir_all(&save_path).map_err(|e| PreprocessError::io(&save_path, e))?;

    write_npy(&save_path.join("coord.npy"), &[count, 3], &coordinates(&points, in_feet))?;
    if kind.has_strength() {
        write_npy(&save_path.join("strength.npy"), &[count, 1], &strengths(&points))?;
    }
    write_npy(&save_path.join("segment.npy"), &[count], &segments(&points, kind))?;
    Ok(save_path)
}

/// Converts every tile of the dataset. Returns the number of tiles written.
pub fn preprocess_dataset(config: &DatasetConfig) -> Result<usize> {
    config.validate()?;
    if !config.dataset_root.is_dir() {
        return Err(PreprocessError::Input(format!(
            "{} is not a directory",
            config.dataset_root.display()
        )));
    }

    for split in SPLITS {
        let dir = config.output_root.join(split);
        fs::create_dir_all(&dir).map_err(|e| PreprocessError::io(&dir, e))?;
    }

    let jobs = collect_jobs(config)?;
    info!("Processing {} tiles...", jobs.len());
    let written = run_batch(
        config.num_workers,
        &jobs,
        "tiles",
        |job: &TileJob| job.path.display().to_string(),
        |job: &TileJob| parse_tile(job, config.kind, &config.output_root),
    )?;
    Ok(written.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use las::point::Classification;

    #[test]
    fn sampling_clamps_and_sorts() {
        let files: Vec<PathBuf> = ["c.las", "a.las", "b.las"].iter().map(PathBuf::from).collect();
        let mut rng = StdRng::seed_from_u64(123);

        let all = sample_files(files.clone(), 10, "val", &mut rng);
        assert_eq!(all, vec![PathBuf::from("a.las"), "b.las".into(), "c.las".into()]);

        let two = sample_files(files, 2, "val", &mut rng);
        assert_eq!(two.len(), 2);
        assert!(two[0] < two[1]);
    }

    #[test]
    fn railcloud_labels_are_remapped() {
        let points: Vec<Point> = [2u8, 4, 5, 7, 8, 9]
            .iter()
            .map(|&code| Point {
                classification: Classification::new(code).unwrap(),
                ..Default::default()
            })
            .collect();

        assert_eq!(
            segments(&points, DatasetKind::RailCloudHdf),
            vec![0, 1, 2, 3, 4, 9]
        );
        assert_eq!(
            segments(&points, DatasetKind::InternRail),
            vec![2, 4, 5, 7, 8, 9]
        );
    }

    #[test]
    fn feet_tiles_are_scaled_to_metres() {
        let points = vec![Point {
            x: 3937.0,
            y: 0.0,
            z: 1.0,
            ..Default::default()
        }];
        let metres = coordinates(&points, true);
        assert_relative_eq!(metres[0], 1200.0, epsilon = 1e-3);
        assert_relative_eq!(coordinates(&points, false)[0], 3937.0);
    }

    #[test]
    fn strength_is_normalised_intensity() {
        let points = vec![Point {
            intensity: u16::MAX,
            ..Default::default()
        }];
        assert_relative_eq!(strengths(&points)[0], 1.0);
    }
}
