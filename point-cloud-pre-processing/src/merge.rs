//! Merging many point clouds into one, with optional subsampling.
use crate::config::MergeConfig;
use crate::error::{PreprocessError, Result};
use crate::laz::{create_reader, create_writer, is_point_cloud_file, read_point_cloud};
use crate::progress::unit_progress_bar;
use las::point::Format;
use las::{Builder, Color, Header, Point};
use log::info;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Highest return number representable by the legacy point formats.
const LEGACY_MAX_RETURNS: u8 = 5;

/// Finds `.las`/`.laz` files under `root`, sorted by path.
/// Only direct children are considered unless `recursive` is set.
pub fn discover_point_clouds(root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(PreprocessError::Input(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    let walker = WalkDir::new(root).sort_by_file_name();
    let walker = if recursive { walker } else { walker.max_depth(1) };

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            PreprocessError::io(path, e.into())
        })?;
        if entry.file_type().is_file() && is_point_cloud_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Indices of the points kept when keeping one in `sample_prop`, in file order.
pub fn sample_indices<R: Rng + ?Sized>(total: usize, sample_prop: f64, rng: &mut R) -> Vec<usize> {
    let amount = (total as f64 / sample_prop).round() as usize;
    if amount >= total {
        return (0..total).collect();
    }
    let mut indices = rand::seq::index::sample(rng, total, amount).into_vec();
    indices.sort_unstable();
    indices
}

/// Reshapes a point so it carries exactly the attributes of `format`.
pub fn conform_point(mut point: Point, format: &Format) -> Point {
    if !format.is_extended {
        point.return_number = point.return_number.min(LEGACY_MAX_RETURNS);
        point.number_of_returns = point.number_of_returns.min(LEGACY_MAX_RETURNS);
        point.scanner_channel = 0;
    }
    point.gps_time = format
        .has_gps_time
        .then(|| point.gps_time.unwrap_or_default());
    point.color = format
        .has_color
        .then(|| point.color.unwrap_or(Color::new(0, 0, 0)));
    point.nir = format.has_nir.then(|| point.nir.unwrap_or_default());
    if !format.has_waveform {
        point.waveform = None;
    }
    point.extra_bytes.resize(usize::from(format.extra_bytes), 0);
    point
}

/// Header of the merged file: the requested format with the first file's transforms.
fn merged_header(template: &Header, point_format: u8) -> Result<Header> {
    let format = Format::new(point_format)?;
    let version = if format.is_extended { (1, 4) } else { (1, 2) };
    let mut builder = Builder::from(version);
    builder.point_format = format;
    builder.transforms = *template.transforms();
    builder.generating_software = env!("CARGO_PKG_NAME").to_string();
    Ok(builder.into_header()?)
}

/// Merges every cloud under `config.input_dir` into `config.output_path`.
/// Returns the number of points written.
pub fn merge_point_clouds(config: &MergeConfig) -> Result<u64> {
    config.validate()?;

    let files = discover_point_clouds(&config.input_dir, true)?;
    let Some(first) = files.first() else {
        return Err(PreprocessError::Input(format!(
            "no .las or .laz files under {}",
            config.input_dir.display()
        )));
    };
    info!("Merging {} las/laz files...", files.len());

    if let Some(parent) = config.output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PreprocessError::io(parent, e))?;
    }

    let template = create_reader(first)?.header().clone();
    let header = merged_header(&template, config.point_format)?;
    let format = *header.point_format();
    let mut writer = create_writer(&config.output_path, header)?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let pb = unit_progress_bar(files.len() as u64, "files", "Merging");
    let mut written = 0u64;

    for path in &files {
        let (_, points) = read_point_cloud(path)?;
        let total = points.len();
        let keep = sample_indices(total, config.sample_prop, &mut rng);

        let mut wanted = keep.iter().copied().peekable();
        for (idx, point) in points.into_iter().enumerate() {
            if wanted.next_if_eq(&idx).is_some() {
                writer.write_point(conform_point(point, &format))?;
            }
        }
        written += keep.len() as u64;
        info!("Merged {} of {} points from {}", keep.len(), total, path.display());
        pb.inc(1);
    }

    writer.close()?;
    pb.finish_with_message("Merged");
    info!(
        "Wrote {} points to {}",
        written,
        config.output_path.display()
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_keeps_rounded_fraction_in_order() {
        let mut rng = StdRng::seed_from_u64(123);
        let indices = sample_indices(1000, 4.0, &mut rng);
        assert_eq!(indices.len(), 250);
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn proportion_of_one_keeps_everything() {
        let mut rng = StdRng::seed_from_u64(123);
        assert_eq!(sample_indices(7, 1.0, &mut rng), (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn conform_to_legacy_format_drops_and_clamps() {
        let format = Format::new(3).unwrap();
        let point = Point {
            return_number: 7,
            number_of_returns: 9,
            scanner_channel: 2,
            nir: Some(12),
            extra_bytes: vec![1, 2, 3],
            ..Default::default()
        };

        let point = conform_point(point, &format);
        assert_eq!(point.return_number, 5);
        assert_eq!(point.number_of_returns, 5);
        assert_eq!(point.scanner_channel, 0);
        assert_eq!(point.gps_time, Some(0.0));
        assert!(point.color.is_some());
        assert_eq!(point.nir, None);
        assert!(point.extra_bytes.is_empty());
        assert!(point.matches(&format));
    }

    #[test]
    fn discovery_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        for name in ["b.LAZ", "a.las", "notes.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::write(nested.join("c.las"), b"").unwrap();

        let flat = discover_point_clouds(dir.path(), false).unwrap();
        let names: Vec<_> = flat
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.las", "b.LAZ"]);

        assert_eq!(discover_point_clouds(dir.path(), true).unwrap().len(), 3);
    }
}
