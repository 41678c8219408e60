//! Attaching predicted labels to the original test clouds.
use crate::batch::run_batch;
use crate::config::PredictionConfig;
use crate::error::{PreprocessError, Result};
use crate::laz::{
    EXTRA_BYTES_DESCRIPTOR_LEN, EXTRA_BYTES_RECORD_ID, read_point_cloud, write_point_cloud,
};
use crate::merge::discover_point_clouds;
use crate::npy::read_npy_labels;
use constants::dataset::{PREDICTION_DIMENSION, PREDICTION_SUFFIX_LEN};
use las::{Builder, Header, Vlr};
use log::info;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const EXTRA_BYTES_USER_ID: &str = "LASF_Spec";
/// Extra bytes data type code for an unsigned char.
const EXTRA_BYTES_TYPE_U8: u8 = 1;

/// Name of the cloud a prediction file belongs to: its stem minus the suffix.
pub fn source_stem(prediction: &Path) -> Result<String> {
    let stem = prediction
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| PreprocessError::Input(format!("bad file name {}", prediction.display())))?;
    let keep = stem.chars().count().checked_sub(PREDICTION_SUFFIX_LEN).filter(|&n| n > 0);
    let Some(keep) = keep else {
        return Err(PreprocessError::Input(format!(
            "prediction file {} has no name left after dropping its suffix",
            prediction.display()
        )));
    };
    Ok(stem.chars().take(keep).collect())
}

/// Descriptor of a single `u8` extra bytes field.
pub fn extra_bytes_descriptor(name: &str, description: &str) -> [u8; EXTRA_BYTES_DESCRIPTOR_LEN] {
    let mut descriptor = [0u8; EXTRA_BYTES_DESCRIPTOR_LEN];
    descriptor[2] = EXTRA_BYTES_TYPE_U8;
    copy_truncated(&mut descriptor[4..36], name);
    copy_truncated(&mut descriptor[160..192], description);
    descriptor
}

fn copy_truncated(field: &mut [u8], text: &str) {
    let len = text.len().min(field.len());
    field[..len].copy_from_slice(&text.as_bytes()[..len]);
}

/// Copy of `header` with one more `u8` extra bytes field declared.
fn header_with_label_field(header: &Header) -> Result<Header> {
    let mut builder = Builder::from(header.version());
    builder.point_format = *header.point_format();
    builder.point_format.extra_bytes += 1;
    builder.transforms = *header.transforms();
    builder.system_identifier = header.system_identifier().to_string();
    builder.generating_software = header.generating_software().to_string();
    builder.file_source_id = header.file_source_id();
    builder.evlrs = header.evlrs().clone();

    let descriptor = extra_bytes_descriptor(PREDICTION_DIMENSION, "Predicted class label");
    let mut vlrs = header.vlrs().clone();
    match vlrs.iter_mut().find(|vlr| vlr.record_id == EXTRA_BYTES_RECORD_ID) {
        Some(vlr) => vlr.data.extend_from_slice(&descriptor),
        None => vlrs.push(Vlr {
            user_id: EXTRA_BYTES_USER_ID.to_string(),
            record_id: EXTRA_BYTES_RECORD_ID,
            description: "Extra Bytes Record".to_string(),
            data: descriptor.to_vec(),
        }),
    }
    builder.vlrs = vlrs;
    Ok(builder.into_header()?)
}

/// Writes `source` to `output_dir` with a `prediction` field taken from `prediction`.
pub fn export_prediction(prediction: &Path, source: &Path, output_dir: &Path) -> Result<PathBuf> {
    let labels = read_npy_labels(prediction)?;
    let (header, mut points) = read_point_cloud(source)?;
    if labels.len() != points.len() {
        return Err(PreprocessError::Input(format!(
            "{} has {} labels but {} has {} points",
            prediction.display(),
            labels.len(),
            source.display(),
            points.len()
        )));
    }

    for (point, label) in points.iter_mut().zip(labels) {
        point.extra_bytes.push(label);
    }

    let file_name = source
        .file_name()
        .ok_or_else(|| PreprocessError::Input(format!("bad file name {}", source.display())))?;
    let output_path = output_dir.join(file_name);
    write_point_cloud(&output_path, header_with_label_field(&header)?, &points)?;
    info!(
        "Saved {} to {}/",
        file_name.to_string_lossy(),
        output_dir.display()
    );
    Ok(output_path)
}

fn is_npy_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("npy"))
}

/// Exports every prediction under `config.result_dir`. Returns the number of clouds written.
pub fn export_predictions(config: &PredictionConfig) -> Result<usize> {
    config.validate()?;
    fs::create_dir_all(&config.output_dir)
        .map_err(|e| PreprocessError::io(&config.output_dir, e))?;

    let sources: HashMap<String, PathBuf> = discover_point_clouds(&config.test_root, false)?
        .into_iter()
        .filter_map(|path| {
            let stem = path.file_stem()?.to_str()?.to_string();
            Some((stem, path))
        })
        .collect();

    let mut predictions: Vec<PathBuf> = WalkDir::new(&config.result_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_npy_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    predictions.sort();
    info!(
        "Saving {} point clouds with the predicted labels added...",
        predictions.len()
    );

    let written = run_batch(
        config.num_workers,
        &predictions,
        "predictions",
        |path: &PathBuf| path.display().to_string(),
        |path: &PathBuf| {
            let stem = source_stem(path)?;
            let source = sources.get(&stem).ok_or_else(|| {
                PreprocessError::Input(format!(
                    "no point cloud named {stem} in {}",
                    config.test_root.display()
                ))
            })?;
            export_prediction(path, source, &config.output_dir)
        },
    )?;
    Ok(written.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_is_dropped_from_stem() {
        assert_eq!(
            source_stem(Path::new("results/tile_3_pred.npy")).unwrap(),
            "tile_3"
        );
    }

    #[test]
    fn too_short_stem_is_rejected() {
        assert!(source_stem(Path::new("_pred.npy")).is_err());
    }

    #[test]
    fn descriptor_layout() {
        let descriptor = extra_bytes_descriptor("prediction", "Predicted class label");
        assert_eq!(descriptor.len(), 192);
        assert_eq!(descriptor[2], 1);
        assert_eq!(&descriptor[4..14], b"prediction");
        assert_eq!(descriptor[14], 0);
        assert_eq!(&descriptor[160..181], b"Predicted class label");
    }

    #[test]
    fn npy_extension_ignores_case() {
        assert!(is_npy_file(Path::new("a.NPY")));
        assert!(!is_npy_file(Path::new("a.npz")));
    }
}
