mod common;

use common::{corridor, read_cloud, write_cloud};
use las::Reader;
use point_cloud_pre_processing::PreprocessError;
use point_cloud_pre_processing::config::MergeConfig;
use point_cloud_pre_processing::merge::merge_point_clouds;
use std::fs;

#[test]
fn merges_nested_files_into_one_cloud() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input");
    fs::create_dir_all(input.join("nested")).unwrap();
    write_cloud(&input.join("a.las"), &corridor(10, 4));
    write_cloud(&input.join("nested").join("b.LAS"), &corridor(5, 2));
    fs::write(input.join("readme.txt"), "not a cloud").unwrap();

    let output = dir.path().join("merged").join("all.las");
    let config = MergeConfig::new(input, output.clone());
    assert_eq!(merge_point_clouds(&config).unwrap(), 90 + 25);

    let reader = Reader::from_path(&output).unwrap();
    assert_eq!(reader.header().number_of_points(), 115);
    assert!(reader.header().point_format().has_color);
    assert!(reader.header().point_format().has_gps_time);

    let points = read_cloud(&output);
    assert!(points.iter().all(|p| p.color.is_some() && p.gps_time.is_some()));
}

#[test]
fn sampling_keeps_the_rounded_fraction_per_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input");
    fs::create_dir_all(&input).unwrap();
    write_cloud(&input.join("a.las"), &corridor(20, 2)); // 100 points
    write_cloud(&input.join("b.las"), &corridor(10, 2)); // 50 points

    let output = dir.path().join("sampled.las");
    let config = MergeConfig {
        sample_prop: 4.0,
        ..MergeConfig::new(input, output.clone())
    };
    // round(100 / 4) + round(50 / 4)
    assert_eq!(merge_point_clouds(&config).unwrap(), 25 + 13);
    assert_eq!(read_cloud(&output).len(), 38);
}

#[test]
fn same_seed_selects_the_same_points() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input");
    fs::create_dir_all(&input).unwrap();
    write_cloud(&input.join("a.las"), &corridor(40, 3));

    let run = |name: &str| {
        let output = dir.path().join(name);
        let config = MergeConfig {
            sample_prop: 3.0,
            ..MergeConfig::new(input.clone(), output.clone())
        };
        merge_point_clouds(&config).unwrap();
        read_cloud(&output)
            .into_iter()
            .map(|p| (p.x, p.y))
            .collect::<Vec<_>>()
    };
    assert_eq!(run("first.las"), run("second.las"));
}

#[test]
fn empty_directory_is_an_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = MergeConfig::new(dir.path().to_path_buf(), dir.path().join("out.las"));
    assert!(matches!(
        merge_point_clouds(&config),
        Err(PreprocessError::Input(_))
    ));
}
