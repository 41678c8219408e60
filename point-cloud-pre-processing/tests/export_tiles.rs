mod common;

use common::{corridor, read_cloud, write_cloud};
use geo::{LineString, line_string};
use point_cloud_pre_processing::PreprocessError;
use point_cloud_pre_processing::config::{ExportConfig, TilingConfig};
use point_cloud_pre_processing::exporter::export_tiles;
use point_cloud_pre_processing::tile_file::{read_tile_file, write_tile_file};
use point_cloud_pre_processing::tiling::split_into_tiles;
use std::fs;

fn straight_centerline() -> LineString<f64> {
    line_string![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0)]
}

fn tiling_config() -> TilingConfig {
    TilingConfig {
        tile_length: 25.0,
        tile_width: 10.0,
        ..TilingConfig::default()
    }
}

#[test]
fn tile_ids_are_contiguous_in_traversal_order() {
    let dir = tempfile::tempdir().unwrap();
    let tiles_path = dir.path().join("tiles.geojson");

    let tiles = split_into_tiles(&straight_centerline(), &tiling_config()).unwrap();
    write_tile_file(&tiles_path, &tiles).unwrap();

    let read = read_tile_file(&tiles_path).unwrap();
    let ids: Vec<u32> = read.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[test]
fn selection_exports_only_the_chosen_tiles() {
    let dir = tempfile::tempdir().unwrap();
    let cloud_path = dir.path().join("scan.las");
    let tiles_path = dir.path().join("tiles.geojson");
    let selection_path = dir.path().join("selection.txt");
    let output_dir = dir.path().join("tiles");

    write_cloud(&cloud_path, &corridor(100, 4));
    let tiles = split_into_tiles(&straight_centerline(), &tiling_config()).unwrap();
    write_tile_file(&tiles_path, &tiles).unwrap();
    fs::write(&selection_path, "2\n4\n").unwrap();

    let config = ExportConfig {
        tiles_selection: Some(selection_path),
        num_workers: 2,
        ..ExportConfig::new(cloud_path, tiles_path, output_dir.clone())
    };
    assert_eq!(export_tiles(&config).unwrap(), 2);

    let mut names: Vec<String> = fs::read_dir(&output_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["tile_2.laz", "tile_4.laz"]);

    let second = read_cloud(&output_dir.join("tile_2.laz"));
    // 25 columns of 9 points each fall inside x in [25, 50].
    assert_eq!(second.len(), 25 * 9);
    assert!(second.iter().all(|p| p.x >= 25.0 && p.x <= 50.0));
}

#[test]
fn every_tile_is_exported_without_selection() {
    let dir = tempfile::tempdir().unwrap();
    let cloud_path = dir.path().join("scan.las");
    let tiles_path = dir.path().join("tiles.geojson");
    let output_dir = dir.path().join("out");

    let points = corridor(100, 4);
    write_cloud(&cloud_path, &points);
    let tiles = split_into_tiles(&straight_centerline(), &tiling_config()).unwrap();
    write_tile_file(&tiles_path, &tiles).unwrap();

    let config = ExportConfig {
        filename_template: "part_#.las".into(),
        num_workers: 1,
        ..ExportConfig::new(cloud_path, tiles_path, output_dir.clone())
    };
    assert_eq!(export_tiles(&config).unwrap(), 4);

    let total: usize = (1..=4)
        .map(|id| read_cloud(&output_dir.join(format!("part_{id}.las"))).len())
        .sum();
    assert_eq!(total, points.len());
}

#[test]
fn out_of_range_selection_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let cloud_path = dir.path().join("scan.las");
    let tiles_path = dir.path().join("tiles.geojson");
    let selection_path = dir.path().join("selection.txt");
    let output_dir = dir.path().join("out");

    write_cloud(&cloud_path, &corridor(100, 4));
    let tiles = split_into_tiles(&straight_centerline(), &tiling_config()).unwrap();
    write_tile_file(&tiles_path, &tiles).unwrap();
    fs::write(&selection_path, "2\n5\n").unwrap();

    let config = ExportConfig {
        tiles_selection: Some(selection_path),
        ..ExportConfig::new(cloud_path, tiles_path, output_dir.clone())
    };
    assert!(matches!(
        export_tiles(&config),
        Err(PreprocessError::Config(_))
    ));
    assert!(!output_dir.exists());
}

#[test]
fn missing_tile_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let cloud_path = dir.path().join("scan.las");
    write_cloud(&cloud_path, &corridor(10, 1));

    let config = ExportConfig::new(
        cloud_path,
        dir.path().join("missing.geojson"),
        dir.path().join("out"),
    );
    assert!(matches!(
        export_tiles(&config),
        Err(PreprocessError::TileFile { .. })
    ));
}
