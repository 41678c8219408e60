mod common;

use approx::assert_relative_eq;
use common::{corridor, write_cloud};
use geo::Area;
use point_cloud_pre_processing::config::TilingConfig;
use point_cloud_pre_processing::laz::read_point_cloud;
use point_cloud_pre_processing::tile_file::{read_tile_file, write_debug_geometry, write_tile_file};
use point_cloud_pre_processing::tiling::ribbon::buffer_centerline;
use point_cloud_pre_processing::tiling::transects::{arc_length, transect_count};
use point_cloud_pre_processing::tiling::{create_tiles, project_xy};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn config() -> TilingConfig {
    TilingConfig {
        tile_length: 25.0,
        tile_width: 60.0,
        sample_divisor: 4,
        ..TilingConfig::default()
    }
}

#[test]
fn scan_is_tiled_along_its_length() {
    let dir = tempfile::tempdir().unwrap();
    let cloud_path = dir.path().join("scan.las");
    let tiles_path = dir.path().join("tiles.geojson");
    write_cloud(&cloud_path, &corridor(300, 20));

    let config = config();
    let (_, points) = read_point_cloud(&cloud_path).unwrap();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let tiling = create_tiles(&project_xy(&points), &config, &mut rng).unwrap();

    let length = arc_length(&tiling.centerline);
    assert!(length > 250.0 && length < 310.0, "centerline length {length}");
    assert_eq!(
        tiling.tiles.len(),
        transect_count(length, config.tile_length).max(1)
    );

    write_tile_file(&tiles_path, &tiling.tiles).unwrap();
    let tiles = read_tile_file(&tiles_path).unwrap();
    let ids: Vec<u32> = tiles.iter().map(|t| t.id).collect();
    let expected: Vec<u32> = (1..=tiling.tiles.len() as u32).collect();
    assert_eq!(ids, expected);

    let ribbon = buffer_centerline(&tiling.centerline, config.tile_width / 2.0).unwrap();
    let area: f64 = tiles.iter().map(|t| t.polygon.unsigned_area()).sum();
    assert_relative_eq!(area, ribbon.unsigned_area(), max_relative = 1e-6);
}

#[test]
fn same_seed_gives_the_same_tile_file() {
    let dir = tempfile::tempdir().unwrap();
    let cloud_path = dir.path().join("scan.las");
    write_cloud(&cloud_path, &corridor(200, 15));
    let (_, points) = read_point_cloud(&cloud_path).unwrap();
    let projection = project_xy(&points);

    let config = config();
    let write = |name: &str| {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let tiling = create_tiles(&projection, &config, &mut rng).unwrap();
        let path = dir.path().join(name);
        write_tile_file(&path, &tiling.tiles).unwrap();
        std::fs::read_to_string(path).unwrap()
    };
    assert_eq!(write("first.geojson"), write("second.geojson"));
}

#[test]
fn debug_geometry_is_written_next_to_the_tiles() {
    let dir = tempfile::tempdir().unwrap();
    let cloud_path = dir.path().join("scan.las");
    let debug_path = dir.path().join("debug.geojson");
    write_cloud(&cloud_path, &corridor(150, 15));

    let config = config();
    let (_, points) = read_point_cloud(&cloud_path).unwrap();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let tiling = create_tiles(&project_xy(&points), &config, &mut rng).unwrap();
    write_debug_geometry(&debug_path, &tiling.hull, &tiling.centerline).unwrap();

    let text = std::fs::read_to_string(&debug_path).unwrap();
    assert!(text.contains("\"hull\""));
    assert!(text.contains("\"centerline\""));
}
