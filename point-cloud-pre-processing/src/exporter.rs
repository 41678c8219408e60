//! Cropping a point cloud to tile footprints.
use crate::batch::run_batch;
use crate::config::ExportConfig;
use crate::error::{PreprocessError, Result};
use crate::laz::{read_point_cloud, write_point_cloud};
use crate::selection::{read_selection, select_tiles};
use crate::tile_file::{Tile, read_tile_file};
use geo::{BoundingRect, Intersects, Polygon};
use las::Point;
use log::{info, warn};
use std::fs;

/// Points whose (x, y) lies inside or on the boundary of `polygon`.
pub fn crop_points(points: &[Point], polygon: &Polygon<f64>) -> Vec<Point> {
    let Some(bounds) = polygon.bounding_rect() else {
        return Vec::new();
    };
    let (min, max) = (bounds.min(), bounds.max());

    points
        .iter()
        .filter(|p| p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y)
        .filter(|p| polygon.intersects(&geo::Point::new(p.x, p.y)))
        .cloned()
        .collect()
}

/// Crops the source cloud to every selected tile and writes one file per tile.
/// Returns the number of files written.
pub fn export_tiles(config: &ExportConfig) -> Result<usize> {
    config.validate()?;

    let tiles = read_tile_file(&config.tiles_path)?;
    let selection = config
        .tiles_selection
        .as_deref()
        .map(read_selection)
        .transpose()?;
    let selected = select_tiles(&tiles, selection.as_deref())?;
    info!(
        "Exporting {} of {} tiles from {}",
        selected.len(),
        tiles.len(),
        config.input_path.display()
    );

    let (header, points) = read_point_cloud(&config.input_path)?;
    fs::create_dir_all(&config.output_dir)
        .map_err(|e| PreprocessError::io(&config.output_dir, e))?;

    let written = run_batch(
        config.num_workers,
        &selected,
        "tiles",
        |tile: &&Tile| format!("tile {}", tile.id),
        |tile: &&Tile| {
            let cropped = crop_points(&points, &tile.polygon);
            if cropped.is_empty() {
                warn!("Tile {} contains no points", tile.id);
            }
            let output_path = config.tile_output_path(tile.id);
            write_point_cloud(&output_path, header.clone(), &cropped)?;
            info!(
                "Tile {} written to {} ({} points)",
                tile.id,
                output_path.display(),
                cropped.len()
            );
            Ok(())
        },
    )?;
    Ok(written.len())
}
