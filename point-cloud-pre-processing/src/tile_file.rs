//! GeoJSON storage of tile polygons.
use crate::error::{PreprocessError, Result};
use geo::{Coord, LineString, Polygon};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use std::path::Path;

/// A tile polygon with its 1-based id.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub id: u32,
    pub polygon: Polygon<f64>,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type")]
enum TileCollection {
    FeatureCollection { features: Vec<TileFeature> },
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type")]
enum TileFeature {
    Feature {
        properties: TileProperties,
        geometry: TileGeometry,
    },
}

#[derive(Serialize, Deserialize)]
struct TileProperties {
    id: u32,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type")]
enum TileGeometry {
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
}

fn ring_positions(ring: &LineString<f64>) -> Vec<[f64; 2]> {
    ring.0.iter().map(|c| [c.x, c.y]).collect()
}

fn polygon_positions(polygon: &Polygon<f64>) -> Vec<Vec<[f64; 2]>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(ring_positions)
        .collect()
}

fn positions_polygon(rings: Vec<Vec<[f64; 2]>>) -> Option<Polygon<f64>> {
    let mut rings = rings
        .into_iter()
        .map(|ring| LineString::new(ring.into_iter().map(|[x, y]| Coord { x, y }).collect()));
    let exterior = rings.next()?;
    if exterior.0.len() < 4 {
        return None;
    }
    Some(Polygon::new(exterior, rings.collect()))
}

/// Writes `tiles` as a feature collection with sequential ids starting at 1.
pub fn write_tile_file(path: &Path, tiles: &[Polygon<f64>]) -> Result<()> {
    let features = tiles
        .iter()
        .zip(1u32..)
        .map(|(polygon, id)| TileFeature::Feature {
            properties: TileProperties { id },
            geometry: TileGeometry::Polygon {
                coordinates: polygon_positions(polygon),
            },
        })
        .collect();

    let json = serde_json::to_string_pretty(&TileCollection::FeatureCollection { features })?;
    fs::write(path, json).map_err(|e| PreprocessError::io(path, e))?;
    info!("Saved {} tiles to {}", tiles.len(), path.display());
    Ok(())
}

/// Reads every tile of a tile file, in file order.
/// A missing file, an unreadable file or one without tiles is an error.
pub fn read_tile_file(path: &Path) -> Result<Vec<Tile>> {
    let tile_error = |message: String| PreprocessError::TileFile {
        path: path.to_path_buf(),
        message,
    };

    if !path.is_file() {
        return Err(tile_error("file does not exist".into()));
    }
    let text = fs::read_to_string(path).map_err(|e| PreprocessError::io(path, e))?;
    let TileCollection::FeatureCollection { features } = serde_json::from_str(&text)
        .map_err(|e| tile_error(format!("not a tile collection: {e}")))?;
    if features.is_empty() {
        return Err(tile_error("file contains no tiles".into()));
    }

    features
        .into_iter()
        .enumerate()
        .map(|(idx, feature)| {
            let TileFeature::Feature {
                properties,
                geometry: TileGeometry::Polygon { coordinates },
            } = feature;
            let polygon = positions_polygon(coordinates)
                .ok_or_else(|| tile_error(format!("feature {} has an invalid polygon", idx + 1)))?;
            Ok(Tile {
                id: properties.id,
                polygon,
            })
        })
        .collect()
}

/// Dumps the hull and centerline for visual inspection.
pub fn write_debug_geometry(
    path: &Path,
    hull: &Polygon<f64>,
    centerline: &LineString<f64>,
) -> Result<()> {
    let geometry = json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "name": "hull" },
                "geometry": { "type": "Polygon", "coordinates": polygon_positions(hull) }
            },
            {
                "type": "Feature",
                "properties": { "name": "centerline" },
                "geometry": { "type": "LineString", "coordinates": ring_positions(centerline) }
            }
        ]
    });
    fs::write(path, geometry.to_string()).map_err(|e| PreprocessError::io(path, e))?;
    info!("Saved hull and centerline to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn square(offset: f64) -> Polygon<f64> {
        polygon![
            (x: offset, y: 0.0),
            (x: offset + 10.0, y: 0.0),
            (x: offset + 10.0, y: 10.0),
            (x: offset, y: 10.0),
        ]
    }

    #[test]
    fn tiles_are_numbered_from_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiles.geojson");
        let tiles = vec![square(0.0), square(10.0), square(20.0)];

        write_tile_file(&path, &tiles).unwrap();
        let read = read_tile_file(&path).unwrap();

        let ids: Vec<u32> = read.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(read[1].polygon, tiles[1]);
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_tile_file(&dir.path().join("absent.geojson"));
        assert!(matches!(result, Err(PreprocessError::TileFile { .. })));
    }

    #[test]
    fn empty_collection_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiles.geojson");
        write_tile_file(&path, &[]).unwrap();
        assert!(matches!(
            read_tile_file(&path),
            Err(PreprocessError::TileFile { .. })
        ));
    }

    #[test]
    fn foreign_json_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiles.geojson");
        fs::write(&path, r#"{"type": "Point", "coordinates": [1, 2]}"#).unwrap();
        assert!(matches!(
            read_tile_file(&path),
            Err(PreprocessError::TileFile { .. })
        ));
    }
}
