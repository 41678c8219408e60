//! Cutting the buffered centerline into consecutive tiles.
use crate::config::TilingConfig;
use crate::error::GeometryError;
use crate::progress::unit_progress_bar;
use crate::tiling::centerline::{Centerline, extract_centerline};
use crate::tiling::ribbon::buffer_centerline;
use crate::tiling::split::split_polygon;
use crate::tiling::transects::{segment_length, transects};
use constants::tiling::RELATIVE_EPSILON;
use geo::{Area, Centroid, Coord, Line, LineString, Polygon};
use log::info;
use rand::Rng;

/// Output of the full tiling pipeline.
#[derive(Debug, Clone)]
pub struct Tiling {
    pub hull: Polygon<f64>,
    pub centerline: LineString<f64>,
    /// Tiles in centerline traversal order.
    pub tiles: Vec<Polygon<f64>>,
}

/// Cut line at the end of a transect.
#[derive(Debug, Clone, Copy)]
pub struct Divider {
    pub line: Line<f64>,
    /// Last point of the transect, the divider's midpoint.
    pub origin: Coord<f64>,
    /// Unit direction of travel at `origin`.
    pub direction: Coord<f64>,
}

/// Divider perpendicular to the transect's final bearing, centred on its last point.
pub fn divider_at(transect: &LineString<f64>, length: f64) -> Option<Divider> {
    let coords = &transect.0;
    let &[.., before, origin] = coords.as_slice() else {
        return None;
    };
    let bearing = Line::new(before, origin);
    let norm = segment_length(&bearing);
    if !(norm > 0.0) {
        return None;
    }

    let direction = bearing.delta() / norm;
    let half = Coord {
        x: -direction.y,
        y: direction.x,
    } * (length / 2.0);
    Some(Divider {
        line: Line::new(origin - half, origin + half),
        origin,
        direction,
    })
}

/// One split of the ribbon. Returns the emitted tile and the new ribbon.
///
/// The larger piece stays the ribbon. On an area tie the piece ahead of the
/// divider stays, so tiles keep coming out in traversal order.
pub fn split_step(
    ribbon: &Polygon<f64>,
    divider: &Divider,
    tile: usize,
) -> Result<(Polygon<f64>, Polygon<f64>), GeometryError> {
    let (first, second) = split_polygon(ribbon, &divider.line, tile)?;
    let first_area = first.unsigned_area();
    let second_area = second.unsigned_area();

    let tolerance = RELATIVE_EPSILON * first_area.max(second_area);
    let first_stays = if (first_area - second_area).abs() <= tolerance {
        is_ahead(&first, divider)
    } else {
        first_area > second_area
    };

    Ok(if first_stays {
        (second, first)
    } else {
        (first, second)
    })
}

fn is_ahead(piece: &Polygon<f64>, divider: &Divider) -> bool {
    piece.centroid().is_some_and(|centroid| {
        let offset = centroid.0 - divider.origin;
        offset.x * divider.direction.x + offset.y * divider.direction.y > 0.0
    })
}

/// Buffers `centerline` and cuts it at the end of every transect but the last.
///
/// Only full transects exist, so the final tile runs from the last cut to
/// the end of the line and is between one and two tile lengths long.
pub fn split_into_tiles(
    centerline: &LineString<f64>,
    config: &TilingConfig,
) -> Result<Vec<Polygon<f64>>, GeometryError> {
    let ribbon = buffer_centerline(centerline, config.tile_width / 2.0)?;
    let divider_length = config.divider_length();

    let steps = transects(centerline, config.tile_length);
    let cuts = steps.len().saturating_sub(1);
    let pb = unit_progress_bar(cuts as u64 + 1, "tiles", "Splitting ribbon");

    let (mut tiles, remainder) = steps.take(cuts).enumerate().try_fold(
        (Vec::with_capacity(cuts + 1), ribbon),
        |(mut tiles, ribbon), (idx, transect)| {
            let tile = idx + 1;
            let divider = divider_at(&transect, divider_length)
                .ok_or(GeometryError::Split { tile, crossings: 0 })?;
            let (piece, ribbon) = split_step(&ribbon, &divider, tile)?;
            tiles.push(piece);
            info!("Tile number {tile} created");
            pb.inc(1);
            Ok::<_, GeometryError>((tiles, ribbon))
        },
    )?;

    tiles.push(remainder);
    info!("Tile number {} created", tiles.len());
    pb.inc(1);
    pb.finish_with_message("Ribbon split");
    Ok(tiles)
}

/// Runs the whole pipeline: sampling, hull, centerline, ribbon and splits.
pub fn create_tiles<R: Rng + ?Sized>(
    projection: &[Coord<f64>],
    config: &TilingConfig,
    rng: &mut R,
) -> Result<Tiling, GeometryError> {
    let Centerline { hull, line } = extract_centerline(projection, config, rng)?;
    let tiles = split_into_tiles(&line, config)?;
    Ok(Tiling {
        hull,
        centerline: line,
        tiles,
    })
}
