//! Seeded sampling, concave hull and centerline extraction.
use crate::config::TilingConfig;
use crate::error::GeometryError;
use crate::tiling::skeleton::{SkeletonParams, centerline_from_hull};
use crate::tiling::transects::arc_length;
use constants::tiling::{
    END_CLEARANCE_FRACTION, SKELETON_SIMPLIFY_FACTOR, SKELETON_SMOOTHING_ITERATIONS,
};
use geo::{Area, ConcaveHull, Coord, LineString, MultiPoint, Point, Polygon};
use log::{debug, info};
use rand::Rng;

/// Hull and centerline derived from a point projection.
#[derive(Debug, Clone)]
pub struct Centerline {
    pub hull: Polygon<f64>,
    pub line: LineString<f64>,
}

/// Planar (x, y) projection of a point cloud.
pub fn project_xy(points: &[las::Point]) -> Vec<Coord<f64>> {
    points.iter().map(|p| Coord { x: p.x, y: p.y }).collect()
}

/// Draws `round(n / divisor)` distinct points, kept in their original order.
pub fn sample_projection<R: Rng + ?Sized>(
    points: &[Coord<f64>],
    divisor: usize,
    rng: &mut R,
) -> Result<Vec<Coord<f64>>, GeometryError> {
    let total = points.len();
    if divisor == 0 || total < divisor {
        return Err(GeometryError::SampleTooSmall {
            points: total,
            divisor,
        });
    }

    let amount = ((total as f64 / divisor as f64).round() as usize).clamp(1, total);
    let mut indices = rand::seq::index::sample(rng, total, amount).into_vec();
    indices.sort_unstable();
    Ok(indices.into_iter().map(|idx| points[idx]).collect())
}

/// Concave hull of the sampled points.
pub fn concave_hull(sample: &[Coord<f64>], concavity: f64) -> Result<Polygon<f64>, GeometryError> {
    if sample.len() < 3 {
        return Err(GeometryError::DegenerateHull(format!(
            "{} sample points, need at least 3",
            sample.len()
        )));
    }

    let points: MultiPoint<f64> = sample.iter().map(|c| Point::from(*c)).collect();
    let hull = points.concave_hull(concavity);
    let area = hull.unsigned_area();
    if hull.exterior().0.len() < 4 || !(area > 0.0) {
        return Err(GeometryError::DegenerateHull(format!(
            "hull has {} vertices and area {area}",
            hull.exterior().0.len()
        )));
    }
    Ok(hull)
}

/// Samples the projection, builds its hull and reduces the hull to a centerline.
pub fn extract_centerline<R: Rng + ?Sized>(
    points: &[Coord<f64>],
    config: &TilingConfig,
    rng: &mut R,
) -> Result<Centerline, GeometryError> {
    let sample = sample_projection(points, config.sample_divisor, rng)?;
    info!(
        "Sampled {} of {} points for the concave hull",
        sample.len(),
        points.len()
    );

    let hull = concave_hull(&sample, config.concavity)?;
    debug!(
        "Hull: {} vertices, {} holes, area {:.1}",
        hull.exterior().0.len(),
        hull.interiors().len(),
        hull.unsigned_area()
    );

    let params = SkeletonParams {
        densify_distance: config.tile_length,
        min_branch_length: config.min_branch_length(),
        simplify_tolerance: SKELETON_SIMPLIFY_FACTOR * config.tile_length,
        smoothing_iterations: SKELETON_SMOOTHING_ITERATIONS,
        end_clearance_fraction: END_CLEARANCE_FRACTION,
    };
    let line = centerline_from_hull(&hull, &params)?;
    if line.0.len() < 2 || !(arc_length(&line) > 0.0) {
        return Err(GeometryError::EmptyCenterline);
    }
    info!(
        "Centerline: {} vertices, length {:.1}",
        line.0.len(),
        arc_length(&line)
    );

    Ok(Centerline { hull, line })
}
