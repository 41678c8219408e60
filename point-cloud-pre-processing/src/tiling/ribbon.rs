//! Flat-capped, bevel-joined buffer around the centerline.
use crate::error::GeometryError;
use crate::tiling::transects::segment_length;
use geo::{BooleanOps, Coord, Line, LineString, MultiPolygon, Polygon};

/// Buffers `line` by `half_width` on each side.
/// Ends are cut flat at the first and last vertex and outer corners are
/// bevelled, so tiles never get rounded boundaries.
pub fn buffer_centerline(
    line: &LineString<f64>,
    half_width: f64,
) -> Result<Polygon<f64>, GeometryError> {
    if !(half_width > 0.0) {
        return Err(GeometryError::Buffer(format!(
            "half width must be positive, got {half_width}"
        )));
    }

    let segments: Vec<Line<f64>> = line
        .lines()
        .filter(|segment| segment_length(segment) > 0.0)
        .collect();
    if segments.is_empty() {
        return Err(GeometryError::Buffer("centerline has no length".into()));
    }

    let mut pieces: Vec<Polygon<f64>> = segments
        .iter()
        .map(|segment| segment_rectangle(segment, half_width))
        .collect();
    pieces.extend(
        segments
            .windows(2)
            .filter_map(|pair| bevel_triangle(&pair[0], &pair[1], half_width)),
    );

    let mut pieces = pieces.into_iter();
    let first = pieces
        .next()
        .ok_or_else(|| GeometryError::Buffer("no buffer pieces".into()))?;
    let merged = pieces.fold(MultiPolygon::new(vec![first]), |acc, piece| {
        acc.union(&MultiPolygon::new(vec![piece]))
    });

    let count = merged.0.len();
    if count != 1 {
        return Err(GeometryError::Buffer(format!(
            "buffer produced {count} polygons, expected 1"
        )));
    }
    merged
        .0
        .into_iter()
        .next()
        .ok_or_else(|| GeometryError::Buffer("buffer is empty".into()))
}

fn unit_direction(segment: &Line<f64>) -> Coord<f64> {
    segment.delta() / segment_length(segment)
}

/// Left-hand normal of a unit direction.
fn left_normal(direction: Coord<f64>) -> Coord<f64> {
    Coord {
        x: -direction.y,
        y: direction.x,
    }
}

fn segment_rectangle(segment: &Line<f64>, half_width: f64) -> Polygon<f64> {
    let offset = left_normal(unit_direction(segment)) * half_width;
    Polygon::new(
        LineString::new(vec![
            segment.start - offset,
            segment.end - offset,
            segment.end + offset,
            segment.start + offset,
        ]),
        vec![],
    )
}

/// Fills the notch on the outer side of the joint between two segments.
fn bevel_triangle(
    incoming: &Line<f64>,
    outgoing: &Line<f64>,
    half_width: f64,
) -> Option<Polygon<f64>> {
    let d1 = unit_direction(incoming);
    let d2 = unit_direction(outgoing);
    let cross = d1.x * d2.y - d1.y * d2.x;
    if cross.abs() < 1e-12 {
        return None;
    }

    // A left turn opens the notch on the right side.
    let side = if cross > 0.0 { -half_width } else { half_width };
    let joint = incoming.end;
    Some(Polygon::new(
        LineString::new(vec![
            joint,
            joint + left_normal(d1) * side,
            joint + left_normal(d2) * side,
        ]),
        vec![],
    ))
}
