//! Cutting a polygon in two with a straight divider.
use crate::error::GeometryError;
use crate::tiling::transects::push_distinct;
use geo::{Contains, Coord, Line, LineString, Point, Polygon};

/// A point where the divider crosses the polygon boundary.
#[derive(Debug, Clone, Copy)]
struct Crossing {
    /// Index of the ring edge that was crossed.
    edge: usize,
    /// Position along that edge, in `[0, 1)`.
    along_edge: f64,
    coord: Coord<f64>,
}

/// Splits `polygon` along `divider` into exactly two polygons.
///
/// The divider must cross the exterior ring exactly twice. Holes are handed
/// to whichever piece contains them; a divider running through a hole is an
/// error, as is any crossing count other than two. `tile` is only used to
/// label errors.
pub fn split_polygon(
    polygon: &Polygon<f64>,
    divider: &Line<f64>,
    tile: usize,
) -> Result<(Polygon<f64>, Polygon<f64>), GeometryError> {
    for interior in polygon.interiors() {
        if !ring_crossings(interior, divider).is_empty() {
            return Err(GeometryError::SplitThroughHole { tile });
        }
    }

    let exterior = polygon.exterior();
    let crossings = ring_crossings(exterior, divider);
    let &[first, second] = crossings.as_slice() else {
        return Err(GeometryError::Split {
            tile,
            crossings: crossings.len(),
        });
    };

    let ring = &exterior.0;
    // Closed ring: the last coordinate repeats the first.
    let vertex_count = ring.len() - 1;

    let mut forward = vec![first.coord];
    for coord in &ring[first.edge + 1..=second.edge] {
        push_distinct(&mut forward, *coord);
    }
    push_distinct(&mut forward, second.coord);

    let mut backward = vec![second.coord];
    for coord in ring[second.edge + 1..vertex_count]
        .iter()
        .chain(&ring[..=first.edge])
    {
        push_distinct(&mut backward, *coord);
    }
    push_distinct(&mut backward, first.coord);

    let forward = LineString::new(forward);
    let backward = LineString::new(backward);

    let mut forward_holes = Vec::new();
    let mut backward_holes = Vec::new();
    let forward_shell = Polygon::new(forward.clone(), vec![]);
    for interior in polygon.interiors() {
        let inside_forward = interior
            .0
            .first()
            .is_some_and(|c| forward_shell.contains(&Point::from(*c)));
        if inside_forward {
            forward_holes.push(interior.clone());
        } else {
            backward_holes.push(interior.clone());
        }
    }

    Ok((
        Polygon::new(forward, forward_holes),
        Polygon::new(backward, backward_holes),
    ))
}

/// Crossings of `divider` with a closed ring, in ring order.
fn ring_crossings(ring: &LineString<f64>, divider: &Line<f64>) -> Vec<Crossing> {
    let mut crossings: Vec<Crossing> = Vec::new();
    for (edge, segment) in ring.lines().enumerate() {
        let Some((along_edge, coord)) = intersect(divider, &segment) else {
            continue;
        };
        // A crossing exactly at a vertex can be reported by both adjacent edges.
        let repeated = crossings.last().is_some_and(|last| same_point(last.coord, coord))
            || crossings.first().is_some_and(|first| same_point(first.coord, coord));
        if !repeated {
            crossings.push(Crossing {
                edge,
                along_edge,
                coord,
            });
        }
    }
    crossings.sort_by(|a, b| {
        a.edge
            .cmp(&b.edge)
            .then(a.along_edge.total_cmp(&b.along_edge))
    });
    crossings
}

/// Intersection of the divider with one ring edge.
/// Returns the position along the edge and the crossing point.
fn intersect(divider: &Line<f64>, edge: &Line<f64>) -> Option<(f64, Coord<f64>)> {
    let r = divider.delta();
    let s = edge.delta();
    let denominator = cross(r, s);
    if denominator.abs() <= f64::EPSILON * r.x.hypot(r.y) * s.x.hypot(s.y) {
        return None;
    }

    let offset = edge.start - divider.start;
    let along_divider = cross(offset, s) / denominator;
    let along_edge = cross(offset, r) / denominator;
    if !(0.0..=1.0).contains(&along_divider) || !(0.0..1.0).contains(&along_edge) {
        return None;
    }
    Some((along_edge, edge.start + s * along_edge))
}

fn cross(a: Coord<f64>, b: Coord<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

fn same_point(a: Coord<f64>, b: Coord<f64>) -> bool {
    let tolerance = 1e-9 * (1.0 + a.x.abs() + a.y.abs());
    (a.x - b.x).hypot(a.y - b.y) <= tolerance
}
