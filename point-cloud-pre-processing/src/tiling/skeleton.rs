//! Chordal-axis skeleton of a hull polygon, reduced to a single centerline.
//!
//! The hull boundary is densified and triangulated with its rings as
//! constraint edges, so the triangles inside the hull tile it exactly and
//! their dual graph is a tree. Triangles are joined through the midpoints of
//! the edges they share, which traces the medial trajectory of the shape.
//! Short side branches are pruned, ends running into hull corners are
//! trimmed, and the simplified and smoothed path is extended to the hull
//! boundary.
use crate::error::GeometryError;
use crate::tiling::transects::segment_length;
use geo::{
    ChaikinSmoothing, Contains, Coord, Distance, Euclidean, Line, LineString, Point, Polygon,
    Simplify,
};
use log::{debug, warn};
use spade::{ConstrainedDelaunayTriangulation, Point2, Triangulation};
use std::collections::{BTreeSet, HashMap, HashSet};

type HullTriangulation = ConstrainedDelaunayTriangulation<Point2<f64>>;

/// Parameters of the skeleton reduction.
#[derive(Debug, Clone, Copy)]
pub struct SkeletonParams {
    /// Maximum spacing of boundary vertices fed to the triangulation.
    pub densify_distance: f64,
    /// Leaf branches shorter than this are pruned. Also caps how much of
    /// each end is trimmed.
    pub min_branch_length: f64,
    /// Douglas-Peucker tolerance applied to the pruned path.
    pub simplify_tolerance: f64,
    /// Chaikin passes applied after simplification.
    pub smoothing_iterations: usize,
    /// Ends are trimmed until their clearance reaches this fraction of the
    /// median clearance of the path.
    pub end_clearance_fraction: f64,
}

/// Derives a single centerline from `hull`.
pub fn centerline_from_hull(
    hull: &Polygon<f64>,
    params: &SkeletonParams,
) -> Result<LineString<f64>, GeometryError> {
    let (boundary, constraints) = densified_boundary(hull, params.densify_distance);
    if boundary.len() < 3 {
        return Err(GeometryError::DegenerateHull(format!(
            "{} boundary vertices",
            boundary.len()
        )));
    }

    let mut conflicts = 0usize;
    let triangulation =
        HullTriangulation::try_bulk_load_cdt(boundary, constraints, |_| conflicts += 1)
            .map_err(|e| GeometryError::DegenerateHull(format!("triangulation failed: {e:?}")))?;
    if conflicts > 0 {
        warn!("{conflicts} hull edges intersect other hull edges and were not enforced");
    }

    let mut graph = SkeletonGraph::chordal_axis(&triangulation, hull);
    debug!(
        "Skeleton graph: {} nodes, {} edges",
        graph.nodes.len(),
        graph.edge_count()
    );

    let pruned = graph.prune_branches(params.min_branch_length);
    debug!("Pruned {pruned} short skeleton branches");

    let path = graph.single_path()?;
    let path = trim_corner_runs(
        path,
        hull,
        params.end_clearance_fraction,
        params.min_branch_length,
    );
    let line = LineString::new(path)
        .simplify(&params.simplify_tolerance)
        .chaikin_smoothing(params.smoothing_iterations);
    Ok(extend_to_boundary(line, hull))
}

/// Boundary vertices of every ring, spaced at most `distance` apart, and the
/// ring edges joining them.
fn densified_boundary(hull: &Polygon<f64>, distance: f64) -> (Vec<Point2<f64>>, Vec<[usize; 2]>) {
    let mut vertices = Vec::new();
    let mut edges = Vec::new();
    for ring in std::iter::once(hull.exterior()).chain(hull.interiors()) {
        let first = vertices.len();
        for segment in ring.lines() {
            let length = segment_length(&segment);
            if !(length > 0.0) {
                continue;
            }
            let steps = if distance > 0.0 {
                (length / distance).ceil().max(1.0) as usize
            } else {
                1
            };
            for step in 0..steps {
                let c = segment.start + segment.delta() * (step as f64 / steps as f64);
                vertices.push(Point2::new(c.x, c.y));
            }
        }

        let last = vertices.len();
        if last - first >= 3 {
            edges.extend((first..last).map(|idx| {
                let next = if idx + 1 == last { first } else { idx + 1 };
                [idx, next]
            }));
        }
    }
    (vertices, edges)
}

fn to_coord(point: Point2<f64>) -> Coord<f64> {
    Coord {
        x: point.x,
        y: point.y,
    }
}

/// Distance from `coord` to the nearest ring of `hull`.
fn boundary_clearance(coord: Coord<f64>, hull: &Polygon<f64>) -> f64 {
    let point = Point::from(coord);
    std::iter::once(hull.exterior())
        .chain(hull.interiors())
        .map(|ring| Euclidean::distance(&point, ring))
        .fold(f64::INFINITY, f64::min)
}

/// Drops the ends of `path` that run off into hull corners.
///
/// Near a corner the clearance to the boundary shrinks towards zero, while
/// along the trajectory it stays close to half the corridor width. Each end
/// is cut back to its first vertex whose clearance reaches `fraction` of the
/// median; an end that does not recover within `max_trim` is kept whole.
fn trim_corner_runs(
    path: Vec<Coord<f64>>,
    hull: &Polygon<f64>,
    fraction: f64,
    max_trim: f64,
) -> Vec<Coord<f64>> {
    if path.len() < 3 {
        return path;
    }

    let clearance: Vec<f64> = path.iter().map(|c| boundary_clearance(*c, hull)).collect();
    let mut sorted = clearance.clone();
    sorted.sort_by(f64::total_cmp);
    let threshold = fraction * sorted[sorted.len() / 2];
    if !(threshold > 0.0) {
        return path;
    }

    let vertices = || path.iter().copied().zip(clearance.iter().copied());
    let head = corner_run(vertices(), threshold, max_trim);
    let tail = corner_run(vertices().rev(), threshold, max_trim);
    if head + tail + 2 > path.len() {
        return path;
    }

    debug!("Trimmed {head} and {tail} skeleton vertices running into hull corners");
    path[head..path.len() - tail].to_vec()
}

/// Number of leading vertices before the first one with enough clearance,
/// or zero when that vertex lies more than `max_trim` along the path.
fn corner_run(
    vertices: impl Iterator<Item = (Coord<f64>, f64)>,
    threshold: f64,
    max_trim: f64,
) -> usize {
    let mut travelled = 0.0;
    let mut previous: Option<Coord<f64>> = None;
    for (idx, (coord, clearance)) in vertices.enumerate() {
        if let Some(previous) = previous {
            travelled += segment_length(&Line::new(previous, coord));
            if travelled > max_trim {
                return 0;
            }
        }
        if clearance >= threshold {
            return idx;
        }
        previous = Some(coord);
    }
    0
}

/// Undirected graph of skeleton nodes.
#[derive(Debug, Default)]
struct SkeletonGraph {
    nodes: Vec<Coord<f64>>,
    adjacency: Vec<BTreeSet<usize>>,
}

/// Leaf branch hanging off a junction.
#[derive(Debug)]
struct Branch {
    /// Leaf first, junction last.
    nodes: Vec<usize>,
    length: f64,
}

impl SkeletonGraph {
    /// Builds the chordal axis of the triangles lying inside `hull`.
    fn chordal_axis(triangulation: &HullTriangulation, hull: &Polygon<f64>) -> Self {
        let inside: HashSet<usize> = triangulation
            .inner_faces()
            .filter(|face| {
                let centroid = face.center();
                hull.contains(&Point::new(centroid.x, centroid.y))
            })
            .map(|face| face.fix().index())
            .collect();

        let mut graph = SkeletonGraph::default();
        let mut midpoint_nodes: HashMap<(usize, usize), usize> = HashMap::new();

        for face in triangulation.inner_faces() {
            if !inside.contains(&face.fix().index()) {
                continue;
            }

            let mut shared = Vec::with_capacity(3);
            for edge in face.adjacent_edges() {
                let neighbour_inside = edge
                    .rev()
                    .face()
                    .as_inner()
                    .is_some_and(|neighbour| inside.contains(&neighbour.fix().index()));
                if !neighbour_inside {
                    continue;
                }

                let from = edge.from();
                let to = edge.to();
                let a = from.fix().index();
                let b = to.fix().index();
                let key = (a.min(b), a.max(b));
                let node = *midpoint_nodes.entry(key).or_insert_with(|| {
                    let midpoint = (to_coord(from.position()) + to_coord(to.position())) / 2.0;
                    graph.add_node(midpoint)
                });
                shared.push(node);
            }

            match shared.as_slice() {
                &[a, b] => graph.connect(a, b),
                &[a, b, c] => {
                    let junction = graph.add_node(to_coord(face.center()));
                    graph.connect(junction, a);
                    graph.connect(junction, b);
                    graph.connect(junction, c);
                }
                // Terminal triangles end a branch at their single shared edge.
                _ => {}
            }
        }
        graph
    }

    fn add_node(&mut self, coord: Coord<f64>) -> usize {
        self.nodes.push(coord);
        self.adjacency.push(BTreeSet::new());
        self.nodes.len() - 1
    }

    fn connect(&mut self, a: usize, b: usize) {
        if a != b {
            self.adjacency[a].insert(b);
            self.adjacency[b].insert(a);
        }
    }

    fn disconnect(&mut self, a: usize, b: usize) {
        self.adjacency[a].remove(&b);
        self.adjacency[b].remove(&a);
    }

    fn degree(&self, node: usize) -> usize {
        self.adjacency[node].len()
    }

    fn edge_count(&self) -> usize {
        self.adjacency.iter().map(BTreeSet::len).sum::<usize>() / 2
    }

    fn distance(&self, a: usize, b: usize) -> f64 {
        segment_length(&Line::new(self.nodes[a], self.nodes[b]))
    }

    /// Repeatedly removes the shortest leaf branch below `min_length`.
    /// Only branches ending at a junction are candidates, so a plain path is
    /// never eaten away. Returns the number of branches removed.
    fn prune_branches(&mut self, min_length: f64) -> usize {
        let mut removed = 0;
        loop {
            let shortest = self
                .leaf_branches()
                .into_iter()
                .filter(|branch| branch.length < min_length)
                .min_by(|a, b| a.length.total_cmp(&b.length));

            let Some(branch) = shortest else {
                return removed;
            };
            for pair in branch.nodes.windows(2) {
                self.disconnect(pair[0], pair[1]);
            }
            removed += 1;
        }
    }

    fn leaf_branches(&self) -> Vec<Branch> {
        let mut branches = Vec::new();
        for leaf in (0..self.nodes.len()).filter(|&n| self.degree(n) == 1) {
            let mut nodes = vec![leaf];
            let mut length = 0.0;
            let mut previous = leaf;
            let mut current = *self.adjacency[leaf].iter().next().unwrap_or(&leaf);

            loop {
                length += self.distance(previous, current);
                nodes.push(current);
                if self.degree(current) != 2 {
                    break;
                }
                let next = self.adjacency[current]
                    .iter()
                    .copied()
                    .find(|&n| n != previous);
                match next {
                    Some(next) => {
                        previous = current;
                        current = next;
                    }
                    None => break,
                }
            }

            if self.degree(current) >= 3 {
                branches.push(Branch { nodes, length });
            }
        }
        branches
    }

    /// Walks the graph as one simple path, failing on anything else.
    fn single_path(&self) -> Result<Vec<Coord<f64>>, GeometryError> {
        let active: Vec<usize> = (0..self.nodes.len())
            .filter(|&n| self.degree(n) > 0)
            .collect();
        let Some(&seed) = active.first() else {
            return Err(GeometryError::EmptyCenterline);
        };

        let components = self.component_count(&active);
        if components > 1 {
            return Err(GeometryError::MultiComponentCenterline(format!(
                "{components} disconnected parts"
            )));
        }

        let junctions = active.iter().filter(|&&n| self.degree(n) > 2).count();
        if junctions > 0 {
            return Err(GeometryError::MultiComponentCenterline(format!(
                "{junctions} branch junctions remain after pruning"
            )));
        }

        let ends: Vec<usize> = active
            .iter()
            .copied()
            .filter(|&n| self.degree(n) == 1)
            .collect();
        let Some(&start) = ends.first() else {
            debug!("Skeleton seeded at node {seed} forms a loop");
            return Err(GeometryError::MultiComponentCenterline(
                "skeleton forms a closed loop".into(),
            ));
        };

        let mut path = vec![self.nodes[start]];
        let mut previous = start;
        let mut current = start;
        while let Some(next) = self.adjacency[current]
            .iter()
            .copied()
            .find(|&n| n != previous)
        {
            path.push(self.nodes[next]);
            previous = current;
            current = next;
        }
        Ok(path)
    }

    fn component_count(&self, active: &[usize]) -> usize {
        let mut seen = vec![false; self.nodes.len()];
        let mut components = 0;
        for &node in active {
            if seen[node] {
                continue;
            }
            components += 1;
            let mut stack = vec![node];
            seen[node] = true;
            while let Some(current) = stack.pop() {
                for &next in &self.adjacency[current] {
                    if !seen[next] {
                        seen[next] = true;
                        stack.push(next);
                    }
                }
            }
        }
        components
    }
}

/// Extends both ends of `line` along their terminal direction to the hull boundary.
fn extend_to_boundary(line: LineString<f64>, hull: &Polygon<f64>) -> LineString<f64> {
    let mut coords = line.0;
    if coords.len() < 2 {
        return LineString::new(coords);
    }

    let last = coords.len() - 1;
    if let Some(end) = ray_exit(coords[last - 1], coords[last], hull) {
        coords.push(end);
    }
    if let Some(start) = ray_exit(coords[1], coords[0], hull) {
        coords.insert(0, start);
    }
    LineString::new(coords)
}

/// Nearest boundary point hit by the ray from `tip` pointing away from `behind`.
fn ray_exit(behind: Coord<f64>, tip: Coord<f64>, hull: &Polygon<f64>) -> Option<Coord<f64>> {
    let direction = tip - behind;
    if direction.x == 0.0 && direction.y == 0.0 {
        return None;
    }

    let mut nearest: Option<(f64, Coord<f64>)> = None;
    for ring in std::iter::once(hull.exterior()).chain(hull.interiors()) {
        for edge in ring.lines() {
            let s = edge.delta();
            let denominator = direction.x * s.y - direction.y * s.x;
            if denominator == 0.0 {
                continue;
            }
            let offset = edge.start - tip;
            let along_ray = (offset.x * s.y - offset.y * s.x) / denominator;
            let along_edge = (offset.x * direction.y - offset.y * direction.x) / denominator;
            // The tip itself may sit on the boundary; require real progress.
            if along_ray <= 1e-9 || !(0.0..=1.0).contains(&along_edge) {
                continue;
            }
            if nearest.is_none_or(|(best, _)| along_ray < best) {
                nearest = Some((along_ray, tip + direction * along_ray));
            }
        }
    }
    nearest.map(|(_, coord)| coord)
}
