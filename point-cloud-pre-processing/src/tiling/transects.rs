//! Fixed-length transects walked along a centerline.
use constants::tiling::RELATIVE_EPSILON;
use geo::{Coord, Line, LineString};

/// Euclidean length of a single segment.
pub fn segment_length(segment: &Line<f64>) -> f64 {
    segment.dx().hypot(segment.dy())
}

/// Total arc length of a polyline.
pub fn arc_length(line: &LineString<f64>) -> f64 {
    line.lines().map(|segment| segment_length(&segment)).sum()
}

/// Number of full transects of length `step` that fit in `length`.
/// A relative tolerance keeps exact multiples such as 100 / 25 from losing one.
pub fn transect_count(length: f64, step: f64) -> usize {
    if !(length > 0.0) || !(step > 0.0) {
        return 0;
    }
    ((length / step) * (1.0 + RELATIVE_EPSILON)).floor() as usize
}

/// Part of `line` between arc-length positions `start` and `end`.
/// Keeps every interior vertex so the result follows the original shape.
pub fn substring(line: &LineString<f64>, start: f64, end: f64) -> LineString<f64> {
    let mut coords: Vec<Coord<f64>> = Vec::new();
    let mut travelled = 0.0;

    for segment in line.lines() {
        let length = segment_length(&segment);
        let segment_start = travelled;
        travelled += length;

        if length <= 0.0 || travelled < start {
            continue;
        }
        if segment_start > end {
            break;
        }

        let from = ((start - segment_start) / length).clamp(0.0, 1.0);
        let to = ((end - segment_start) / length).clamp(0.0, 1.0);
        push_distinct(&mut coords, interpolate(&segment, from));
        push_distinct(&mut coords, interpolate(&segment, to));
    }

    LineString::new(coords)
}

fn interpolate(segment: &Line<f64>, fraction: f64) -> Coord<f64> {
    segment.start + segment.delta() * fraction
}

/// Appends a coordinate unless it repeats the previous one.
pub(crate) fn push_distinct(coords: &mut Vec<Coord<f64>>, coord: Coord<f64>) {
    if let Some(last) = coords.last() {
        let tolerance = RELATIVE_EPSILON * (1.0 + last.x.abs() + last.y.abs());
        if (last.x - coord.x).hypot(last.y - coord.y) <= tolerance {
            return;
        }
    }
    coords.push(coord);
}

/// Lazy sequence of transects along a centerline.
/// Yields exactly `floor(length / step)` full-length transects; the shorter
/// remainder at the end of the line is never produced.
#[derive(Debug, Clone)]
pub struct Transects<'a> {
    line: &'a LineString<f64>,
    step: f64,
    next: usize,
    count: usize,
}

impl<'a> Transects<'a> {
    pub fn new(line: &'a LineString<f64>, step: f64) -> Self {
        Self {
            line,
            step,
            next: 0,
            count: transect_count(arc_length(line), step),
        }
    }
}

impl Iterator for Transects<'_> {
    type Item = LineString<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let start = self.next as f64 * self.step;
        self.next += 1;
        Some(substring(self.line, start, start + self.step))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Transects<'_> {}

/// Transects of length `step` covering `line` from its start.
pub fn transects(line: &LineString<f64>, step: f64) -> Transects<'_> {
    Transects::new(line, step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::line_string;

    #[test]
    fn counts_full_transects_only() {
        assert_eq!(transect_count(100.0, 25.0), 4);
        assert_eq!(transect_count(110.0, 25.0), 4);
        assert_eq!(transect_count(24.9, 25.0), 0);
        assert_eq!(transect_count(0.3, 0.1), 3);
        assert_eq!(transect_count(0.0, 25.0), 0);
    }

    #[test]
    fn straight_line_yields_equal_transects() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0)];
        let pieces: Vec<_> = transects(&line, 25.0).collect();

        assert_eq!(pieces.len(), 4);
        for (idx, piece) in pieces.iter().enumerate() {
            assert_relative_eq!(arc_length(piece), 25.0, epsilon = 1e-9);
            assert_relative_eq!(piece.0[0].x, idx as f64 * 25.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn substring_keeps_interior_vertices() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0)];
        let piece = substring(&line, 5.0, 15.0);

        assert_eq!(
            piece.0,
            vec![
                Coord { x: 5.0, y: 0.0 },
                Coord { x: 10.0, y: 0.0 },
                Coord { x: 10.0, y: 5.0 }
            ]
        );
    }

    #[test]
    fn substring_ending_on_a_vertex_has_no_duplicate() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0)];
        let piece = substring(&line, 0.0, 10.0);
        assert_eq!(piece.0.len(), 2);
        assert_eq!(piece.0[1], Coord { x: 10.0, y: 0.0 });
    }

    #[test]
    fn short_line_has_no_transects() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)];
        assert_eq!(transects(&line, 25.0).count(), 0);
    }

    #[test]
    fn iteration_is_restartable() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 30.0, y: 40.0)];
        let first: Vec<_> = transects(&line, 10.0).collect();
        let second: Vec<_> = transects(&line, 10.0).collect();
        assert_eq!(first, second);
        assert_eq!(transects(&line, 10.0).len(), 5);
    }
}
