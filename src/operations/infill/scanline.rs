use tracing::trace;

use crate::geometry::Aabb;
use crate::math::linear_alg_2d::closest_on_segment;
use crate::math::{Coord, Point, PointMatrix, Polygon};

use super::zigzag::ZigzagConnectorProcessor;

/// Identifies a boundary edge: edge `edge` of polygon `polygon` runs from
/// vertex `edge` to vertex `edge + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeRef {
    pub polygon: usize,
    pub edge: usize,
}

/// One piece of a scan line inside the region, with the boundary edges its
/// two ends lie on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSegment {
    pub start: Point,
    pub end: Point,
    pub start_edge: EdgeRef,
    pub end_edge: EdgeRef,
}

#[derive(Debug, Clone, Copy)]
struct Crossing {
    x: Coord,
    edge: EdgeRef,
}

/// Cuts a region with a family of parallel lines.
///
/// The region is rotated by `-angle` so that the lines are horizontal at
/// `y = k * line_distance + phase`, where the phase puts a line half a
/// spacing past `shift`. An edge crosses line `y` when
/// `min(y0, y1) < y <= max(y0, y1)`, which counts a vertex lying exactly on
/// a line once. Crossings on each line are paired inside-out by the
/// even-odd rule; pieces shorter than `min_length` are dropped.
///
/// Rotating back rounds, so every end is put back onto its boundary edge.
#[derive(Debug)]
pub struct ScanlineSweep<'a> {
    outline: &'a [Polygon],
    line_distance: Coord,
    angle: f64,
    shift: Coord,
    min_length: Coord,
}

impl<'a> ScanlineSweep<'a> {
    /// Creates a sweep over `outline` with lines at `angle` degrees.
    #[must_use]
    pub fn new(
        outline: &'a [Polygon],
        line_distance: Coord,
        angle: f64,
        shift: Coord,
        min_length: Coord,
    ) -> Self {
        Self {
            outline,
            line_distance,
            angle,
            shift,
            min_length,
        }
    }

    /// Runs the sweep, reporting the boundary walk to `processor`.
    ///
    /// Returns the scan segments in region coordinates, ordered by line and
    /// then along the line.
    pub fn execute(&self, processor: &mut dyn ZigzagConnectorProcessor) -> Vec<ScanSegment> {
        let d = self.line_distance;
        if d <= 0 {
            return Vec::new();
        }
        let matrix = PointMatrix::new(self.angle);
        let rotated = matrix.apply_all(self.outline);
        let Some(bounds) = Aabb::from_rings(&rotated) else {
            return Vec::new();
        };
        let phase = (self.shift + d / 2).rem_euclid(d);
        let first_line = (bounds.min.y - phase).div_euclid(d);
        let last_line = (bounds.max.y - phase).div_euclid(d);
        let Ok(line_count) = usize::try_from(last_line - first_line + 1) else {
            return Vec::new();
        };
        let mut cut_list: Vec<Vec<Crossing>> = vec![Vec::new(); line_count];

        for (polygon, ring) in rotated.iter().enumerate() {
            let n = ring.len();
            if n < 3 {
                continue;
            }
            processor.register_vertex(ring[0]);
            for edge in 0..n {
                let p0 = ring[edge];
                let p1 = ring[(edge + 1) % n];
                if p0.y != p1.y {
                    for k in crossed_lines(p0.y, p1.y, phase, d) {
                        let y = k * d + phase;
                        let x = interpolate_x(p0, p1, y);
                        processor.register_scanline_intersection(Point::new(x, y), k);
                        if let Some(cuts) = usize::try_from(k - first_line)
                            .ok()
                            .and_then(|i| cut_list.get_mut(i))
                        {
                            cuts.push(Crossing {
                                x,
                                edge: EdgeRef { polygon, edge },
                            });
                        }
                    }
                }
                processor.register_vertex(p1);
            }
            processor.register_poly_finished();
        }

        let mut segments = Vec::new();
        for (offset, mut cuts) in (0..).zip(cut_list) {
            let y = (first_line + offset) * d + phase;
            if cuts.len() % 2 != 0 {
                trace!(y, crossings = cuts.len(), "odd crossing count on scan line");
            }
            cuts.sort_by_key(|c| (c.x, c.edge.polygon, c.edge.edge));
            for pair in cuts.chunks_exact(2) {
                let (from, to) = (pair[0], pair[1]);
                if to.x - from.x < self.min_length {
                    continue;
                }
                segments.push(ScanSegment {
                    start: self.snap(matrix.unapply(Point::new(from.x, y)), from.edge),
                    end: self.snap(matrix.unapply(Point::new(to.x, y)), to.edge),
                    start_edge: from.edge,
                    end_edge: to.edge,
                });
            }
        }
        segments
    }

    /// Moves `p` onto the boundary edge it was cut from.
    fn snap(&self, p: Point, edge: EdgeRef) -> Point {
        let Some(ring) = self.outline.get(edge.polygon) else {
            return p;
        };
        match (ring.get(edge.edge), ring.get((edge.edge + 1) % ring.len())) {
            (Some(&p0), Some(&p1)) => closest_on_segment(p, p0, p1),
            _ => p,
        }
    }
}

/// Indices of the lines crossed by an edge from `y0` to `y1`, in walking
/// order.
fn crossed_lines(y0: Coord, y1: Coord, phase: Coord, d: Coord) -> Vec<i64> {
    let (lo, hi) = if y0 < y1 { (y0, y1) } else { (y1, y0) };
    // Lines with lo < y <= hi.
    let first = (lo - phase).div_euclid(d) + 1;
    let last = (hi - phase).div_euclid(d);
    let lines = first..=last;
    if y0 < y1 {
        lines.collect()
    } else {
        lines.rev().collect()
    }
}

#[allow(clippy::cast_possible_truncation)]
fn interpolate_x(p0: Point, p1: Point, y: Coord) -> Coord {
    let dy = i128::from(p1.y - p0.y);
    let t = i128::from(y - p0.y);
    (i128::from(p0.x) + i128::from(p1.x - p0.x) * t / dy) as Coord
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::infill::zigzag::NoZigzagConnector;

    fn square(size: Coord) -> Polygon {
        vec![
            Point::new(0, 0),
            Point::new(size, 0),
            Point::new(size, size),
            Point::new(0, size),
        ]
    }

    fn sweep(outline: &[Polygon], d: Coord, angle: f64, shift: Coord) -> Vec<ScanSegment> {
        ScanlineSweep::new(outline, d, angle, shift, 2).execute(&mut NoZigzagConnector)
    }

    #[test]
    fn horizontal_lines_in_square() {
        let segments = sweep(&[square(100)], 20, 0.0, 0);
        let ends: Vec<(Point, Point)> = segments.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(
            ends,
            [10, 30, 50, 70, 90]
                .iter()
                .map(|&y| (Point::new(0, y), Point::new(100, y)))
                .collect::<Vec<_>>()
        );
        assert_eq!(
            segments[0].start_edge,
            EdgeRef {
                polygon: 0,
                edge: 3
            }
        );
        assert_eq!(
            segments[0].end_edge,
            EdgeRef {
                polygon: 0,
                edge: 1
            }
        );
    }

    #[test]
    fn vertical_lines_at_ninety_degrees() {
        let segments = sweep(&[square(100)], 20, 90.0, 0);
        assert_eq!(segments.len(), 5);
        for s in &segments {
            assert_eq!(s.start.x, s.end.x, "{s:?}");
            assert_eq!((s.start.y - s.end.y).abs(), 100, "{s:?}");
        }
    }

    #[test]
    fn shift_moves_lines() {
        let segments = sweep(&[square(100)], 20, 0.0, 5);
        let ys: Vec<Coord> = segments.iter().map(|s| s.start.y).collect();
        assert_eq!(ys, vec![15, 35, 55, 75, 95]);
    }

    #[test]
    fn vertex_on_scan_line_counted_once() {
        // Diamond with vertices exactly on y = 10 and y = 50.
        let diamond = vec![
            Point::new(50, 10),
            Point::new(90, 50),
            Point::new(50, 90),
            Point::new(10, 50),
        ];
        let segments = sweep(&[diamond], 20, 0.0, 0);
        let ys: Vec<Coord> = segments.iter().map(|s| s.start.y).collect();
        assert_eq!(ys, vec![30, 50, 70]);
        assert_eq!(segments[1].start, Point::new(10, 50));
        assert_eq!(segments[1].end, Point::new(90, 50));
    }

    #[test]
    fn hole_splits_lines() {
        let mut hole = vec![
            Point::new(40, 0),
            Point::new(60, 0),
            Point::new(60, 100),
            Point::new(40, 100),
        ]
        .into_iter()
        .map(|p| Point::new(p.x, p.y.clamp(20, 80)))
        .collect::<Polygon>();
        hole.reverse();
        let segments = sweep(&[square(100), hole], 20, 0.0, 0);
        let at_50: Vec<(Point, Point)> = segments
            .iter()
            .filter(|s| s.start.y == 50)
            .map(|s| (s.start, s.end))
            .collect();
        assert_eq!(
            at_50,
            vec![
                (Point::new(0, 50), Point::new(40, 50)),
                (Point::new(60, 50), Point::new(100, 50)),
            ]
        );
        assert_eq!(segments.iter().filter(|s| s.start_edge.polygon == 1).count(), 3);
    }

    #[test]
    fn rotated_ends_lie_on_their_edges() {
        let l_shape = vec![
            Point::new(0, 0),
            Point::new(1000, 0),
            Point::new(1000, 400),
            Point::new(400, 400),
            Point::new(400, 1000),
            Point::new(0, 1000),
        ];
        let outline = vec![l_shape];
        for angle in [30.0, 45.0, 77.0] {
            let segments = sweep(&outline, 100, angle, 0);
            assert!(!segments.is_empty());
            for s in &segments {
                for (p, edge) in [(s.start, s.start_edge), (s.end, s.end_edge)] {
                    let ring = &outline[edge.polygon];
                    let (p0, p1) = (ring[edge.edge], ring[(edge.edge + 1) % ring.len()]);
                    // Every edge of the shape is axis aligned.
                    let on_edge = if p0.x == p1.x {
                        p.x == p0.x && (p0.y.min(p1.y)..=p0.y.max(p1.y)).contains(&p.y)
                    } else {
                        p.y == p0.y && (p0.x.min(p1.x)..=p0.x.max(p1.x)).contains(&p.x)
                    };
                    assert!(on_edge, "{p:?} off edge {edge:?} at {angle} degrees");
                }
            }
        }
    }

    #[test]
    fn short_pieces_dropped() {
        let thin = vec![
            Point::new(0, 0),
            Point::new(1, 0),
            Point::new(1, 100),
            Point::new(0, 100),
        ];
        assert!(sweep(&[thin], 20, 0.0, 0).is_empty());
    }

    #[test]
    fn empty_region() {
        assert!(sweep(&[], 20, 0.0, 0).is_empty());
    }
}
