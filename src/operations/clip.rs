use crate::math::linear_alg_2d::{line_line_intersection, orientation};
use crate::math::point::{dot, vsize2};
use crate::math::polygon_2d::point_in_polygons;
use crate::math::{Point, Polygon, Polygons, Polyline};

/// Result of clipping: rings that survived whole and open pieces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipResult {
    pub polygons: Polygons,
    pub polylines: Vec<Polyline>,
}

/// Clips chains of points to a region by the even-odd rule.
///
/// Every chain segment is split where it crosses a region edge and the
/// pieces whose midpoint lies inside the region are kept, merged back into
/// maximal chains. With `closed` set, each chain is treated as a ring; a
/// ring that never leaves the region is returned unchanged in
/// [`ClipResult::polygons`].
#[derive(Debug)]
pub struct ClipPolylines<'a> {
    region: &'a [Polygon],
    chains: &'a [Polyline],
    closed: bool,
}

impl<'a> ClipPolylines<'a> {
    /// Creates a new clip operation.
    #[must_use]
    pub fn new(region: &'a [Polygon], chains: &'a [Polyline], closed: bool) -> Self {
        Self {
            region,
            chains,
            closed,
        }
    }

    /// Executes the clip.
    #[must_use]
    pub fn execute(&self) -> ClipResult {
        let mut result = ClipResult::default();
        for chain in self.chains {
            if chain.len() < 2 {
                continue;
            }
            let mut points = chain.clone();
            if self.closed {
                points.push(chain[0]);
            }
            let (pieces, split) = self.clip_chain(&points);
            if self.closed && !split && pieces.len() == 1 {
                result.polygons.push(chain.clone());
                continue;
            }
            let mut pieces = pieces;
            if self.closed && pieces.len() > 1 {
                join_across_start(&mut pieces, chain[0]);
            }
            result.polylines.extend(pieces);
        }
        result
    }

    /// Clips one chain; also reports whether any split point was found.
    fn clip_chain(&self, points: &[Point]) -> (Vec<Polyline>, bool) {
        let mut pieces: Vec<Polyline> = Vec::new();
        let mut current: Polyline = Vec::new();
        let mut split = false;

        for w in points.windows(2) {
            let (a, b) = (w[0], w[1]);
            if a == b {
                continue;
            }
            let cuts = self.cut_points(a, b);
            split |= cuts.len() > 2;
            for piece in cuts.windows(2) {
                let (from, to) = (piece[0], piece[1]);
                let mid = Point::new(from.x + (to.x - from.x) / 2, from.y + (to.y - from.y) / 2);
                if point_in_polygons(mid, self.region) {
                    if current.last() != Some(&from) {
                        if current.len() >= 2 {
                            pieces.push(std::mem::take(&mut current));
                        }
                        current.clear();
                        current.push(from);
                    }
                    current.push(to);
                } else {
                    split = true;
                    if current.len() >= 2 {
                        pieces.push(std::mem::take(&mut current));
                    }
                    current.clear();
                }
            }
        }
        if current.len() >= 2 {
            pieces.push(current);
        }
        (pieces, split)
    }

    /// Points where `a -> b` meets region edges, sorted from `a` to `b` and
    /// including both ends.
    fn cut_points(&self, a: Point, b: Point) -> Vec<Point> {
        let ab = b - a;
        let mut cuts: Vec<(i128, Point)> = vec![(0, a), (i128::from(vsize2(ab)), b)];
        for ring in self.region {
            let n = ring.len();
            for i in 0..n {
                let c = ring[i];
                let d = ring[(i + 1) % n];
                let o1 = orientation(a, b, c).signum();
                let o2 = orientation(a, b, d).signum();
                let o3 = orientation(c, d, a).signum();
                let o4 = orientation(c, d, b).signum();
                if o1 * o2 > 0 || o3 * o4 > 0 || (o1 == 0 && o2 == 0) {
                    continue;
                }
                if let Some(x) = line_line_intersection(a, b, c, d) {
                    cuts.push((i128::from(dot(x - a, ab)), x));
                }
            }
        }
        cuts.sort_by_key(|&(t, _)| t);
        let mut points: Vec<Point> = cuts.into_iter().map(|(_, p)| p).collect();
        points.dedup();
        points
    }
}

/// Joins the last and first piece of a cut ring when both touch its start.
fn join_across_start(pieces: &mut Vec<Polyline>, start: Point) {
    let first_starts = pieces.first().and_then(|p| p.first()) == Some(&start);
    let last_ends = pieces.last().and_then(|p| p.last()) == Some(&start);
    if first_starts && last_ends {
        let first = pieces.remove(0);
        if let Some(last) = pieces.last_mut() {
            last.extend_from_slice(&first[1..]);
        }
    }
}
