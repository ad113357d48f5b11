use tracing::trace;

use crate::math::point::vsize2;
use crate::math::{Coord, Point, Polygon, Polygons};

/// Joins closed rings that lie close to each other into single rings.
///
/// Two rings are joined through their closest vertex pair when it is at
/// most `max_distance` apart: the result follows the first ring up to the
/// joining vertex, crosses over, goes once around the second ring and
/// returns. Joining repeats until no pair is close enough.
#[derive(Debug)]
pub struct ConnectPolygons<'a> {
    polygons: &'a [Polygon],
    max_distance: Coord,
}

impl<'a> ConnectPolygons<'a> {
    /// Creates a new connect operation.
    #[must_use]
    pub fn new(polygons: &'a [Polygon], max_distance: Coord) -> Self {
        Self {
            polygons,
            max_distance,
        }
    }

    /// Executes the join.
    #[must_use]
    pub fn execute(&self) -> Polygons {
        let mut rings: Polygons = self
            .polygons
            .iter()
            .filter(|ring| ring.len() >= 3)
            .cloned()
            .collect();
        let max2 = self.max_distance * self.max_distance;
        let mut joined = 0_usize;
        let mut i = 0;
        while i < rings.len() {
            let mut j = i + 1;
            while j < rings.len() {
                match closest_pair(&rings[i], &rings[j]) {
                    Some((a, b, dist2)) if dist2 <= max2 => {
                        let other = rings.remove(j);
                        rings[i] = splice(&rings[i], a, &other, b);
                        joined += 1;
                        // Ring i grew; earlier rings may now be in reach.
                        j = i + 1;
                    }
                    _ => j += 1,
                }
            }
            i += 1;
        }
        trace!(joined, rings = rings.len(), "polygons connected");
        rings
    }
}

/// Indices of the closest vertex pair and its squared distance.
fn closest_pair(a: &[Point], b: &[Point]) -> Option<(usize, usize, Coord)> {
    a.iter()
        .enumerate()
        .flat_map(|(i, &p)| b.iter().enumerate().map(move |(j, &q)| (i, j, vsize2(q - p))))
        .min_by_key(|&(_, _, dist2)| dist2)
}

fn splice(ring: &[Point], a: usize, other: &[Point], b: usize) -> Polygon {
    let mut result = Vec::with_capacity(ring.len() + other.len() + 2);
    result.extend_from_slice(&ring[..=a]);
    result.extend_from_slice(&other[b..]);
    result.extend_from_slice(&other[..=b]);
    result.extend_from_slice(&ring[a..]);
    result
}
