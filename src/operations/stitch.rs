use crate::math::point::vsize2;
use crate::math::{Coord, Point, Polygons, Polyline};

/// Joins open chains whose endpoints meet into longer chains.
///
/// Uses a greedy approach: each unused chain is extended at its end, then
/// at its start, by the unused chain with the nearest matching endpoint,
/// reversing the candidate when its end is the matching one. Exact matches
/// always win over near ones. A chain whose two ends meet becomes a ring.
#[derive(Debug)]
pub struct StitchPolylines<'a> {
    chains: &'a [Polyline],
    max_distance: Coord,
}

impl<'a> StitchPolylines<'a> {
    /// Creates a new stitch operation. Endpoints closer than
    /// `max_distance` are considered to meet.
    #[must_use]
    pub fn new(chains: &'a [Polyline], max_distance: Coord) -> Self {
        Self {
            chains,
            max_distance,
        }
    }

    /// Executes the stitch, returning `(open chains, closed rings)`.
    #[must_use]
    pub fn execute(&self) -> (Vec<Polyline>, Polygons) {
        let chains: Vec<&Polyline> = self.chains.iter().filter(|c| c.len() >= 2).collect();
        let n = chains.len();
        let mut used = vec![false; n];
        let mut open = Vec::new();
        let mut closed = Vec::new();

        for start in 0..n {
            if used[start] {
                continue;
            }
            used[start] = true;
            let mut chain: Polyline = chains[start].clone();

            self.extend(&mut chain, &chains, &mut used);
            chain.reverse();
            self.extend(&mut chain, &chains, &mut used);
            chain.reverse();

            let (Some(&first), Some(&last)) = (chain.first(), chain.last()) else {
                continue;
            };
            if chain.len() >= 3 && self.meets(first, last) {
                if first == last {
                    chain.pop();
                }
                if chain.len() >= 3 {
                    closed.push(chain);
                    continue;
                }
            }
            open.push(chain);
        }

        (open, closed)
    }

    fn meets(&self, a: Point, b: Point) -> bool {
        vsize2(b - a) < self.max_distance * self.max_distance || a == b
    }

    /// Appends matching chains at the end of `chain` until none is left.
    fn extend(&self, chain: &mut Polyline, chains: &[&Polyline], used: &mut [bool]) {
        loop {
            let Some(&end) = chain.last() else { break };
            let mut best: Option<(usize, bool)> = None;
            let mut best_dist2 = Coord::MAX;

            for (candidate, cand) in chains.iter().enumerate() {
                if used[candidate] {
                    continue;
                }
                for (reversed, p) in [(false, cand[0]), (true, cand[cand.len() - 1])] {
                    let dist2 = vsize2(p - end);
                    if dist2 < best_dist2 && self.meets(p, end) {
                        best_dist2 = dist2;
                        best = Some((candidate, reversed));
                    }
                }
            }

            let Some((next, reversed)) = best else { break };
            used[next] = true;
            let mut points = chains[next].clone();
            if reversed {
                points.reverse();
            }
            let skip = usize::from(points[0] == end);
            chain.extend_from_slice(&points[skip..]);
        }
    }
}
