use tracing::trace;

use crate::geometry::Aabb;
use crate::math::{Coord, Point, Polygon, Polyline};

use super::scanline::{ScanSegment, ScanlineSweep};
use super::zigzag::NoZigzagConnector;

/// Runs a line along the middle of a strip too thin for a wall.
///
/// The strip is cut across its longer bounding-box side every
/// `line_width`; the midpoints of the cuts are chained in order. Where a
/// cut meets the strip more than once the strip branches or bends back,
/// and the chain is broken there.
#[derive(Debug)]
pub struct GapFill<'a> {
    region: &'a [Polygon],
    line_width: Coord,
}

impl<'a> GapFill<'a> {
    /// Creates a new gap fill operation.
    #[must_use]
    pub fn new(region: &'a [Polygon], line_width: Coord) -> Self {
        Self { region, line_width }
    }

    /// Executes the fill, returning the centre lines.
    #[must_use]
    pub fn execute(&self) -> Vec<Polyline> {
        let Some(bounds) = Aabb::from_rings(self.region) else {
            return Vec::new();
        };
        let across_x = bounds.width() >= bounds.height();
        let angle = if across_x { 90.0 } else { 0.0 };
        let cuts = ScanlineSweep::new(self.region, self.line_width, angle, 0, 1)
            .execute(&mut NoZigzagConnector);
        // Cuts come ordered by line; a line is identified by its position
        // along the strip.
        let key = |s: &ScanSegment| if across_x { s.start.x } else { s.start.y };

        let mut lines = Vec::new();
        let mut chain: Polyline = Vec::new();
        let mut i = 0;
        while i < cuts.len() {
            let same_line = cuts[i..]
                .iter()
                .take_while(|s| key(s) == key(&cuts[i]))
                .count();
            if same_line == 1 {
                chain.push(midpoint(&cuts[i]));
            } else if chain.len() >= 2 {
                lines.push(std::mem::take(&mut chain));
            } else {
                chain.clear();
            }
            i += same_line;
        }
        if chain.len() >= 2 {
            lines.push(chain);
        }
        trace!(cuts = cuts.len(), lines = lines.len(), "gaps filled");
        lines
    }
}

fn midpoint(s: &ScanSegment) -> Point {
    (s.start + s.end) / 2
}
