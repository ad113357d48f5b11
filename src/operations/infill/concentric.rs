use tracing::trace;

use crate::math::polygon_2d::signed_area2;
use crate::math::{Coord, Polygon, Polygons};
use crate::operations::offset::PolygonOffset2D;

/// Fills a region with nested rings.
///
/// The first ring runs half a line width inside the region, each following
/// ring `line_distance` further in. Filling stops when the region collapses;
/// ring pieces enclosing less than `line_width²` are dropped.
#[derive(Debug)]
pub struct ConcentricFill<'a> {
    region: &'a [Polygon],
    line_width: Coord,
    line_distance: Coord,
}

impl<'a> ConcentricFill<'a> {
    /// Creates a new concentric fill operation.
    #[must_use]
    pub fn new(region: &'a [Polygon], line_width: Coord, line_distance: Coord) -> Self {
        Self {
            region,
            line_width,
            line_distance,
        }
    }

    /// Executes the fill, outermost rings first.
    #[must_use]
    pub fn execute(&self) -> Polygons {
        let mut rings = Vec::new();
        if self.line_distance <= 0 {
            return rings;
        }
        let min_area2 = 2 * i128::from(self.line_width) * i128::from(self.line_width);
        let mut current = PolygonOffset2D::new(self.region, self.line_width / 2).execute();
        let mut depth = 0_usize;
        while !current.is_empty() {
            let kept: Polygons = current
                .iter()
                .filter(|ring| signed_area2(ring).abs() >= min_area2)
                .cloned()
                .collect();
            if kept.iter().all(|ring| signed_area2(ring) < 0) {
                break;
            }
            rings.extend(kept);
            current = PolygonOffset2D::new(&current, self.line_distance).execute();
            depth += 1;
        }
        trace!(depth, rings = rings.len(), "concentric rings");
        rings
    }
}
