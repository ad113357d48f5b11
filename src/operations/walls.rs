use tracing::trace;

use crate::geometry::{ExtrusionLine, VariableWidthLines};
use crate::math::{Coord, Polygon, Polygons};
use crate::operations::offset::PolygonOffset2D;

/// Walls generated for a region, and the area left inside them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WallToolpaths {
    /// One entry per wall, outermost first.
    pub toolpaths: Vec<VariableWidthLines>,
    pub inner_contour: Polygons,
}

/// Produces wall toolpaths inside an outline.
///
/// Infill generation needs walls in two places: around the pattern area when
/// the caller asks for walls, and as the fill of areas too narrow for the
/// pattern. Slicers with a skeletal wall generator plug it in here.
pub trait WallGenerator: Sync {
    /// Generates up to `wall_count` walls of `line_width` inside `outline`
    /// after growing it by `overlap`.
    fn generate_walls(
        &self,
        outline: &[Polygon],
        wall_count: usize,
        line_width: Coord,
        overlap: Coord,
    ) -> WallToolpaths;
}

/// Constant-width walls made of successive insets.
///
/// Wall `i` runs at `line_width / 2 + i * line_width` inside the grown
/// outline; the inner contour lies `wall_count * line_width` inside it.
/// Walls stop early once the region collapses.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsetWalls;

impl WallGenerator for InsetWalls {
    fn generate_walls(
        &self,
        outline: &[Polygon],
        wall_count: usize,
        line_width: Coord,
        overlap: Coord,
    ) -> WallToolpaths {
        let grown;
        let outline = if overlap == 0 {
            outline
        } else {
            grown = PolygonOffset2D::new(outline, -overlap).execute();
            &grown
        };
        let mut toolpaths = Vec::with_capacity(wall_count);
        for inset_idx in 0..wall_count {
            let Ok(i) = Coord::try_from(inset_idx) else {
                break;
            };
            let rings = PolygonOffset2D::new(outline, line_width / 2 + i * line_width).execute();
            if rings.is_empty() {
                trace!(inset_idx, "wall collapsed");
                break;
            }
            toolpaths.push(
                rings
                    .iter()
                    .map(|ring| ExtrusionLine::from_ring(ring, line_width, inset_idx))
                    .collect::<VariableWidthLines>(),
            );
        }

        let inner_contour = match Coord::try_from(wall_count) {
            Ok(count) if toolpaths.len() == wall_count => {
                PolygonOffset2D::new(outline, count * line_width).execute()
            }
            _ => Vec::new(),
        };
        WallToolpaths {
            toolpaths,
            inner_contour,
        }
    }
}
