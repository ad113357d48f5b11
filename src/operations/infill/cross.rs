use tracing::trace;

use crate::geometry::Aabb;
use crate::math::{Coord, Point, Polygon, Polyline};
use crate::operations::clip::{ClipPolylines, ClipResult};

/// Decides how finely the cross pattern subdivides.
///
/// The pattern follows a Sierpinski curve over a square covering the
/// region; the curve passes through the centre of every leaf triangle of a
/// recursive subdivision. Denser regions are subdivided deeper.
pub trait CrossFillProvider: Sync {
    /// Deepest subdivision level.
    fn max_depth(&self) -> u32;

    /// Whether the triangle centred at `center`, at `depth`, is split
    /// further at height `z`.
    fn is_subdivided(&self, center: Point, depth: u32, z: Coord) -> bool;
}

impl std::fmt::Debug for dyn CrossFillProvider + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossFillProvider")
            .field("max_depth", &self.max_depth())
            .finish()
    }
}

/// Subdivides everywhere down to a fixed depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformCrossFill {
    max_depth: u32,
}

impl UniformCrossFill {
    #[must_use]
    pub fn new(max_depth: u32) -> Self {
        Self { max_depth }
    }

    /// Depth at which leaf triangles over a square of `size` are about
    /// `line_distance` apart.
    #[must_use]
    pub fn for_spacing(size: Coord, line_distance: Coord) -> Self {
        let mut depth = 0;
        let mut leg = size;
        // Two levels halve the leg length.
        while line_distance > 0 && leg > line_distance && depth < 40 {
            leg /= 2;
            depth += 2;
        }
        Self::new(depth)
    }
}

impl CrossFillProvider for UniformCrossFill {
    fn max_depth(&self) -> u32 {
        self.max_depth
    }

    fn is_subdivided(&self, _center: Point, _depth: u32, _z: Coord) -> bool {
        true
    }
}

/// A right isosceles triangle traversed from `from` to `to` along its
/// hypotenuse side, with the right angle at `corner`.
#[derive(Debug, Clone, Copy)]
struct Triangle {
    from: Point,
    corner: Point,
    to: Point,
}

impl Triangle {
    fn center(&self) -> Point {
        (self.from + self.corner + self.to) / 3
    }

    /// The two halves, in curve order.
    fn split(&self) -> [Self; 2] {
        let mid = (self.from + self.to) / 2;
        [
            Self {
                from: self.from,
                corner: mid,
                to: self.corner,
            },
            Self {
                from: self.corner,
                corner: mid,
                to: self.to,
            },
        ]
    }
}

/// Generates the cross pattern: a closed space-filling curve clipped to the
/// region.
///
/// With `z` taken into account by the provider the pattern changes from
/// layer to layer (cross 3D); passing a constant `z` gives the same pattern
/// on every layer.
#[derive(Debug)]
pub struct CrossFill<'a> {
    region: &'a [Polygon],
    provider: &'a dyn CrossFillProvider,
    z: Coord,
}

impl<'a> CrossFill<'a> {
    /// Creates a new cross fill operation.
    #[must_use]
    pub fn new(region: &'a [Polygon], provider: &'a dyn CrossFillProvider, z: Coord) -> Self {
        Self {
            region,
            provider,
            z,
        }
    }

    /// Executes the fill. A curve that stays inside the region is returned
    /// as a polygon, otherwise its clipped pieces as polylines.
    #[must_use]
    pub fn execute(&self) -> ClipResult {
        let Some(bounds) = Aabb::from_rings(self.region) else {
            return ClipResult::default();
        };
        let curve = self.curve(&bounds);
        trace!(points = curve.len(), "cross curve");
        if curve.len() < 3 {
            return ClipResult::default();
        }
        ClipPolylines::new(self.region, &[curve], true).execute()
    }

    /// The closed curve through all leaf centres over a square covering
    /// `bounds`.
    fn curve(&self, bounds: &Aabb) -> Polyline {
        let size = bounds.width().max(bounds.height()).max(1);
        let center = bounds.center();
        let half = size / 2 + 1;
        let corners = [
            center + Point::new(-half, -half),
            center + Point::new(half, -half),
            center + Point::new(half, half),
            center + Point::new(-half, half),
        ];
        let roots = [
            Triangle {
                from: corners[0],
                corner: corners[1],
                to: corners[2],
            },
            Triangle {
                from: corners[2],
                corner: corners[3],
                to: corners[0],
            },
        ];
        let mut curve = Vec::new();
        for root in roots {
            self.subdivide(root, 0, &mut curve);
        }
        curve.dedup();
        curve
    }

    fn subdivide(&self, triangle: Triangle, depth: u32, curve: &mut Polyline) {
        let center = triangle.center();
        if depth < self.provider.max_depth() && self.provider.is_subdivided(center, depth, self.z) {
            for half in triangle.split() {
                self.subdivide(half, depth + 1, curve);
            }
        } else {
            curve.push(center);
        }
    }
}
