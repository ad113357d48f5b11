pub mod linear_alg_2d;
pub mod matrix;
pub mod point;
pub mod polygon_2d;

pub use matrix::PointMatrix;
pub use point::Point;

/// Integer coordinate type.
pub type Coord = i64;

/// 2D vector type for the few routines that need floating point.
pub type Vector2 = nalgebra::Vector2<f64>;

/// A closed ring of points; the last point connects back to the first.
pub type Polygon = Vec<Point>;

/// A set of rings. Outer rings wind counter-clockwise, holes clockwise.
pub type Polygons = Vec<Polygon>;

/// An open chain of points.
pub type Polyline = Vec<Point>;

/// Rounds a float to the nearest coordinate.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn round_to_coord(v: f64) -> Coord {
    v.round() as Coord
}
