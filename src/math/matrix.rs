use nalgebra::Rotation2;

use super::Point;

/// Rotation about the origin acting on integer points.
///
/// `apply` rotates by `-angle` so that a direction at `angle` degrees maps
/// onto the positive X axis; `unapply` rotates back. Results are rounded to
/// the nearest integer point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMatrix {
    rotation: Rotation2<f64>,
}

impl PointMatrix {
    /// Creates the matrix aligning direction `angle_degrees` with the X axis.
    #[must_use]
    pub fn new(angle_degrees: f64) -> Self {
        Self {
            rotation: Rotation2::new(-angle_degrees.to_radians()),
        }
    }

    /// Maps a point into the aligned frame.
    #[must_use]
    pub fn apply(&self, p: Point) -> Point {
        Point::from_vector(self.rotation * p.to_vector())
    }

    /// Maps a point from the aligned frame back to the original frame.
    #[must_use]
    pub fn unapply(&self, p: Point) -> Point {
        Point::from_vector(self.rotation.inverse() * p.to_vector())
    }

    /// Maps every point of a ring set into the aligned frame.
    #[must_use]
    pub fn apply_all(&self, polygons: &[Vec<Point>]) -> Vec<Vec<Point>> {
        polygons
            .iter()
            .map(|ring| ring.iter().map(|&p| self.apply(p)).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_angle_is_identity() {
        let m = PointMatrix::new(0.0);
        let p = Point::new(123, -456);
        assert_eq!(m.apply(p), p);
        assert_eq!(m.unapply(p), p);
    }

    #[test]
    fn quarter_turn_aligns_y_axis_with_x() {
        let m = PointMatrix::new(90.0);
        assert_eq!(m.apply(Point::new(0, 100)), Point::new(100, 0));
        assert_eq!(m.unapply(Point::new(100, 0)), Point::new(0, 100));
    }

    #[test]
    fn round_trip_stays_within_a_unit() {
        let m = PointMatrix::new(37.5);
        let p = Point::new(10_000, 2_500);
        let back = m.unapply(m.apply(p));
        assert!((back.x - p.x).abs() <= 1, "back={back:?}");
        assert!((back.y - p.y).abs() <= 1, "back={back:?}");
    }
}
