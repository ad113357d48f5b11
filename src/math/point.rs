use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use super::{round_to_coord, Coord, Vector2};

/// Integer 2D point in fixed-point units (micrometres by convention).
///
/// Arithmetic is exact; [`dot`] and [`cross`] stay in `Coord` and are exact
/// for coordinates up to roughly ±3·10⁹. Wider intermediates are taken in
/// `i128` where a kernel routine needs them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: Coord,
    pub y: Coord,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    /// Converts to a floating-point vector for trigonometry.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_vector(self) -> Vector2 {
        Vector2::new(self.x as f64, self.y as f64)
    }

    /// Rounds a floating-point vector to the nearest integer point.
    #[must_use]
    pub fn from_vector(v: Vector2) -> Self {
        Self::new(round_to_coord(v.x), round_to_coord(v.y))
    }
}

impl Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Neg for Point {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<Coord> for Point {
    type Output = Self;
    fn mul(self, rhs: Coord) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// Truncating division, like integer division on each component.
impl Div<Coord> for Point {
    type Output = Self;
    fn div(self, rhs: Coord) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

/// Dot product.
#[must_use]
pub fn dot(a: Point, b: Point) -> Coord {
    a.x * b.x + a.y * b.y
}

/// Z component of the 3D cross product `a × b`.
///
/// Positive when `b` lies counter-clockwise of `a`.
#[must_use]
pub fn cross(a: Point, b: Point) -> Coord {
    a.x * b.y - a.y * b.x
}

/// Squared length.
#[must_use]
pub fn vsize2(p: Point) -> Coord {
    dot(p, p)
}

/// Length, truncated to an integer.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn vsize(p: Point) -> Coord {
    (vsize2(p) as f64).sqrt() as Coord
}

/// Scales `p` to length `len`.
///
/// A vector shorter than one unit has no usable direction; the result is
/// then `(len, 0)`.
#[must_use]
pub fn normal(p: Point, len: Coord) -> Point {
    let size = vsize(p);
    if size < 1 {
        return Point::new(len, 0);
    }
    p * len / size
}

/// Rotates a vector by 90 degrees counter-clockwise.
#[must_use]
pub fn turn90_ccw(p: Point) -> Point {
    Point::new(-p.y, p.x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_is_exact() {
        let a = Point::new(7, -3);
        let b = Point::new(-2, 5);
        assert_eq!(a + b, Point::new(5, 2));
        assert_eq!(a - b, Point::new(9, -8));
        assert_eq!(-a, Point::new(-7, 3));
        assert_eq!(a * 3, Point::new(21, -9));
        assert_eq!(a / 2, Point::new(3, -1));
    }

    #[test]
    fn dot_and_cross() {
        let a = Point::new(3, 0);
        let b = Point::new(0, 4);
        assert_eq!(dot(a, b), 0);
        assert_eq!(cross(a, b), 12);
        assert_eq!(cross(b, a), -12);
    }

    #[test]
    fn sizes() {
        let p = Point::new(3, 4);
        assert_eq!(vsize2(p), 25);
        assert_eq!(vsize(p), 5);
        assert_eq!(vsize(Point::new(1, 1)), 1);
    }

    #[test]
    fn normal_scales_to_length() {
        assert_eq!(normal(Point::new(30, 40), 10), Point::new(6, 8));
        assert_eq!(normal(Point::new(0, -7), 1000), Point::new(0, -1000));
    }

    #[test]
    fn normal_of_zero_vector() {
        assert_eq!(normal(Point::new(0, 0), 10), Point::new(10, 0));
    }

    #[test]
    fn turn90() {
        assert_eq!(turn90_ccw(Point::new(1, 0)), Point::new(0, 1));
        assert_eq!(turn90_ccw(Point::new(0, 1)), Point::new(-1, 0));
    }
}
