use crate::math::{Coord, Point};

/// An axis-aligned bounding box over integer points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point,
    /// Maximum corner of the bounding box.
    pub max: Point,
}

impl Aabb {
    /// Bounding box of all points in `rings`, or `None` if there are none.
    #[must_use]
    pub fn from_rings<'a, I>(rings: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Vec<Point>>,
    {
        let mut points = rings.into_iter().flatten();
        let first = *points.next()?;
        let mut bbox = Self {
            min: first,
            max: first,
        };
        for &p in points {
            bbox.include(p);
        }
        Some(bbox)
    }

    /// Grows the box to contain `p`.
    pub fn include(&mut self, p: Point) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Grows the box by `margin` on every side.
    #[must_use]
    pub fn expanded(self, margin: Coord) -> Self {
        Self {
            min: Point::new(self.min.x - margin, self.min.y - margin),
            max: Point::new(self.max.x + margin, self.max.y + margin),
        }
    }

    #[must_use]
    pub fn width(&self) -> Coord {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn height(&self) -> Coord {
        self.max.y - self.min.y
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            self.min.x + self.width() / 2,
            self.min.y + self.height() / 2,
        )
    }

    /// Returns `true` if `p` lies inside or on the border.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        (self.min.x..=self.max.x).contains(&p.x) && (self.min.y..=self.max.y).contains(&p.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_of_rings() {
        let rings = vec![
            vec![Point::new(0, 5), Point::new(10, -3)],
            vec![Point::new(-7, 2)],
        ];
        let bbox = Aabb::from_rings(&rings).unwrap_or(Aabb {
            min: Point::default(),
            max: Point::default(),
        });
        assert_eq!(bbox.min, Point::new(-7, -3));
        assert_eq!(bbox.max, Point::new(10, 5));
        assert_eq!(bbox.width(), 17);
        assert!(bbox.contains(Point::new(0, 0)));
        assert!(!bbox.expanded(1).contains(Point::new(12, 0)));
    }

    #[test]
    fn empty_rings_have_no_bounds() {
        let rings: Vec<Vec<Point>> = vec![vec![]];
        assert!(Aabb::from_rings(&rings).is_none());
    }
}
