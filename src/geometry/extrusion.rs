use crate::math::{Coord, Point, Polygon};

/// One vertex of a variable-width toolpath.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtrusionJunction {
    pub p: Point,
    /// Extrusion width at this vertex.
    pub w: Coord,
    /// Index of the wall this junction belongs to, counted from the outside.
    pub perimeter_index: usize,
}

/// A variable-width toolpath, open or closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtrusionLine {
    pub inset_idx: usize,
    /// Set for lines that fill a gap between two walls rather than
    /// following the outline.
    pub is_odd: bool,
    pub is_closed: bool,
    pub junctions: Vec<ExtrusionJunction>,
}

/// Toolpaths of one wall inset.
pub type VariableWidthLines = Vec<ExtrusionLine>;

impl ExtrusionLine {
    /// Creates an empty line for the given inset.
    #[must_use]
    pub fn new(inset_idx: usize, is_odd: bool) -> Self {
        Self {
            inset_idx,
            is_odd,
            is_closed: false,
            junctions: Vec::new(),
        }
    }

    /// Creates a closed constant-width loop following `ring`.
    #[must_use]
    pub fn from_ring(ring: &[Point], width: Coord, inset_idx: usize) -> Self {
        Self {
            inset_idx,
            is_odd: false,
            is_closed: true,
            junctions: ring
                .iter()
                .map(|&p| ExtrusionJunction {
                    p,
                    w: width,
                    perimeter_index: inset_idx,
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.junctions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.junctions.is_empty()
    }

    /// Vertex positions without widths.
    #[must_use]
    pub fn to_polygon(&self) -> Polygon {
        self.junctions.iter().map(|j| j.p).collect()
    }

    /// Smallest extrusion width along the line, or `None` if empty.
    #[must_use]
    pub fn min_width(&self) -> Option<Coord> {
        self.junctions.iter().map(|j| j.w).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_round_trip() {
        let ring = vec![Point::new(0, 0), Point::new(10, 0), Point::new(10, 10)];
        let line = ExtrusionLine::from_ring(&ring, 400, 2);
        assert!(line.is_closed);
        assert_eq!(line.len(), 3);
        assert_eq!(line.to_polygon(), ring);
        assert_eq!(line.min_width(), Some(400));
        assert!(line.junctions.iter().all(|j| j.perimeter_index == 2));
    }

    #[test]
    fn empty_line() {
        let line = ExtrusionLine::new(0, true);
        assert!(line.is_empty());
        assert_eq!(line.min_width(), None);
    }
}
