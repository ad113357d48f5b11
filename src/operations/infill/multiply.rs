use crate::math::{Coord, Point, Polygon, Polygons, Polyline, Vector2};
use crate::operations::clip::ClipPolylines;
use crate::operations::offset::PolygonOffset2D;

/// Beyond this miter length, as a multiple of the offset, a corner is
/// beveled.
const MITER_LIMIT: f64 = 4.0;

/// Turns every line into `multiplier` parallel copies one line width apart.
///
/// An odd multiplier keeps the original in the middle; an even one places
/// the copies half a line width to either side of it. Mirrored copies are
/// instead stacked on the left of the original, starting with the original
/// itself. Closed polygons get the same treatment through insets and
/// outsets, left of a counter-clockwise ring being its inside.
#[derive(Debug)]
pub struct MultiplyInfill<'a> {
    polygons: &'a [Polygon],
    lines: &'a [Polyline],
    line_width: Coord,
    multiplier: usize,
    mirror_offset: bool,
    clip_region: Option<&'a [Polygon]>,
}

impl<'a> MultiplyInfill<'a> {
    /// Creates a new multiply operation.
    #[must_use]
    pub fn new(
        polygons: &'a [Polygon],
        lines: &'a [Polyline],
        line_width: Coord,
        multiplier: usize,
    ) -> Self {
        Self {
            polygons,
            lines,
            line_width,
            multiplier,
            mirror_offset: false,
            clip_region: None,
        }
    }

    /// Stacks the copies on one side instead of centring them.
    #[must_use]
    pub fn with_mirror_offset(mut self, mirror_offset: bool) -> Self {
        self.mirror_offset = mirror_offset;
        self
    }

    /// Clips the copied lines to `region`.
    #[must_use]
    pub fn clipped_to(mut self, region: &'a [Polygon]) -> Self {
        self.clip_region = Some(region);
        self
    }

    /// Signed offsets of the copies, left of the original being positive.
    fn offsets(&self) -> Vec<Coord> {
        let Ok(n) = Coord::try_from(self.multiplier) else {
            return Vec::new();
        };
        if self.mirror_offset {
            (0..n).map(|j| j * self.line_width).collect()
        } else {
            (0..n)
                .map(|j| (2 * j - (n - 1)) * self.line_width / 2)
                .collect()
        }
    }

    /// Executes the multiplication, returning `(polygons, lines)`.
    #[must_use]
    pub fn execute(&self) -> (Polygons, Vec<Polyline>) {
        if self.multiplier <= 1 {
            return (self.polygons.to_vec(), self.lines.to_vec());
        }
        let offsets = self.offsets();

        let mut polygons = Vec::new();
        for &offset in &offsets {
            if offset == 0 {
                polygons.extend_from_slice(self.polygons);
            } else {
                polygons.extend(PolygonOffset2D::new(self.polygons, offset).execute());
            }
        }

        let mut lines: Vec<Polyline> = Vec::with_capacity(self.lines.len() * offsets.len());
        for line in self.lines {
            for &offset in &offsets {
                let copy = offset_polyline(line, offset);
                if copy.len() >= 2 {
                    lines.push(copy);
                }
            }
        }
        if let Some(region) = self.clip_region {
            lines = ClipPolylines::new(region, &lines, false).execute().polylines;
        }
        (polygons, lines)
    }
}

/// Offsets an open chain sideways by `distance`, positive to the left.
///
/// Ends move perpendicular to their segment; interior corners are mitered,
/// or beveled when the miter would be too long.
#[allow(clippy::cast_precision_loss)]
fn offset_polyline(points: &[Point], distance: Coord) -> Polyline {
    let mut chain = points.to_vec();
    chain.dedup();
    if distance == 0 || chain.len() < 2 {
        return chain;
    }
    let d = distance as f64;
    let vertices: Vec<Vector2> = chain.iter().map(|p| p.to_vector()).collect();
    let normals: Vec<Vector2> = vertices
        .windows(2)
        .map(|w| {
            let dir = (w[1] - w[0]).normalize();
            Vector2::new(-dir.y, dir.x)
        })
        .collect();

    let mut result = Vec::with_capacity(chain.len() + 2);
    result.push(Point::from_vector(vertices[0] + normals[0] * d));
    for i in 1..vertices.len() - 1 {
        let (n0, n1) = (normals[i - 1], normals[i]);
        let denom = 1.0 + n0.dot(&n1);
        let miter = (n0 + n1) * (d / denom.max(f64::EPSILON));
        if denom < 2.0 / (MITER_LIMIT * MITER_LIMIT) {
            result.push(Point::from_vector(vertices[i] + n0 * d));
            result.push(Point::from_vector(vertices[i] + n1 * d));
        } else {
            result.push(Point::from_vector(vertices[i] + miter));
        }
    }
    let last = vertices.len() - 1;
    result.push(Point::from_vector(vertices[last] + normals[last - 1] * d));
    result.dedup();
    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::point::vsize2;
    use crate::math::polygon_2d::signed_area2;

    fn p(x: Coord, y: Coord) -> Point {
        Point::new(x, y)
    }

    fn square(size: Coord) -> Polygon {
        vec![p(0, 0), p(size, 0), p(size, size), p(0, size)]
    }

    #[test]
    fn single_copy_is_identity() {
        let lines = vec![vec![p(0, 50), p(100, 50)]];
        let polygons = vec![square(100)];
        let (out_polygons, out_lines) = MultiplyInfill::new(&polygons, &lines, 10, 1).execute();
        assert_eq!(out_polygons, polygons);
        assert_eq!(out_lines, lines);
    }

    #[test]
    fn odd_multiplier_keeps_centre_line() {
        let lines = vec![vec![p(0, 50), p(100, 50)]];
        let (_, out) = MultiplyInfill::new(&[], &lines, 10, 3).execute();
        assert_eq!(
            out,
            vec![
                vec![p(0, 40), p(100, 40)],
                vec![p(0, 50), p(100, 50)],
                vec![p(0, 60), p(100, 60)],
            ]
        );
    }

    #[test]
    fn even_multiplier_straddles_centre_line() {
        let lines = vec![vec![p(0, 50), p(100, 50)]];
        let (_, out) = MultiplyInfill::new(&[], &lines, 10, 2).execute();
        assert_eq!(
            out,
            vec![vec![p(0, 45), p(100, 45)], vec![p(0, 55), p(100, 55)]]
        );
    }

    #[test]
    fn copies_stay_near_their_original() {
        let lines = vec![
            vec![p(0, 20), p(100, 20)],
            vec![p(0, 60), p(50, 80), p(100, 60)],
        ];
        let multiplier = 3;
        let (_, out) = MultiplyInfill::new(&[], &lines, 4, multiplier).execute();
        assert_eq!(out.len(), lines.len() * multiplier);
        // Every copy lies next to exactly one original.
        let mut counts = vec![0; lines.len()];
        for copy in &out {
            let nearest = (0..lines.len())
                .min_by_key(|&i| vsize2(lines[i][0] - copy[0]))
                .unwrap();
            assert!(vsize2(lines[nearest][0] - copy[0]) <= 5 * 5, "{copy:?}");
            counts[nearest] += 1;
        }
        assert_eq!(counts, vec![multiplier; lines.len()]);
    }

    #[test]
    fn mirrored_copies_stack_on_the_left() {
        let lines = vec![vec![p(0, 50), p(100, 50)]];
        let (_, out) = MultiplyInfill::new(&[], &lines, 10, 2)
            .with_mirror_offset(true)
            .execute();
        assert_eq!(
            out,
            vec![vec![p(0, 50), p(100, 50)], vec![p(0, 60), p(100, 60)]]
        );
    }

    #[test]
    fn mirrored_polygon_copies_go_inside() {
        let polygons = vec![square(100)];
        let (out, _) = MultiplyInfill::new(&polygons, &[], 10, 2)
            .with_mirror_offset(true)
            .execute();
        let mut areas: Vec<i128> = out.iter().map(|r| signed_area2(r)).collect();
        areas.sort_unstable();
        assert_eq!(areas, vec![2 * 90 * 90, 2 * 100 * 100]);
    }

    /// Counts groups of lines whose midpoints lie within `tolerance`.
    fn merged_count(lines: &[Polyline], tolerance: Coord) -> usize {
        let mut groups: Vec<Point> = Vec::new();
        for line in lines {
            let mid = (line[0] + line[line.len() - 1]) / 2;
            if !groups.iter().any(|&g| vsize2(g - mid) <= tolerance * tolerance) {
                groups.push(mid);
            }
        }
        groups.len()
    }

    #[test]
    fn merging_copies_gives_back_the_lines() {
        let spacing = 20;
        let lines: Vec<Polyline> = (0..5)
            .map(|k| vec![p(0, 10 + spacing * k), p(100, 10 + spacing * k)])
            .collect();
        for multiplier in [2, 3, 4] {
            let (_, out) = MultiplyInfill::new(&[], &lines, 2, multiplier).execute();
            assert_eq!(out.len(), lines.len() * multiplier);
            assert_eq!(merged_count(&out, spacing / 2), lines.len(), "x{multiplier}");
        }
    }

    #[test]
    fn mitered_corner() {
        let chain = vec![p(0, 0), p(100, 0), p(100, 100)];
        assert_eq!(
            offset_polyline(&chain, 10),
            vec![p(0, 10), p(90, 10), p(90, 100)]
        );
    }

    #[test]
    fn polygons_are_inset_and_outset() {
        let polygons = vec![square(100)];
        let (out, _) = MultiplyInfill::new(&polygons, &[], 10, 2).execute();
        let mut areas: Vec<i128> = out.iter().map(|r| signed_area2(r)).collect();
        areas.sort_unstable();
        assert_eq!(areas, vec![2 * 90 * 90, 2 * 110 * 110]);
    }

    #[test]
    fn copies_can_be_clipped() {
        let region = vec![square(100)];
        let lines = vec![vec![p(0, 95), p(100, 95)]];
        let (_, out) = MultiplyInfill::new(&[], &lines, 10, 3)
            .clipped_to(&region)
            .execute();
        assert_eq!(out.len(), 2);
    }
}
