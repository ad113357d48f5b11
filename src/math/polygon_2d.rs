use super::linear_alg_2d::dist2_from_line;
use super::point::{cross, vsize2};
use super::{Coord, Point, Polygon, Polygons, Polyline};

/// Twice the signed area of a ring (shoelace formula), exact.
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area2(points: &[Point]) -> i128 {
    let n = points.len();
    if n < 3 {
        return 0;
    }
    let mut sum = 0_i128;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += i128::from(points[i].x) * i128::from(points[j].y)
            - i128::from(points[j].x) * i128::from(points[i].y);
    }
    sum
}

/// Signed area of a ring.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn signed_area(points: &[Point]) -> f64 {
    signed_area2(points) as f64 * 0.5
}

/// Net area of a ring set: outer rings count positive, holes negative.
#[must_use]
pub fn polygons_area(polygons: &[Polygon]) -> f64 {
    polygons.iter().map(|ring| signed_area(ring)).sum()
}

/// Even-odd containment test against a ring set.
///
/// Points exactly on an edge may land on either side.
#[must_use]
pub fn point_in_polygons(p: Point, polygons: &[Polygon]) -> bool {
    let mut inside = false;
    for ring in polygons {
        let n = ring.len();
        for i in 0..n {
            let a = ring[i];
            let b = ring[(i + 1) % n];
            if (a.y > p.y) == (b.y > p.y) {
                continue;
            }
            // Crossing x compared without division: sign depends on edge direction.
            let lhs = i128::from(p.x - a.x) * i128::from(b.y - a.y);
            let rhs = i128::from(b.x - a.x) * i128::from(p.y - a.y);
            if (b.y > a.y && lhs < rhs) || (b.y < a.y && lhs > rhs) {
                inside = !inside;
            }
        }
    }
    inside
}

/// Removes consecutive duplicates and collinear vertices from a ring.
///
/// Never reduces a ring below three vertices; a ring that would collapse
/// is returned deduplicated only.
#[must_use]
pub fn clean_polygon(points: &[Point]) -> Polygon {
    let mut deduped: Polygon = Vec::with_capacity(points.len());
    for &pt in points {
        if deduped.last() != Some(&pt) {
            deduped.push(pt);
        }
    }
    while deduped.len() > 1 && deduped.first() == deduped.last() {
        deduped.pop();
    }
    if deduped.len() < 3 {
        return deduped;
    }

    let n = deduped.len();
    let mut cleaned = Vec::with_capacity(n);
    for i in 0..n {
        let prev = deduped[(i + n - 1) % n];
        let next = deduped[(i + 1) % n];
        if cross(deduped[i] - prev, next - deduped[i]) != 0 {
            cleaned.push(deduped[i]);
        }
    }
    if cleaned.len() < 3 {
        return deduped;
    }
    cleaned
}

/// Drops vertices that add neither length nor shape.
///
/// A vertex goes when both of its edges are shorter than `max_resolution`
/// and it deviates less than `max_deviation` from the line through its
/// neighbours. Rings are kept at three vertices or more.
#[must_use]
pub fn simplify_ring(points: &[Point], max_resolution: Coord, max_deviation: Coord) -> Polygon {
    if points.len() <= 3 || max_resolution <= 0 {
        return points.to_vec();
    }
    let resolution2 = max_resolution * max_resolution;
    let deviation2 = max_deviation * max_deviation;
    let mut result: Polygon = Vec::with_capacity(points.len());
    let n = points.len();
    for i in 0..n {
        let current = points[i];
        let next = points[(i + 1) % n];
        let Some(&prev) = result.last().or(points.last()) else {
            continue;
        };
        let remaining = n - i + result.len();
        let short = vsize2(current - prev) < resolution2 && vsize2(next - current) < resolution2;
        if short && remaining > 3 && dist2_from_line(current, prev, next) < deviation2 {
            continue;
        }
        result.push(current);
    }
    if result.len() < 3 {
        return points.to_vec();
    }
    result
}

/// Drops interior vertices of an open chain by the same rule as
/// [`simplify_ring`]. Both ends are always kept.
#[must_use]
pub fn simplify_polyline(
    points: &[Point],
    max_resolution: Coord,
    max_deviation: Coord,
) -> Polyline {
    if points.len() <= 2 || max_resolution <= 0 {
        return points.to_vec();
    }
    let resolution2 = max_resolution * max_resolution;
    let deviation2 = max_deviation * max_deviation;
    let last = points.len() - 1;
    let mut result: Polyline = Vec::with_capacity(points.len());
    result.push(points[0]);
    for i in 1..last {
        let Some(&prev) = result.last() else { continue };
        let current = points[i];
        let next = points[i + 1];
        let short = vsize2(current - prev) < resolution2 && vsize2(next - current) < resolution2;
        if short && dist2_from_line(current, prev, next) < deviation2 {
            continue;
        }
        result.push(current);
    }
    result.push(points[last]);
    result
}

/// Groups rings into connected parts: each outer ring together with the
/// holes directly inside it.
///
/// A hole belongs to the smallest outer ring containing its first vertex;
/// holes inside no outer ring are dropped.
#[must_use]
pub fn split_components(polygons: &[Polygon]) -> Vec<Polygons> {
    let outers: Vec<&Polygon> = polygons
        .iter()
        .filter(|ring| signed_area2(ring) > 0)
        .collect();
    let mut parts: Vec<Polygons> = outers.iter().map(|&ring| vec![ring.clone()]).collect();
    for hole in polygons.iter().filter(|ring| signed_area2(ring) < 0) {
        let Some(&sample) = hole.first() else { continue };
        let owner = outers
            .iter()
            .enumerate()
            .filter(|(_, outer)| point_in_polygons(sample, std::slice::from_ref(*outer)))
            .min_by_key(|(_, outer)| signed_area2(outer))
            .map(|(i, _)| i);
        if let Some(i) = owner {
            parts[i].push(hole.clone());
        }
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: Coord) -> Polygon {
        vec![
            Point::new(0, 0),
            Point::new(size, 0),
            Point::new(size, size),
            Point::new(0, size),
        ]
    }

    #[test]
    fn signed_area_ccw_square() {
        assert_eq!(signed_area2(&square(100)), 20_000);
        assert!((signed_area(&square(10)) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn signed_area_cw_square() {
        let mut ring = square(10);
        ring.reverse();
        assert!((signed_area(&ring) + 100.0).abs() < 1e-9);
    }

    #[test]
    fn signed_area_degenerate() {
        assert_eq!(signed_area2(&[Point::new(0, 0)]), 0);
        assert_eq!(signed_area2(&[]), 0);
    }

    #[test]
    fn area_with_hole() {
        let mut hole = vec![
            Point::new(25, 25),
            Point::new(75, 25),
            Point::new(75, 75),
            Point::new(25, 75),
        ];
        hole.reverse();
        let area = polygons_area(&[square(100), hole]);
        assert!((area - 7500.0).abs() < 1e-9, "area={area}");
    }

    #[test]
    fn containment_even_odd() {
        let hole = vec![
            Point::new(25, 75),
            Point::new(75, 75),
            Point::new(75, 25),
            Point::new(25, 25),
        ];
        let region = vec![square(100), hole];
        assert!(point_in_polygons(Point::new(10, 10), &region));
        assert!(!point_in_polygons(Point::new(50, 50), &region));
        assert!(!point_in_polygons(Point::new(150, 50), &region));
    }

    #[test]
    fn clean_removes_duplicates_and_collinear() {
        let ring = vec![
            Point::new(0, 0),
            Point::new(0, 0),
            Point::new(50, 0),
            Point::new(100, 0),
            Point::new(100, 100),
            Point::new(0, 100),
            Point::new(0, 0),
        ];
        assert_eq!(clean_polygon(&ring), square(100));
    }

    #[test]
    fn simplify_drops_tiny_wiggles() {
        let ring = vec![
            Point::new(0, 0),
            Point::new(1000, 0),
            Point::new(1005, 2),
            Point::new(1010, 0),
            Point::new(2000, 0),
            Point::new(2000, 2000),
            Point::new(0, 2000),
        ];
        let simplified = simplify_ring(&ring, 20, 5);
        assert!(!simplified.contains(&Point::new(1005, 2)));
        assert_eq!(simplified.len(), 6);
    }

    #[test]
    fn simplify_polyline_keeps_ends() {
        let chain = vec![
            Point::new(0, 0),
            Point::new(5, 1),
            Point::new(10, 0),
            Point::new(1000, 0),
        ];
        let simplified = simplify_polyline(&chain, 20, 5);
        assert_eq!(
            simplified,
            vec![Point::new(0, 0), Point::new(10, 0), Point::new(1000, 0)]
        );
        assert_eq!(simplify_polyline(&chain[..2], 20, 5), chain[..2].to_vec());
    }

    #[test]
    fn components_assign_holes() {
        let outer_a = square(100);
        let outer_b: Polygon = square(10)
            .into_iter()
            .map(|p| p + Point::new(200, 0))
            .collect();
        let mut hole = vec![
            Point::new(25, 25),
            Point::new(75, 25),
            Point::new(75, 75),
            Point::new(25, 75),
        ];
        hole.reverse();
        let parts = split_components(&[outer_a.clone(), hole.clone(), outer_b.clone()]);
        assert_eq!(parts, vec![vec![outer_a, hole], vec![outer_b]]);
    }
}
