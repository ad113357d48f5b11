//! Exact integer kernel for segments, corners and angles.
//!
//! Every routine works on [`Point`]s with integer arithmetic; floating point
//! only appears where a length or an angle has to be produced.

use std::f64::consts::PI;

use super::point::{cross, dot, normal, turn90_ccw, vsize, vsize2};
use super::{Coord, Point};

/// Returns the angle at `b` on the left-hand side when walking
/// `a -> b -> c`, in `[0, 2π)`.
///
/// Collinear input is decided without trigonometry: `0` when `a` and `c`
/// lie on the same side of `b` (a spike), `π` when they lie on opposite
/// sides (a straight continuation).
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::many_single_char_names)]
pub fn angle_left(a: Point, b: Point, c: Point) -> f64 {
    let ba = a - b;
    let bc = c - b;
    let dott = dot(ba, bc);
    let det = cross(ba, bc);
    if det == 0 {
        let pointy = (ba.x != 0 && (ba.x > 0) == (bc.x > 0))
            || (ba.x == 0 && (ba.y > 0) == (bc.y > 0));
        return if pointy { 0.0 } else { PI };
    }
    let angle = -(det as f64).atan2(dott as f64);
    if angle >= 0.0 {
        angle
    } else {
        2.0 * PI + angle
    }
}

/// Projects `from` onto segment `p0 -> p1`, clamped to the segment ends.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn closest_on_segment(from: Point, p0: Point, p1: Point) -> Point {
    let direction = p1 - p0;
    let projected = i128::from(dot(from - p0, direction));
    let length2 = i128::from(vsize2(direction));
    if length2 == 0 || projected <= 0 {
        return p0;
    }
    if projected >= length2 {
        return p1;
    }
    let dx = i128::from(direction.x) * projected / length2;
    let dy = i128::from(direction.y) * projected / length2;
    p0 + Point::new(dx as Coord, dy as Coord)
}

/// Finds the point `r` on segment `a -> b` with `|p - r| == dist`.
///
/// When both solutions lie on the segment, the one nearer to `a` wins.
/// Returns `None` when no such point lies within the segment.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::many_single_char_names
)]
pub fn point_on_segment_with_dist(p: Point, a: Point, b: Point, dist: Coord) -> Option<Point> {
    let ab = b - a;
    let ab_size = vsize(ab);
    let ap = p - a;
    // Short segments have too coarse a length for a plain division.
    let ax_size = if ab_size < 50 {
        dot(normal(ab, 1000), ap) / 1000
    } else {
        dot(ab, ap) / ab_size
    };
    let ap_size2 = vsize2(ap);
    let px_size = ((ap_size2 - ax_size * ax_size).max(0) as f64).sqrt() as Coord;
    if px_size > dist {
        return None;
    }
    let xr_size = ((dist * dist - px_size * px_size) as f64).sqrt() as Coord;

    let along = |ar_size: Coord| a + normal(ab, ar_size);

    if ax_size <= 0 {
        // Foot of the perpendicular lies before `a`.
        let ar_size = xr_size + ax_size;
        (0..=ab_size).contains(&ar_size).then(|| along(ar_size))
    } else if ax_size >= ab_size {
        // Foot lies beyond `b`.
        let ar_size = ax_size - xr_size;
        (0..=ab_size).contains(&ar_size).then(|| along(ar_size))
    } else {
        let ar1_size = ax_size - xr_size;
        if ar1_size >= 0 {
            return Some(along(ar1_size));
        }
        let ar2_size = ax_size + xr_size;
        (ar2_size < ab_size).then(|| along(ar2_size))
    }
}

/// Shortest connection between segments `a1 -> a2` and `b1 -> b2`,
/// considering only the projections of each endpoint onto the other segment.
///
/// Returns `(point on a, point on b)`. Candidates are tried in the order
/// `b1`, `b2`, `a1`, `a2`; on equal squared distance the earlier one wins.
#[must_use]
pub fn closest_connection(a1: Point, a2: Point, b1: Point, b2: Point) -> (Point, Point) {
    let b1_on_a = closest_on_segment(b1, a1, a2);
    let b2_on_a = closest_on_segment(b2, a1, a2);
    let a1_on_b = closest_on_segment(a1, b1, b2);
    let a2_on_b = closest_on_segment(a2, b1, b2);
    let candidates = [(b1_on_a, b1), (b2_on_a, b2), (a1, a1_on_b), (a2, a2_on_b)];

    let mut best = candidates[0];
    let mut best_dist2 = vsize2(best.1 - best.0);
    for &(on_a, on_b) in &candidates[1..] {
        let dist2 = vsize2(on_b - on_a);
        if dist2 < best_dist2 {
            best = (on_a, on_b);
            best_dist2 = dist2;
        }
    }
    best
}

/// Tests whether segment `b` touches segment `a`.
///
/// `a` must already be transformed to run along the X axis in the positive
/// direction; only `a_from.y` is used as its height.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn segments_collide(a_from: Point, a_to: Point, b_from: Point, b_to: Point) -> bool {
    debug_assert!((a_from.y - a_to.y).abs() < 2, "segment a is not X-aligned");
    debug_assert!(a_from.x - 2 <= a_to.x, "segment a runs backwards");

    let y = a_from.y;
    let spans = (b_from.y >= y && b_to.y <= y) || (b_to.y >= y && b_from.y <= y);
    if !spans {
        return false;
    }
    if b_to.y == b_from.y {
        let (lo, hi) = if b_to.x < b_from.x {
            (b_to.x, b_from.x)
        } else {
            (b_from.x, b_to.x)
        };
        return lo <= a_to.x && hi >= a_from.x;
    }
    let x = i128::from(b_from.x)
        + i128::from(b_to.x - b_from.x) * i128::from(y - b_from.y)
            / i128::from(b_to.y - b_from.y);
    let x = x as Coord;
    x >= a_from.x && x <= a_to.x
}

/// Unsigned distance from `p` to the infinite line through `a` and `b`.
///
/// For `a == b` this is the distance from `p` to `a`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn dist_from_line(p: Point, a: Point, b: Point) -> Coord {
    let ab_size = vsize(b - a);
    if ab_size == 0 {
        return vsize(p - a);
    }
    // Shoelace formula, factored.
    let area_times_two = ((p.x - b.x) * (p.y - a.y) + (a.x - p.x) * (p.y - b.y)).abs();
    (area_times_two as f64 / ab_size as f64) as Coord
}

/// Squared form of [`dist_from_line`].
#[must_use]
pub fn dist2_from_line(p: Point, a: Point, b: Point) -> Coord {
    let dist = dist_from_line(p, a, b);
    dist * dist
}

/// Returns `true` if `query` lies on the inner side of corner `a -> b -> c`.
///
/// Inner is the left-hand side when walking the corner, which is the
/// material side for counter-clockwise outer rings.
#[must_use]
pub fn is_inside_corner(a: Point, b: Point, c: Point, query: Point) -> bool {
    const NORMAL_LENGTH: Coord = 10_000;

    let ba = normal(a - b, NORMAL_LENGTH);
    let bc = normal(c - b, NORMAL_LENGTH);
    let bq = query - b;
    // The query projects onto coordinate 0 of this perpendicular.
    let perpendicular = turn90_ccw(bq);
    let project_a_perpendicular = dot(ba, perpendicular);
    let project_c_perpendicular = dot(bc, perpendicular);
    if (project_a_perpendicular > 0) != (project_c_perpendicular > 0) {
        // Query lies between a and c on the projection.
        return project_a_perpendicular > 0;
    }
    let project_a_parallel = dot(ba, bq);
    let project_c_parallel = dot(bc, bq);
    (project_c_parallel < project_a_parallel) == (project_a_perpendicular > 0)
}

/// Vector of roughly length `len` bisecting the rays `intersect -> a` and
/// `intersect -> b`.
///
/// Both rays are scaled to `len` before averaging; a ray shorter than one
/// unit is treated as having length one.
#[must_use]
pub fn bisector_vector(intersect: Point, a: Point, b: Point, len: Coord) -> Point {
    let a0 = a - intersect;
    let b0 = b - intersect;
    (a0 * len / vsize(a0).max(1) + b0 * len / vsize(b0).max(1)) / 2
}

/// Sign of the turn `a -> b -> c`: positive for counter-clockwise.
#[must_use]
pub fn orientation(a: Point, b: Point, c: Point) -> i128 {
    let ab = b - a;
    let ac = c - a;
    i128::from(ab.x) * i128::from(ac.y) - i128::from(ab.y) * i128::from(ac.x)
}

/// Returns `true` if segments `a -> b` and `c -> d` cross at a single
/// point interior to both.
#[must_use]
pub fn segments_cross(a: Point, b: Point, c: Point, d: Point) -> bool {
    let o1 = orientation(a, b, c).signum();
    let o2 = orientation(a, b, d).signum();
    let o3 = orientation(c, d, a).signum();
    let o4 = orientation(c, d, b).signum();
    o1 * o2 < 0 && o3 * o4 < 0
}

/// Intersection of the infinite lines through `a, b` and `c, d`.
///
/// Returns `None` for parallel lines. The result is truncated towards zero
/// relative to `a`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn line_line_intersection(a: Point, b: Point, c: Point, d: Point) -> Option<Point> {
    let l1 = b - a;
    let l2 = d - c;
    let ac = c - a;
    let divisor = i128::from(l1.x) * i128::from(l2.y) - i128::from(l1.y) * i128::from(l2.x);
    if divisor == 0 {
        return None;
    }
    let parametric = i128::from(ac.x) * i128::from(l2.y) - i128::from(ac.y) * i128::from(l2.x);
    let dx = i128::from(l1.x) * parametric / divisor;
    let dy = i128::from(l1.y) * parametric / divisor;
    Some(a + Point::new(dx as Coord, dy as Coord))
}

/// Intersection point of two segments that [`segments_cross`].
#[must_use]
pub fn segment_intersection(a: Point, b: Point, c: Point, d: Point) -> Option<Point> {
    if segments_cross(a, b, c, d) {
        line_line_intersection(a, b, c, d)
    } else {
        None
    }
}
