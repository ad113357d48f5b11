use crate::math::polygon_2d::{clean_polygon, point_in_polygons, signed_area2};
use crate::math::{Coord, Point, Polygon, Polygons, Vector2};

/// When `cos(angle between consecutive edges) < this`, use a flat cap
/// instead of a miter join. Only for near-180° reversals (> ~169°).
const FLAT_CAP_COS: f64 = -0.98;

/// Maximum miter distance as a multiple of `|distance|`. When the miter
/// extends further than this, a bevel (two points) is used instead.
const MITER_LIMIT: f64 = 4.0;

/// Parameter slack when deciding whether an intersection hits a segment end.
const PARAM_EPS: f64 = 1e-9;

/// Offsets a set of integer rings by a signed distance.
///
/// # Sign Convention
///
/// Positive distance moves every edge to its left. With outer rings
/// counter-clockwise and holes clockwise this shrinks the region (an inset);
/// negative distance grows it.
///
/// Rings that collapse are dropped, and a ring pinched apart by the offset
/// yields one ring per surviving lobe, so the operation cannot fail.
#[derive(Debug)]
pub struct PolygonOffset2D<'a> {
    polygons: &'a [Polygon],
    distance: Coord,
}

impl<'a> PolygonOffset2D<'a> {
    /// Creates a new polygon offset operation.
    #[must_use]
    pub fn new(polygons: &'a [Polygon], distance: Coord) -> Self {
        Self {
            polygons,
            distance,
        }
    }

    /// Executes the offset.
    #[must_use]
    pub fn execute(&self) -> Polygons {
        let mut outers: Polygons = Vec::new();
        let mut holes: Polygons = Vec::new();
        for ring in self.polygons {
            let cleaned = clean_polygon(ring);
            if cleaned.len() < 3 || signed_area2(&cleaned) == 0 {
                continue;
            }
            let pieces = if self.distance == 0 {
                vec![cleaned]
            } else {
                offset_ring(&cleaned, self.distance)
            };
            for piece in pieces {
                if signed_area2(&piece) > 0 {
                    outers.push(piece);
                } else {
                    holes.push(piece);
                }
            }
        }

        // Without a boolean union, rings that grew into each other are
        // resolved by nesting: an outer ring must sit at even depth among
        // the other rings and a hole at odd depth.
        let outer_count = outers.len();
        let mut rings = outers;
        rings.extend(holes);
        let keep: Vec<bool> = (0..rings.len())
            .map(|i| i >= outer_count || !mostly_inside_others(&rings, i))
            .collect();
        let mut rings: Polygons = rings
            .into_iter()
            .zip(keep)
            .filter_map(|(ring, keep)| keep.then_some(ring))
            .collect();
        let outer_count = rings.iter().filter(|r| signed_area2(r) > 0).count();
        let keep: Vec<bool> = (0..rings.len())
            .map(|i| i < outer_count || mostly_inside_others(&rings, i))
            .collect();
        let mut keep = keep.into_iter();
        rings.retain(|_| keep.next().unwrap_or(false));
        rings
    }
}

/// Returns `true` if most vertices of `rings[index]` lie inside the other
/// rings by the even-odd rule.
fn mostly_inside_others(rings: &[Polygon], index: usize) -> bool {
    let ring = &rings[index];
    let inside = ring
        .iter()
        .filter(|&&p| {
            rings
                .iter()
                .enumerate()
                .filter(|&(j, other)| {
                    j != index && point_in_polygons(p, std::slice::from_ref(other))
                })
                .count()
                % 2
                == 1
        })
        .count();
    inside * 2 > ring.len()
}

/// Offsets one cleaned ring; returns the surviving loops, rounded and cleaned.
#[allow(clippy::cast_precision_loss)]
fn offset_ring(ring: &[Point], distance: Coord) -> Polygons {
    let points: Vec<Vector2> = ring.iter().map(|p| p.to_vector()).collect();
    let distance = distance as f64;
    let winding_sign = signed_area_f64(&points).signum();

    let raw = build_raw_offset(&points, distance);
    if raw.len() < 3 {
        return Vec::new();
    }

    let original_area = signed_area_f64(&points);
    let is_inward = original_area * distance > 0.0;
    trim_closed_loops(&raw, winding_sign)
        .into_iter()
        // An inward offset that grew has passed through the middle.
        .filter(|l| !(is_inward && signed_area_f64(l).abs() > original_area.abs()))
        .map(|l| clean_polygon(&l.into_iter().map(Point::from_vector).collect::<Vec<_>>()))
        .filter(|l| l.len() >= 3 && signed_area2(l) != 0)
        .filter(|l| (signed_area2(l) > 0) == (winding_sign > 0.0))
        .collect()
}

/// Offsets each edge to its left and joins consecutive offset edges.
fn build_raw_offset(points: &[Vector2], distance: f64) -> Vec<Vector2> {
    let n = points.len();
    let mut offset_segments: Vec<(Vector2, Vector2)> = Vec::with_capacity(n);
    let mut directions: Vec<Vector2> = Vec::with_capacity(n);

    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let Some(dir) = (b - a).try_normalize(f64::EPSILON) else {
            continue;
        };
        let offset = left_normal(dir) * distance;
        offset_segments.push((a + offset, b + offset));
        directions.push(dir);
    }

    let count = offset_segments.len();
    let mut raw = Vec::with_capacity(count * 2);
    for i in 0..count {
        let prev = if i == 0 { count - 1 } else { i - 1 };
        push_corner(
            &mut raw,
            &offset_segments[prev],
            &offset_segments[i],
            &directions[prev],
            &directions[i],
            distance,
        );
    }
    raw
}

/// Pushes the join between two consecutive offset edges.
///
/// - Near-antiparallel edges: flat cap (two points).
/// - Miter exceeding `MITER_LIMIT`: bevel (two points).
/// - Otherwise: the single miter intersection point.
fn push_corner(
    raw: &mut Vec<Vector2>,
    seg_prev: &(Vector2, Vector2),
    seg_next: &(Vector2, Vector2),
    dir_prev: &Vector2,
    dir_next: &Vector2,
    distance: f64,
) {
    let cos_angle = dir_prev.dot(dir_next);
    if cos_angle < FLAT_CAP_COS {
        raw.push(seg_prev.1);
        raw.push(seg_next.0);
        return;
    }

    let d_prev = seg_prev.1 - seg_prev.0;
    let d_next = seg_next.1 - seg_next.0;
    let Some((t, _)) = line_line_params(&seg_prev.1, &d_prev, &seg_next.0, &d_next) else {
        // Parallel continuation: both offset edges share the endpoint.
        raw.push(seg_prev.1);
        return;
    };
    let corner = seg_prev.1 + d_prev * t;
    // The original vertex sits `distance` to the right of the next offset edge start.
    let original = seg_next.0 - left_normal(*dir_next) * distance;
    let limit = MITER_LIMIT * distance.abs();
    if (corner - original).norm_squared() > limit * limit {
        raw.push(seg_prev.1);
        raw.push(seg_next.0);
    } else {
        raw.push(corner);
    }
}

fn left_normal(dir: Vector2) -> Vector2 {
    Vector2::new(-dir.y, dir.x)
}

/// Parametric line-line intersection of `p1 + t*d1` and `p2 + u*d2`.
fn line_line_params(p1: &Vector2, d1: &Vector2, p2: &Vector2, d2: &Vector2) -> Option<(f64, f64)> {
    let cross = d1.perp(d2);
    if cross.abs() < f64::EPSILON {
        return None;
    }
    let delta = p2 - p1;
    Some((delta.perp(d2) / cross, delta.perp(d1) / cross))
}

/// Bounded segment-segment intersection, returning the point and both
/// parameters.
fn segment_intersection(
    a0: &Vector2,
    a1: &Vector2,
    b0: &Vector2,
    b1: &Vector2,
) -> Option<(Vector2, f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;
    let (t, u) = line_line_params(a0, &da, b0, &db)?;
    let in_range = |v: f64| (-PARAM_EPS..=1.0 + PARAM_EPS).contains(&v);
    if in_range(t) && in_range(u) {
        let t = t.clamp(0.0, 1.0);
        Some((a0 + da * t, t, u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

fn are_adjacent(i: usize, j: usize, n: usize) -> bool {
    let diff = i.abs_diff(j);
    diff == 1 || diff == n - 1
}

/// Finds the first crossing between non-adjacent edges of a closed ring.
///
/// Endpoint-to-endpoint touches are skipped; returns `(i, j, point)` with
/// `i < j`.
fn find_first_self_intersection(points: &[Vector2]) -> Option<(usize, usize, Vector2)> {
    let n = points.len();
    if n < 4 {
        return None;
    }
    for i in 0..n {
        let i_next = (i + 1) % n;
        for j in (i + 2)..n {
            if are_adjacent(i, j, n) {
                continue;
            }
            let j_next = (j + 1) % n;
            if let Some((pt, t, u)) =
                segment_intersection(&points[i], &points[i_next], &points[j], &points[j_next])
            {
                let t_at_end = t < PARAM_EPS || t > 1.0 - PARAM_EPS;
                let u_at_end = u < PARAM_EPS || u > 1.0 - PARAM_EPS;
                if t_at_end && u_at_end {
                    continue;
                }
                return Some((i, j, pt));
            }
        }
    }
    None
}

/// Splits a ring at the crossing of edges `seg_i < seg_j` into two loops.
fn split_at_intersection(
    points: &[Vector2],
    seg_i: usize,
    seg_j: usize,
    intersection: Vector2,
) -> (Vec<Vector2>, Vec<Vector2>) {
    let n = points.len();

    let mut a = Vec::with_capacity(seg_j - seg_i + 1);
    a.push(intersection);
    a.extend_from_slice(&points[(seg_i + 1)..=seg_j]);

    let mut b = Vec::with_capacity(n - (seg_j - seg_i) + 1);
    b.push(intersection);
    let mut idx = (seg_j + 1) % n;
    loop {
        b.push(points[idx]);
        if idx == seg_i {
            break;
        }
        idx = (idx + 1) % n;
    }

    (a, b)
}

/// Drops consecutive near-duplicates and collinear vertices.
fn clean_loop(points: &[Vector2]) -> Vec<Vector2> {
    const DUP_TOL_SQ: f64 = 1e-12;

    let mut deduped: Vec<Vector2> = Vec::with_capacity(points.len());
    for &pt in points {
        if deduped.last().is_some_and(|last| (pt - last).norm_squared() < DUP_TOL_SQ) {
            continue;
        }
        deduped.push(pt);
    }
    while deduped.len() > 1
        && (deduped[0] - deduped[deduped.len() - 1]).norm_squared() < DUP_TOL_SQ
    {
        deduped.pop();
    }
    if deduped.len() < 3 {
        return deduped;
    }

    let n = deduped.len();
    let cleaned: Vec<Vector2> = (0..n)
        .filter(|&i| {
            let prev = deduped[(i + n - 1) % n];
            let next = deduped[(i + 1) % n];
            (deduped[i] - prev).perp(&(next - deduped[i])).abs() >= 1e-9
        })
        .map(|i| deduped[i])
        .collect();
    if cleaned.len() < 3 {
        return deduped;
    }
    cleaned
}

/// Recursively splits a ring at its self-intersections and keeps every
/// loop winding like the original. Loops left by collapsed features wind
/// the other way and are discarded.
///
/// Terminates because each split strictly reduces the vertex count.
fn trim_closed_loops(points: &[Vector2], winding_sign: f64) -> Vec<Vec<Vector2>> {
    let pts = clean_loop(points);
    if pts.len() < 3 {
        return Vec::new();
    }
    match find_first_self_intersection(&pts) {
        None if signed_area_f64(&pts) * winding_sign > 0.0 => vec![pts],
        None => Vec::new(),
        Some((i, j, pt)) => {
            let (a, b) = split_at_intersection(&pts, i, j, pt);
            let mut loops = trim_closed_loops(&a, winding_sign);
            loops.extend(trim_closed_loops(&b, winding_sign));
            loops
        }
    }
}

fn signed_area_f64(points: &[Vector2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    (0..n)
        .map(|i| points[i].perp(&points[(i + 1) % n]))
        .sum::<f64>()
        * 0.5
}
