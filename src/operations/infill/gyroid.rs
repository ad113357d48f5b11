use std::f64::consts::{PI, TAU};

use tracing::trace;

use crate::geometry::Aabb;
use crate::math::{round_to_coord, Coord, Point, Polygon, Polyline};
use crate::operations::clip::ClipPolylines;

/// Ratio of gyroid pitch to line distance giving the density of plain
/// lines.
const PITCH_PER_LINE_DISTANCE: f64 = 2.41;

/// Coarsest sampling step along a curve, in region units.
const MAX_STEP: Coord = 500;

/// Cross-section of the gyroid surface
/// `sin x cos y + sin y cos z + sin z cos x = 0` at height `z`.
///
/// The section consists of wavy curves. Depending on the height they are
/// traced either as `x(y)` or as `y(x)`, whichever is defined everywhere,
/// then clipped to the region.
#[derive(Debug)]
pub struct GyroidFill<'a> {
    region: &'a [Polygon],
    line_distance: Coord,
    z: Coord,
}

impl<'a> GyroidFill<'a> {
    /// Creates a new gyroid fill operation.
    #[must_use]
    pub fn new(region: &'a [Polygon], line_distance: Coord, z: Coord) -> Self {
        Self {
            region,
            line_distance,
            z,
        }
    }

    /// Executes the fill, returning clipped open curves.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn execute(&self) -> Vec<Polyline> {
        let Some(bounds) = Aabb::from_rings(self.region) else {
            return Vec::new();
        };
        if self.line_distance <= 0 {
            return Vec::new();
        }
        let raw_pitch = round_to_coord(self.line_distance as f64 * PITCH_PER_LINE_DISTANCE);
        let mut num_steps: Coord = 4;
        let mut step = raw_pitch / num_steps;
        while step > MAX_STEP && num_steps < 16 {
            num_steps *= 2;
            step = raw_pitch / num_steps;
        }
        let step = step.max(1);
        let pitch = step * num_steps;
        let scale = TAU / pitch as f64;
        let z_rads = self.z as f64 * scale;
        let (sin_z, cos_z) = z_rads.sin_cos();

        let bounds = bounds.expanded(pitch);
        let curves = if sin_z.abs() >= cos_z.abs() {
            trace_columns(&bounds, pitch, step, scale, sin_z, cos_z)
        } else {
            trace_rows(&bounds, pitch, step, scale, sin_z, cos_z)
        };
        trace!(pitch, curves = curves.len(), "gyroid curves");
        ClipPolylines::new(self.region, &curves, false)
            .execute()
            .polylines
    }
}

/// Period offsets covering `[min, max]`.
fn periods(min: Coord, max: Coord, pitch: Coord) -> std::ops::RangeInclusive<Coord> {
    (min.div_euclid(pitch) - 1)..=(max.div_euclid(pitch) + 1)
}

/// Curves `x(y)`; defined everywhere when `|sin z| >= |cos z|`.
#[allow(clippy::cast_precision_loss)]
fn trace_columns(
    bounds: &Aabb,
    pitch: Coord,
    step: Coord,
    scale: f64,
    sin_z: f64,
    cos_z: f64,
) -> Vec<Polyline> {
    let sign = sin_z.signum();
    let samples: Vec<(Coord, f64, f64)> = (bounds.min.y..=bounds.max.y)
        .step_by(sample_step(step))
        .map(|y| {
            let y_rads = y as f64 * scale;
            let (a, c) = (y_rads.cos(), -y_rads.sin() * cos_z);
            let h = a.hypot(sin_z);
            let psi = (a / sin_z).atan();
            let spread = (sign * c / h).clamp(-1.0, 1.0).acos();
            (y, psi, spread)
        })
        .collect();

    let mut curves = Vec::new();
    for m in periods(bounds.min.x, bounds.max.x, pitch) {
        for branch in [1.0, -1.0] {
            curves.push(
                samples
                    .iter()
                    .map(|&(y, psi, spread)| {
                        let x_rads = psi + branch * spread + TAU * m as f64;
                        Point::new(round_to_coord(x_rads / scale), y)
                    })
                    .collect(),
            );
        }
    }
    curves
}

/// Curves `y(x)`; defined everywhere when `|cos z| > |sin z|`.
#[allow(clippy::cast_precision_loss)]
fn trace_rows(
    bounds: &Aabb,
    pitch: Coord,
    step: Coord,
    scale: f64,
    sin_z: f64,
    cos_z: f64,
) -> Vec<Polyline> {
    let sign = cos_z.signum();
    let samples: Vec<(Coord, f64, f64)> = (bounds.min.x..=bounds.max.x)
        .step_by(sample_step(step))
        .map(|x| {
            let x_rads = x as f64 * scale;
            let (b, c) = (x_rads.sin(), -sin_z * x_rads.cos());
            let h = cos_z.hypot(b);
            let phi = (b / cos_z).atan();
            let base = (sign * c / h).clamp(-1.0, 1.0).asin();
            (x, phi, base)
        })
        .collect();

    let mut curves = Vec::new();
    for m in periods(bounds.min.y, bounds.max.y, pitch) {
        for mirrored in [false, true] {
            curves.push(
                samples
                    .iter()
                    .map(|&(x, phi, base)| {
                        let y_rads = if mirrored { PI - base } else { base } - phi + TAU * m as f64;
                        Point::new(x, round_to_coord(y_rads / scale))
                    })
                    .collect(),
            );
        }
    }
    curves
}

fn sample_step(step: Coord) -> usize {
    usize::try_from(step).unwrap_or(1).max(1)
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

    #[allow(clippy::cast_precision_loss)]
    fn gyroid_value(p: Point, z: Coord, pitch: Coord) -> f64 {
        let scale = TAU / pitch as f64;
        let (x, y, z) = (p.x as f64 * scale, p.y as f64 * scale, z as f64 * scale);
        x.sin() * y.cos() + y.sin() * z.cos() + z.sin() * x.cos()
    }

    fn check_on_surface(z: Coord) {
        let region = vec![square(10_000)];
        let lines = GyroidFill::new(&region, 1000, z).execute();
        assert!(!lines.is_empty(), "z={z}");
        // line distance 1000: pitch 2410, sampled in 8 steps of 301
        let pitch = 2408;
        for line in &lines {
            for &p in &line[1..line.len() - 1] {
                assert!(
                    gyroid_value(p, z, pitch).abs() < 0.05,
                    "z={z} p={p:?} f={}",
                    gyroid_value(p, z, pitch)
                );
            }
        }
    }

    #[test]
    fn rows_lie_on_surface() {
        check_on_surface(0);
    }

    #[test]
    fn columns_lie_on_surface() {
        // a quarter pitch up, where sin z dominates
        check_on_surface(602);
    }

    #[test]
    fn lines_stay_inside_region() {
        let region = vec![square(10_000)];
        let lines = GyroidFill::new(&region, 1000, 300).execute();
        for p in lines.iter().flatten() {
            assert!((0..=10_000).contains(&p.x) && (0..=10_000).contains(&p.y), "{p:?}");
        }
    }

    #[test]
    fn pattern_changes_with_height() {
        let region = vec![square(10_000)];
        let low = GyroidFill::new(&region, 1000, 0).execute();
        let high = GyroidFill::new(&region, 1000, 400).execute();
        assert_ne!(low, high);
    }

    #[test]
    fn empty_region() {
        assert!(GyroidFill::new(&[], 1000, 0).execute().is_empty());
    }
}
