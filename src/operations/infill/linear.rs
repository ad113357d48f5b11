use std::f64::consts::FRAC_1_SQRT_2;

use crate::math::{round_to_coord, Coord};

use super::params::{FillPattern, InfillParams};

/// One family of parallel scan lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFamily {
    pub line_distance: Coord,
    /// Direction of the lines, in degrees.
    pub angle: f64,
    /// Shift of the lines perpendicular to their direction.
    pub shift: Coord,
}

impl LineFamily {
    fn new(line_distance: Coord, angle: f64, shift: Coord) -> Self {
        Self {
            line_distance,
            angle,
            shift,
        }
    }
}

/// The scan-line families making up a line-based pattern.
///
/// Spacing is scaled by the number of line directions so that every
/// pattern has the density of plain lines at `line_distance`. Patterns that
/// are not line based yield no families.
#[must_use]
pub fn line_families(params: &InfillParams) -> Vec<LineFamily> {
    let d = params.line_distance;
    let angle = params.fill_angle;
    match params.pattern {
        FillPattern::Lines | FillPattern::ZigZag => vec![LineFamily::new(d, angle, 0)],
        FillPattern::Grid => vec![
            LineFamily::new(d * 2, angle, 0),
            LineFamily::new(d * 2, angle + 90.0, 0),
        ],
        FillPattern::Triangles => vec![
            LineFamily::new(d * 3, angle, 0),
            LineFamily::new(d * 3, angle + 60.0, 0),
            LineFamily::new(d * 3, angle + 120.0, 0),
        ],
        FillPattern::TriHexagon => vec![
            LineFamily::new(d * 3, angle, 0),
            LineFamily::new(d * 3, angle + 60.0, 0),
            LineFamily::new(d * 3, angle + 120.0, d * 3 / 2),
        ],
        FillPattern::Cubic => {
            let shift = z_shift(params.z);
            vec![
                LineFamily::new(d * 3, angle, shift),
                LineFamily::new(d * 3, angle + 120.0, shift),
                LineFamily::new(d * 3, angle + 240.0, shift),
            ]
        }
        FillPattern::Tetrahedral => {
            let mut families = half_tetrahedral(params, 0.0, 0.0);
            families.extend(half_tetrahedral(params, 0.0, 90.0));
            families
        }
        FillPattern::QuarterCubic => {
            let mut families = half_tetrahedral(params, 0.0, 0.0);
            families.extend(half_tetrahedral(params, 0.5, 90.0));
            families
        }
        FillPattern::Concentric
        | FillPattern::Cross
        | FillPattern::Cross3D
        | FillPattern::Gyroid
        | FillPattern::Lightning => Vec::new(),
    }
}

/// Shift of lines that move diagonally with the layer height.
#[allow(clippy::cast_precision_loss)]
fn z_shift(z: Coord) -> Coord {
    round_to_coord(z as f64 * FRAC_1_SQRT_2)
}

/// Two line families at `±shift`, where the shift follows the layer height
/// so that consecutive layers stack into tetrahedra.
///
/// `z_phase` offsets the height in periods; lines never come closer than
/// half a line width to each other.
#[allow(clippy::cast_precision_loss)]
fn half_tetrahedral(params: &InfillParams, z_phase: f64, angle_shift: f64) -> Vec<LineFamily> {
    let period = params.line_distance * 4;
    let half_width = params.line_width / 2;
    let raw = round_to_coord((params.z as f64 + z_phase * period as f64 * 2.0) * FRAC_1_SQRT_2);
    let mut shift = raw.rem_euclid(period);
    shift = shift.min(period - shift);
    shift = shift.min(period / 2 - half_width);
    shift = shift.max(half_width);
    let angle = params.fill_angle + angle_shift;
    vec![
        LineFamily::new(period, angle, shift),
        LineFamily::new(period, angle, -shift),
    ]
}
