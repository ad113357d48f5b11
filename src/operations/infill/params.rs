use std::fmt;

use crate::error::{ParameterError, Result};
use crate::math::{Coord, Point};

/// The fill geometry to generate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FillPattern {
    #[default]
    Lines,
    Grid,
    Cubic,
    Tetrahedral,
    QuarterCubic,
    Triangles,
    TriHexagon,
    Concentric,
    ZigZag,
    Cross,
    Cross3D,
    Gyroid,
    Lightning,
}

impl FillPattern {
    /// Patterns built from one or more scan-line sweeps.
    #[must_use]
    pub fn is_linear(self) -> bool {
        matches!(
            self,
            Self::Lines
                | Self::Grid
                | Self::Cubic
                | Self::Tetrahedral
                | Self::QuarterCubic
                | Self::Triangles
                | Self::TriHexagon
                | Self::ZigZag
        )
    }

    /// Patterns whose separate lines can be joined along the boundary by
    /// the segment connector. Zigzag has its own connector processor.
    #[must_use]
    pub fn supports_connected_lines(self) -> bool {
        self.is_linear() && self != Self::ZigZag
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Lines => "lines",
            Self::Grid => "grid",
            Self::Cubic => "cubic",
            Self::Tetrahedral => "tetrahedral",
            Self::QuarterCubic => "quarter_cubic",
            Self::Triangles => "triangles",
            Self::TriHexagon => "trihexagon",
            Self::Concentric => "concentric",
            Self::ZigZag => "zigzag",
            Self::Cross => "cross",
            Self::Cross3D => "cross_3d",
            Self::Gyroid => "gyroid",
            Self::Lightning => "lightning",
        }
    }
}

impl fmt::Display for FillPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How zigzag handles boundary pieces that lead from a scan line back to
/// itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ZigzagEndPieces {
    /// End pieces are left out.
    #[default]
    None,
    /// End pieces are printed but stop short of reconnecting to the line.
    Disconnected,
    /// End pieces run all the way back to the line they started from.
    Connected,
}

/// Immutable configuration for one generation call.
///
/// Distances are in the same integer units as the region; `fill_angle` is
/// in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfillParams {
    pub pattern: FillPattern,
    /// Join separate lines along the boundary into long polylines.
    pub zig_zaggify: bool,
    /// Join closed result polygons that lie close to each other.
    pub connect_polygons: bool,
    pub line_width: Coord,
    /// Average distance between lines, before the per-pattern scaling that
    /// keeps density independent of the number of line directions.
    pub line_distance: Coord,
    /// Distance by which the region is grown before filling.
    pub overlap: Coord,
    /// Number of parallel copies of every line.
    pub multiplier: usize,
    /// Stack the copies on the left of each path, starting at the path
    /// itself, instead of centring them on it. Left of a counter-clockwise
    /// ring is its inside.
    pub mirror_offset: bool,
    pub fill_angle: f64,
    /// Layer height, used by patterns that interlock across layers.
    pub z: Coord,
    /// Extra shift of the scan lines, perpendicular to the fill angle.
    pub shift: Coord,
    /// Minimum segment length kept when simplifying output; 0 disables.
    pub max_resolution: Coord,
    pub max_deviation: Coord,
    pub wall_line_count: usize,
    /// Regions narrower than this are filled with walls instead; 0 disables.
    pub small_area_width: Coord,
    /// Fill narrow regions at all. Where even one wall does not fit, a
    /// line runs along the middle. Without it narrow regions stay empty.
    pub fill_gaps: bool,
    /// Point the pattern is anchored to.
    pub origin: Point,
    pub skip_line_stitching: bool,
    pub end_pieces: ZigzagEndPieces,
    pub skip_some_zags: bool,
    /// With `skip_some_zags`, every this-many-th zag is left out.
    pub zag_skip_count: usize,
}

impl Default for InfillParams {
    fn default() -> Self {
        Self {
            pattern: FillPattern::Lines,
            zig_zaggify: false,
            connect_polygons: false,
            line_width: 400,
            line_distance: 4000,
            overlap: 0,
            multiplier: 1,
            mirror_offset: false,
            fill_angle: 45.0,
            z: 0,
            shift: 0,
            max_resolution: 0,
            max_deviation: 0,
            wall_line_count: 0,
            small_area_width: 0,
            fill_gaps: true,
            origin: Point::new(0, 0),
            skip_line_stitching: false,
            end_pieces: ZigzagEndPieces::None,
            skip_some_zags: false,
            zag_skip_count: 0,
        }
    }
}

impl InfillParams {
    /// Creates parameters for `pattern` with the given line width and
    /// spacing; everything else takes its default.
    #[must_use]
    pub fn new(pattern: FillPattern, line_width: Coord, line_distance: Coord) -> Self {
        Self {
            pattern,
            line_width,
            line_distance,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_angle(mut self, degrees: f64) -> Self {
        self.fill_angle = degrees;
        self
    }

    #[must_use]
    pub fn with_z(mut self, z: Coord) -> Self {
        self.z = z;
        self
    }

    #[must_use]
    pub fn with_shift(mut self, shift: Coord) -> Self {
        self.shift = shift;
        self
    }

    #[must_use]
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    #[must_use]
    pub fn with_overlap(mut self, overlap: Coord) -> Self {
        self.overlap = overlap;
        self
    }

    #[must_use]
    pub fn with_multiplier(mut self, multiplier: usize) -> Self {
        self.multiplier = multiplier;
        self
    }

    #[must_use]
    pub fn with_mirror_offset(mut self, mirror_offset: bool) -> Self {
        self.mirror_offset = mirror_offset;
        self
    }

    #[must_use]
    pub fn with_walls(mut self, wall_line_count: usize) -> Self {
        self.wall_line_count = wall_line_count;
        self
    }

    #[must_use]
    pub fn with_zig_zaggify(mut self, zig_zaggify: bool) -> Self {
        self.zig_zaggify = zig_zaggify;
        self
    }

    #[must_use]
    pub fn with_connect_polygons(mut self, connect_polygons: bool) -> Self {
        self.connect_polygons = connect_polygons;
        self
    }

    #[must_use]
    pub fn with_end_pieces(mut self, end_pieces: ZigzagEndPieces) -> Self {
        self.end_pieces = end_pieces;
        self
    }

    /// Leaves out every `count`-th zag.
    #[must_use]
    pub fn with_skipped_zags(mut self, count: usize) -> Self {
        self.skip_some_zags = true;
        self.zag_skip_count = count;
        self
    }

    #[must_use]
    pub fn with_small_area_width(mut self, width: Coord) -> Self {
        self.small_area_width = width;
        self
    }

    #[must_use]
    pub fn with_fill_gaps(mut self, fill_gaps: bool) -> Self {
        self.fill_gaps = fill_gaps;
        self
    }

    #[must_use]
    pub fn with_resolution(mut self, max_resolution: Coord, max_deviation: Coord) -> Self {
        self.max_resolution = max_resolution;
        self.max_deviation = max_deviation;
        self
    }

    #[must_use]
    pub fn with_skip_line_stitching(mut self, skip: bool) -> Self {
        self.skip_line_stitching = skip;
        self
    }

    /// Whether the segment connector joins the lines of this pattern.
    #[must_use]
    pub fn connect_lines(&self) -> bool {
        self.zig_zaggify && self.pattern.supports_connected_lines()
    }

    /// Checks the parameters before any geometry work.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError`] for non-positive spacing or width, negative
    /// tolerances, a zero multiplier, or zigzag options that do not fit the
    /// pattern.
    pub fn validate(&self) -> Result<()> {
        if self.line_distance <= 0 {
            return Err(ParameterError::NonPositive {
                name: "line_distance",
                value: self.line_distance,
            }
            .into());
        }
        if self.line_width <= 0 {
            return Err(ParameterError::NonPositive {
                name: "line_width",
                value: self.line_width,
            }
            .into());
        }
        for (name, value) in [
            ("max_resolution", self.max_resolution),
            ("max_deviation", self.max_deviation),
            ("small_area_width", self.small_area_width),
        ] {
            if value < 0 {
                return Err(ParameterError::Negative { name, value }.into());
            }
        }
        if self.multiplier == 0 {
            return Err(ParameterError::ZeroMultiplier.into());
        }
        if self.pattern != FillPattern::ZigZag
            && (self.end_pieces != ZigzagEndPieces::None || self.skip_some_zags)
        {
            return Err(ParameterError::InvalidZigzag(format!(
                "zigzag options set for pattern {}",
                self.pattern
            ))
            .into());
        }
        if self.skip_some_zags && self.zag_skip_count == 0 {
            return Err(
                ParameterError::InvalidZigzag("zag skip count must be at least 1".to_owned())
                    .into(),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InfillError;

    fn parameter_error(params: &InfillParams) -> ParameterError {
        match params.validate() {
            Err(InfillError::Parameter(e)) => e,
            other => panic!("expected a parameter error, got {other:?}"),
        }
    }

    #[test]
    fn defaults_are_valid() {
        let params = InfillParams::default();
        assert!(params.validate().is_ok());
        assert!(params.fill_gaps);
        assert!(!params.mirror_offset);
    }

    #[test]
    fn rejects_non_positive_spacing() {
        let params = InfillParams::new(FillPattern::Lines, 400, 0);
        assert_eq!(
            parameter_error(&params),
            ParameterError::NonPositive {
                name: "line_distance",
                value: 0
            }
        );
        let params = InfillParams::new(FillPattern::Grid, -1, 1000);
        assert!(matches!(
            parameter_error(&params),
            ParameterError::NonPositive {
                name: "line_width",
                ..
            }
        ));
    }

    #[test]
    fn rejects_zero_multiplier() {
        let params = InfillParams::default().with_multiplier(0);
        assert_eq!(parameter_error(&params), ParameterError::ZeroMultiplier);
    }

    #[test]
    fn rejects_zigzag_options_on_other_patterns() {
        let params = InfillParams::new(FillPattern::Grid, 400, 4000)
            .with_end_pieces(ZigzagEndPieces::Connected);
        assert!(matches!(
            parameter_error(&params),
            ParameterError::InvalidZigzag(_)
        ));
    }

    #[test]
    fn rejects_zero_zag_skip_count() {
        let params = InfillParams::new(FillPattern::ZigZag, 400, 4000).with_skipped_zags(0);
        assert!(matches!(
            parameter_error(&params),
            ParameterError::InvalidZigzag(_)
        ));
        let params = InfillParams::new(FillPattern::ZigZag, 400, 4000).with_skipped_zags(3);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn connect_lines_only_for_linear_patterns() {
        let lines = InfillParams::new(FillPattern::Lines, 400, 4000).with_zig_zaggify(true);
        assert!(lines.connect_lines());
        let zigzag = InfillParams::new(FillPattern::ZigZag, 400, 4000).with_zig_zaggify(true);
        assert!(!zigzag.connect_lines());
        let gyroid = InfillParams::new(FillPattern::Gyroid, 400, 4000).with_zig_zaggify(true);
        assert!(!gyroid.connect_lines());
        assert!(!InfillParams::new(FillPattern::Lines, 400, 4000).connect_lines());
    }
}
