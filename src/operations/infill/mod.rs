//! Per-layer infill generation.
//!
//! [`Infill`] turns one layer's region into fill toolpaths: it optionally
//! generates walls, fills areas too narrow for the pattern with more walls,
//! dispatches to the pattern generator, and post-processes the result
//! (line joining, stitching, density multiplication, polygon joining).

mod concentric;
mod connect;
mod connect_polygons;
mod cross;
mod gap_fill;
mod gyroid;
mod lightning;
mod linear;
mod multiply;
mod params;
mod scanline;
mod zigzag;

pub use concentric::ConcentricFill;
pub use connect::{ConnectLines, InfillLineSegment, SegmentGraph, SegmentId, SegmentKind};
pub use connect_polygons::ConnectPolygons;
pub use cross::{CrossFill, CrossFillProvider, UniformCrossFill};
pub use gap_fill::GapFill;
pub use gyroid::GyroidFill;
pub use lightning::{LightningFill, LightningLayer};
pub use linear::{line_families, LineFamily};
pub use multiply::MultiplyInfill;
pub use params::{FillPattern, InfillParams, ZigzagEndPieces};
pub use scanline::{EdgeRef, ScanSegment, ScanlineSweep};
pub use zigzag::{NoZigzagConnector, ZigzagConnector, ZigzagConnectorProcessor};

use tracing::{debug, trace, warn};

use crate::error::{ParameterError, Result};
use crate::geometry::VariableWidthLines;
use crate::math::polygon_2d::{simplify_polyline, simplify_ring, split_components};
use crate::math::{PointMatrix, Polygon, Polygons, Polyline};
use crate::operations::offset::PolygonOffset2D;
use crate::operations::stitch::StitchPolylines;
use crate::operations::walls::{WallGenerator, WallToolpaths};

/// Precomputed structures some patterns read from.
#[derive(Clone, Copy, Default)]
pub struct InfillProviders<'a> {
    /// Required by [`FillPattern::Cross`] and [`FillPattern::Cross3D`].
    pub cross: Option<&'a dyn CrossFillProvider>,
    /// Required by [`FillPattern::Lightning`].
    pub lightning: Option<&'a dyn LightningLayer>,
}

impl<'a> InfillProviders<'a> {
    #[must_use]
    pub fn with_cross(mut self, provider: &'a dyn CrossFillProvider) -> Self {
        self.cross = Some(provider);
        self
    }

    #[must_use]
    pub fn with_lightning(mut self, layer: &'a dyn LightningLayer) -> Self {
        self.lightning = Some(layer);
        self
    }
}

impl std::fmt::Debug for InfillProviders<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfillProviders")
            .field("cross", &self.cross)
            .field("lightning", &self.lightning.is_some())
            .finish()
    }
}

/// Everything generated for one layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfillOutput {
    /// Wall toolpaths by inset index, including walls that fill small areas.
    pub toolpaths: Vec<VariableWidthLines>,
    /// Closed fill paths.
    pub polygons: Polygons,
    /// Open fill paths.
    pub lines: Vec<Polyline>,
    /// The area inside the walls.
    pub inner_contour: Polygons,
}

/// Generates infill for one layer's region.
///
/// All state lives in a single [`generate`](Self::generate) call, so one
/// `Infill` per layer can run on its own worker.
#[derive(Debug)]
pub struct Infill<'a> {
    params: InfillParams,
    outline: &'a [Polygon],
}

impl<'a> Infill<'a> {
    /// Creates a generator for `outline` (outer rings counter-clockwise,
    /// holes clockwise).
    #[must_use]
    pub fn new(params: InfillParams, outline: &'a [Polygon]) -> Self {
        Self { params, outline }
    }

    /// Generates walls and fill.
    ///
    /// # Errors
    ///
    /// Returns [`crate::InfillError::Parameter`] before any geometry work if
    /// the parameters are invalid or a provider the pattern needs is missing,
    /// and [`crate::InfillError::Connect`] if joining lines hits an internal
    /// inconsistency.
    pub fn generate(
        &self,
        walls: &dyn WallGenerator,
        providers: &InfillProviders<'_>,
    ) -> Result<InfillOutput> {
        let params = &self.params;
        params.validate()?;
        Self::check_providers(params.pattern, providers)?;
        debug!(
            pattern = %params.pattern,
            rings = self.outline.len(),
            line_distance = params.line_distance,
            "generating infill"
        );

        let WallToolpaths {
            mut toolpaths,
            inner_contour,
        } = if params.wall_line_count > 0 {
            walls.generate_walls(
                self.outline,
                params.wall_line_count,
                params.line_width,
                params.overlap,
            )
        } else {
            WallToolpaths {
                toolpaths: Vec::new(),
                inner_contour: PolygonOffset2D::new(self.outline, -params.overlap).execute(),
            }
        };
        let (area, gap_lines) = self.extract_small_areas(&inner_contour, walls, &mut toolpaths);

        // Copies of an even multiplier straddle the original, so they would
        // straddle the joins too.
        let zig_zaggify = params.zig_zaggify && params.multiplier % 2 == 1;

        let (mut polygons, mut lines) = if area.is_empty() {
            (Vec::new(), Vec::new())
        } else {
            self.generate_pattern(&area, zig_zaggify, providers)?
        };

        polygons = polygons
            .iter()
            .map(|ring| simplify_ring(ring, params.max_resolution, params.max_deviation))
            .collect();
        lines = lines
            .iter()
            .map(|line| simplify_polyline(line, params.max_resolution, params.max_deviation))
            .collect();

        let stitch = zig_zaggify
            || matches!(
                params.pattern,
                FillPattern::Cross
                    | FillPattern::Cross3D
                    | FillPattern::Gyroid
                    | FillPattern::ZigZag
            );
        if stitch && !params.skip_line_stitching {
            let (open, closed) = StitchPolylines::new(&lines, params.line_width).execute();
            trace!(
                before = lines.len(),
                after = open.len(),
                closed = closed.len(),
                "lines stitched"
            );
            lines = open;
            polygons.extend(closed);
        }

        if params.multiplier > 1 {
            let multiply =
                MultiplyInfill::new(&polygons, &lines, params.line_width, params.multiplier)
                    .with_mirror_offset(params.mirror_offset);
            let (multiplied_polygons, multiplied_lines) = if zig_zaggify {
                multiply.clipped_to(&area).execute()
            } else {
                multiply.execute()
            };
            polygons = multiplied_polygons;
            lines = multiplied_lines;
        }

        if params.connect_polygons {
            polygons = ConnectPolygons::new(&polygons, params.line_width).execute();
        }
        lines.extend(gap_lines);

        debug!(
            pattern = %params.pattern,
            walls = toolpaths.len(),
            polygons = polygons.len(),
            lines = lines.len(),
            "infill generated"
        );
        Ok(InfillOutput {
            toolpaths,
            polygons,
            lines,
            inner_contour,
        })
    }

    fn check_providers(pattern: FillPattern, providers: &InfillProviders<'_>) -> Result<()> {
        match pattern {
            FillPattern::Cross | FillPattern::Cross3D if providers.cross.is_none() => {
                Err(ParameterError::MissingProvider("cross").into())
            }
            FillPattern::Lightning if providers.lightning.is_none() => {
                Err(ParameterError::MissingProvider("lightning").into())
            }
            _ => Ok(()),
        }
    }

    /// Removes parts of `contour` too narrow for the pattern and fills them
    /// with walls instead, or with a centre line where no wall fits.
    /// Returns the area left for the pattern and the centre lines.
    fn extract_small_areas(
        &self,
        contour: &[Polygon],
        walls: &dyn WallGenerator,
        toolpaths: &mut Vec<VariableWidthLines>,
    ) -> (Polygons, Vec<Polyline>) {
        let width = self.params.small_area_width;
        if width <= 0 {
            return (contour.to_vec(), Vec::new());
        }
        let line_width = self.params.line_width;
        let wall_count = usize::try_from(width / line_width).unwrap_or(0) + 1;
        let mut area = Vec::new();
        let mut gap_lines = Vec::new();
        for component in split_components(contour) {
            let shrunk = PolygonOffset2D::new(&component, width / 2).execute();
            let opened = PolygonOffset2D::new(&shrunk, -(width / 2)).execute();
            if !opened.is_empty() {
                area.extend(component);
            } else if !self.params.fill_gaps {
                trace!("small area left empty");
            } else {
                let small = walls.generate_walls(&component, wall_count, line_width, 0);
                if small.toolpaths.is_empty() {
                    let centre = GapFill::new(&component, line_width).execute();
                    trace!(lines = centre.len(), "small area too thin for walls");
                    gap_lines.extend(centre);
                } else {
                    trace!(walls = small.toolpaths.len(), "small area filled with walls");
                    merge_toolpaths(toolpaths, small.toolpaths);
                }
            }
        }
        (area, gap_lines)
    }

    /// Runs the pattern generator, returning `(polygons, lines)`.
    fn generate_pattern(
        &self,
        area: &[Polygon],
        zig_zaggify: bool,
        providers: &InfillProviders<'_>,
    ) -> Result<(Polygons, Vec<Polyline>)> {
        let params = &self.params;
        match params.pattern {
            FillPattern::Lines
            | FillPattern::Grid
            | FillPattern::Cubic
            | FillPattern::Tetrahedral
            | FillPattern::QuarterCubic
            | FillPattern::Triangles
            | FillPattern::TriHexagon
            | FillPattern::ZigZag => self.generate_linear(area, zig_zaggify),
            FillPattern::Concentric => Ok((
                ConcentricFill::new(area, params.line_width, params.line_distance).execute(),
                Vec::new(),
            )),
            FillPattern::Gyroid => Ok((
                Vec::new(),
                GyroidFill::new(area, params.line_distance, params.z).execute(),
            )),
            FillPattern::Cross | FillPattern::Cross3D => {
                let Some(provider) = providers.cross else {
                    return Err(ParameterError::MissingProvider("cross").into());
                };
                let z = if params.pattern == FillPattern::Cross3D {
                    params.z
                } else {
                    0
                };
                let clipped = CrossFill::new(area, provider, z).execute();
                if clipped.polygons.is_empty() && clipped.polylines.is_empty() {
                    warn!(pattern = %params.pattern, "cross provider produced no fill");
                }
                Ok((clipped.polygons, clipped.polylines))
            }
            FillPattern::Lightning => {
                let Some(layer) = providers.lightning else {
                    return Err(ParameterError::MissingProvider("lightning").into());
                };
                let lines = LightningFill::new(area, layer).execute();
                if lines.is_empty() {
                    warn!("lightning layer produced no fill");
                }
                Ok((Vec::new(), lines))
            }
        }
    }

    /// Sweeps every line family of the pattern, then either joins the
    /// segments along the boundary or emits them as separate lines.
    fn generate_linear(
        &self,
        area: &[Polygon],
        zig_zaggify: bool,
    ) -> Result<(Polygons, Vec<Polyline>)> {
        let params = &self.params;
        let min_length = params.line_width / 5;
        let mut segments: Vec<ScanSegment> = Vec::new();
        let mut connectors: Vec<Polyline> = Vec::new();

        for family in line_families(params) {
            let matrix = PointMatrix::new(family.angle);
            let shift = family.shift + params.shift + matrix.apply(params.origin).y;
            let sweep =
                ScanlineSweep::new(area, family.line_distance, family.angle, shift, min_length);
            let found = if params.pattern == FillPattern::ZigZag {
                let skip_count = params.skip_some_zags.then_some(params.zag_skip_count);
                let mut processor = ZigzagConnector::new(params.end_pieces, skip_count);
                let found = sweep.execute(&mut processor);
                // The processor saw the rotated boundary.
                connectors.extend(processor.take_result().into_iter().map(|chain| {
                    chain
                        .into_iter()
                        .map(|p| matrix.unapply(p))
                        .collect::<Polyline>()
                }));
                // A single line is already covered by its connected end pieces.
                if params.end_pieces == ZigzagEndPieces::Connected && found.len() == 1 {
                    Vec::new()
                } else {
                    found
                }
            } else {
                sweep.execute(&mut NoZigzagConnector)
            };
            trace!(
                angle = family.angle,
                line_distance = family.line_distance,
                shift,
                segments = found.len(),
                "line family swept"
            );
            segments.extend(found);
        }

        if zig_zaggify && params.pattern.supports_connected_lines() {
            let (lines, polygons) =
                ConnectLines::new(area, &segments, params.line_distance, params.line_width)
                    .execute()?;
            return Ok((polygons, lines));
        }
        let mut lines: Vec<Polyline> = segments.iter().map(|s| vec![s.start, s.end]).collect();
        lines.extend(connectors);
        Ok((Vec::new(), lines))
    }
}

/// Adds `extra` walls to `toolpaths`, keeping the inset index as position.
fn merge_toolpaths(toolpaths: &mut Vec<VariableWidthLines>, extra: Vec<VariableWidthLines>) {
    for (inset_idx, lines) in extra.into_iter().enumerate() {
        match toolpaths.get_mut(inset_idx) {
            Some(existing) => existing.extend(lines),
            None => toolpaths.push(lines),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::InfillError;
    use crate::math::linear_alg_2d::segments_cross;
    use crate::math::polygon_2d::signed_area2;
    use crate::math::{Coord, Point};
    use crate::operations::walls::InsetWalls;

    fn p(x: Coord, y: Coord) -> Point {
        Point::new(x, y)
    }

    fn rect(x0: Coord, y0: Coord, x1: Coord, y1: Coord) -> Polygon {
        vec![p(x0, y0), p(x1, y0), p(x1, y1), p(x0, y1)]
    }

    fn square(size: Coord) -> Polygon {
        rect(0, 0, size, size)
    }

    /// Shows generation logs with `RUST_LOG=infill=trace`.
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn generate(params: InfillParams, outline: &[Polygon]) -> InfillOutput {
        init_tracing();
        Infill::new(params, outline)
            .generate(&InsetWalls, &InfillProviders::default())
            .unwrap()
    }

    fn parameter_error(result: Result<InfillOutput>) -> ParameterError {
        match result {
            Err(InfillError::Parameter(e)) => e,
            other => panic!("expected a parameter error, got {other:?}"),
        }
    }

    fn scan_endpoints() -> Vec<Point> {
        [10, 30, 50, 70, 90]
            .iter()
            .flat_map(|&y| [p(0, y), p(100, y)])
            .collect()
    }

    /// Fails any test that reaches wall generation.
    struct NoWalls;

    impl WallGenerator for NoWalls {
        fn generate_walls(&self, _: &[Polygon], _: usize, _: Coord, _: Coord) -> WallToolpaths {
            panic!("walls must not be generated");
        }
    }

    #[test]
    fn lines_in_square() {
        let params = InfillParams::new(FillPattern::Lines, 10, 20).with_angle(0.0);
        let out = generate(params, &[square(100)]);
        assert!(out.polygons.is_empty());
        assert!(out.toolpaths.is_empty());
        assert_eq!(
            out.lines,
            [10, 30, 50, 70, 90]
                .iter()
                .map(|&y| vec![p(0, y), p(100, y)])
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn origin_moves_lines() {
        let params = InfillParams::new(FillPattern::Lines, 10, 20)
            .with_angle(0.0)
            .with_origin(p(0, 5));
        let out = generate(params, &[square(100)]);
        let ys: Vec<Coord> = out.lines.iter().map(|line| line[0].y).collect();
        assert_eq!(ys, vec![15, 35, 55, 75, 95]);
    }

    #[test]
    fn grid_sweeps_both_directions() {
        let params = InfillParams::new(FillPattern::Grid, 10, 20).with_angle(0.0);
        let out = generate(params, &[square(120)]);
        assert_eq!(out.lines.len(), 6);
        let horizontal = out.lines.iter().filter(|l| l[0].y == l[1].y).count();
        let vertical = out.lines.iter().filter(|l| l[0].x == l[1].x).count();
        assert_eq!((horizontal, vertical), (3, 3));
    }

    #[test]
    fn zigzag_without_end_pieces() {
        let params = InfillParams::new(FillPattern::ZigZag, 10, 20).with_angle(0.0);
        let out = generate(params, &[square(100)]);
        assert!(out.polygons.is_empty());
        assert_eq!(
            out.lines,
            vec![vec![
                p(0, 10),
                p(100, 10),
                p(100, 30),
                p(0, 30),
                p(0, 50),
                p(100, 50),
                p(100, 70),
                p(0, 70),
                p(0, 90),
                p(100, 90),
            ]]
        );
    }

    #[test]
    fn zigzag_with_connected_end_pieces() {
        let params = InfillParams::new(FillPattern::ZigZag, 10, 20)
            .with_angle(0.0)
            .with_end_pieces(ZigzagEndPieces::Connected);
        let out = generate(params, &[square(100)]);
        assert!(out.polygons.is_empty());
        assert_eq!(out.lines.len(), 1);
        let line = &out.lines[0];
        assert_eq!(line.len(), 16);
        for end in scan_endpoints() {
            assert!(line.contains(&end), "{end:?} missing");
        }
    }

    #[test]
    fn zigzag_skips_every_second_zag() {
        let params = InfillParams::new(FillPattern::ZigZag, 10, 20)
            .with_angle(0.0)
            .with_skipped_zags(2);
        let out = generate(params, &[square(100)]);
        // Two connectors are left out, so the lines fall into three chains.
        assert_eq!(out.lines.len(), 3);
    }

    #[test]
    fn connected_lines_form_one_chain() {
        let params = InfillParams::new(FillPattern::Lines, 10, 20)
            .with_angle(0.0)
            .with_zig_zaggify(true);
        let out = generate(params, &[square(100)]);
        assert_eq!(out.lines.len(), 1);
        for end in scan_endpoints() {
            assert!(out.lines[0].contains(&end), "{end:?} missing");
        }
    }

    /// Pairs of path pieces that cross each other at an interior point.
    fn proper_crossings(lines: &[Polyline], polygons: &[Polygon]) -> usize {
        let mut pieces: Vec<(Point, Point)> = lines
            .iter()
            .flat_map(|line| line.windows(2).map(|w| (w[0], w[1])))
            .collect();
        for ring in polygons {
            pieces.extend(ring.iter().zip(ring.iter().cycle().skip(1)).map(|(&a, &b)| (a, b)));
        }
        let mut count = 0;
        for (i, &(a, b)) in pieces.iter().enumerate() {
            for &(c, d) in &pieces[i + 1..] {
                if segments_cross(a, b, c, d) {
                    count += 1;
                }
            }
        }
        count
    }

    #[test]
    fn connected_lines_do_not_cross_on_concave_regions() {
        let l_shape = vec![
            p(0, 0),
            p(1000, 0),
            p(1000, 400),
            p(400, 400),
            p(400, 1000),
            p(0, 1000),
        ];
        let u_shape = vec![
            p(0, 0),
            p(1000, 0),
            p(1000, 1000),
            p(600, 1000),
            p(600, 400),
            p(400, 400),
            p(400, 1000),
            p(0, 1000),
        ];
        for outline in [l_shape, u_shape] {
            for angle in [30.0, 45.0, 77.0] {
                // Shifted so no vertex lies within a few units of a line.
                let params = InfillParams::new(FillPattern::Lines, 10, 100)
                    .with_angle(angle)
                    .with_shift(38)
                    .with_zig_zaggify(true)
                    .with_skip_line_stitching(true);
                let out = generate(params, &[outline.clone()]);
                assert!(!out.lines.is_empty());
                assert_eq!(
                    proper_crossings(&out.lines, &out.polygons),
                    0,
                    "{angle} degrees in {outline:?}"
                );
            }
        }
    }

    #[test]
    fn even_multiplier_disables_connection() {
        let params = InfillParams::new(FillPattern::Lines, 10, 20)
            .with_angle(0.0)
            .with_zig_zaggify(true)
            .with_multiplier(2);
        let out = generate(params, &[square(100)]);
        assert_eq!(out.lines.len(), 10);
        assert!(out.lines.iter().all(|line| line.len() == 2));
    }

    #[test]
    fn walls_shrink_pattern_area() {
        let params = InfillParams::new(FillPattern::Lines, 100, 200)
            .with_angle(0.0)
            .with_walls(2);
        let out = generate(params, &[square(1000)]);
        assert_eq!(out.toolpaths.len(), 2);
        assert_eq!(signed_area2(&out.inner_contour[0]), 2 * 800 * 800);
        assert!(!out.lines.is_empty());
        for point in out.lines.iter().flatten() {
            assert!((100..=900).contains(&point.x) && (100..=900).contains(&point.y));
        }
    }

    #[test]
    fn narrow_areas_get_walls() {
        let params = InfillParams::new(FillPattern::Lines, 40, 200)
            .with_angle(0.0)
            .with_small_area_width(200);
        let outline = vec![square(1000), rect(2000, 0, 2100, 1000)];
        let out = generate(params, &outline);
        assert!(!out.toolpaths.is_empty());
        assert!(!out.lines.is_empty());
        assert!(out.lines.iter().flatten().all(|point| point.x <= 1000));
    }

    #[test]
    fn mirrored_multiplier_keeps_originals() {
        let params = InfillParams::new(FillPattern::Lines, 10, 20)
            .with_angle(0.0)
            .with_multiplier(2)
            .with_mirror_offset(true);
        let out = generate(params, &[square(100)]);
        let mut ys: Vec<Coord> = out.lines.iter().map(|line| line[0].y).collect();
        ys.sort_unstable();
        assert_eq!(ys, (1..=10).map(|k| 10 * k).collect::<Vec<_>>());
    }

    fn with_thin_strip() -> Vec<Polygon> {
        vec![square(1000), rect(2000, 0, 2030, 1000)]
    }

    #[test]
    fn thin_strips_get_centre_lines() {
        let params = InfillParams::new(FillPattern::Lines, 40, 200)
            .with_angle(0.0)
            .with_small_area_width(200);
        let out = generate(params, &with_thin_strip());
        assert!(out.toolpaths.is_empty());
        let centre: Vec<&Polyline> = out.lines.iter().filter(|line| line[0].x > 1000).collect();
        assert_eq!(centre.len(), 1);
        assert!(centre[0].iter().all(|point| point.x == 2015));
        assert_eq!((centre[0][0].y, centre[0][centre[0].len() - 1].y), (20, 980));
    }

    #[test]
    fn thin_strips_stay_empty_without_gap_filling() {
        let params = InfillParams::new(FillPattern::Lines, 40, 200)
            .with_angle(0.0)
            .with_small_area_width(200)
            .with_fill_gaps(false);
        let out = generate(params, &with_thin_strip());
        assert!(out.toolpaths.is_empty());
        assert!(!out.lines.is_empty());
        assert!(out.lines.iter().flatten().all(|point| point.x <= 1000));
    }

    #[test]
    fn concentric_rings_are_polygons() {
        let params = InfillParams::new(FillPattern::Concentric, 10, 20);
        let out = generate(params, &[square(100)]);
        assert!(out.lines.is_empty());
        assert_eq!(out.polygons.len(), 3);
    }

    #[test]
    fn gyroid_lines() {
        let params = InfillParams::new(FillPattern::Gyroid, 400, 1000);
        let out = generate(params, &[square(10_000)]);
        assert!(!out.lines.is_empty());
    }

    #[test]
    fn cross_uses_provider() {
        let provider = UniformCrossFill::new(6);
        let providers = InfillProviders::default().with_cross(&provider);
        let region = vec![square(10_000)];
        let out = Infill::new(InfillParams::new(FillPattern::Cross, 400, 1000), &region)
            .generate(&InsetWalls, &providers)
            .unwrap();
        assert_eq!(out.polygons.len(), 1);
        assert!(out.lines.is_empty());
    }

    #[test]
    fn lightning_uses_layer() {
        let trees = vec![(p(10, 10), p(50, 10)), (p(50, 10), p(50, 50))];
        let providers = InfillProviders::default().with_lightning(&trees);
        let region = vec![square(100)];
        let out = Infill::new(InfillParams::new(FillPattern::Lightning, 10, 20), &region)
            .generate(&InsetWalls, &providers)
            .unwrap();
        assert_eq!(out.lines, vec![vec![p(10, 10), p(50, 10), p(50, 50)]]);
    }

    #[test]
    fn missing_providers_are_rejected() {
        let region = vec![square(100)];
        for (pattern, name) in [
            (FillPattern::Cross, "cross"),
            (FillPattern::Cross3D, "cross"),
            (FillPattern::Lightning, "lightning"),
        ] {
            let result = Infill::new(InfillParams::new(pattern, 10, 20), &region)
                .generate(&NoWalls, &InfillProviders::default());
            assert_eq!(parameter_error(result), ParameterError::MissingProvider(name));
        }
    }

    #[test]
    fn invalid_parameters_fail_before_walls() {
        let region = vec![square(100)];
        let params = InfillParams::new(FillPattern::Lines, 10, 0).with_walls(2);
        let result = Infill::new(params, &region).generate(&NoWalls, &InfillProviders::default());
        assert_eq!(
            parameter_error(result),
            ParameterError::NonPositive {
                name: "line_distance",
                value: 0
            }
        );
    }

    #[test]
    fn empty_outline_gives_empty_output() {
        for pattern in [
            FillPattern::Lines,
            FillPattern::ZigZag,
            FillPattern::Concentric,
            FillPattern::Gyroid,
        ] {
            let out = generate(InfillParams::new(pattern, 10, 20), &[]);
            assert_eq!(out, InfillOutput::default());
        }
    }
}
