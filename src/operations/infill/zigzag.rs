use crate::math::{Point, Polyline};

use super::params::ZigzagEndPieces;

/// Receives the boundary walk of a scan-line sweep and decides which pieces
/// of the boundary become connectors between scan-line segments.
///
/// The sweep reports, per polygon and in boundary order, every vertex and
/// every point where a scan line crosses the boundary.
pub trait ZigzagConnectorProcessor {
    fn register_vertex(&mut self, vertex: Point);

    /// A boundary crossing with scan line `scanline_idx`.
    fn register_scanline_intersection(&mut self, intersection: Point, scanline_idx: i64);

    fn register_poly_finished(&mut self);

    /// Connector chains collected so far.
    fn take_result(&mut self) -> Vec<Polyline>;
}

/// Discards everything; used by patterns without zigzag connectors.
#[derive(Debug, Default)]
pub struct NoZigzagConnector;

impl ZigzagConnectorProcessor for NoZigzagConnector {
    fn register_vertex(&mut self, _vertex: Point) {}

    fn register_scanline_intersection(&mut self, _intersection: Point, _scanline_idx: i64) {}

    fn register_poly_finished(&mut self) {}

    fn take_result(&mut self) -> Vec<Polyline> {
        Vec::new()
    }
}

/// Builds the boundary connectors of the zigzag pattern.
///
/// A connector is the stretch of boundary between two consecutive
/// crossings. It is kept when it joins two different scan lines and starts
/// on an even one, so successive lines alternate direction. A connector that
/// leads back to the same scan line is an end piece, handled per
/// [`ZigzagEndPieces`].
///
/// The stretch before the first crossing of a polygon is held back and
/// joined with the stretch after the last crossing when the polygon ends.
#[derive(Debug)]
pub struct ZigzagConnector {
    end_pieces: ZigzagEndPieces,
    skip_count: Option<i64>,
    is_first_connector: bool,
    first_connector: Vec<Point>,
    first_connector_end_scanline: i64,
    current_connector: Vec<Point>,
    last_scanline: i64,
    result: Vec<Polyline>,
}

impl ZigzagConnector {
    /// Creates a processor; with `skip_count` set, every that-many-th zag is
    /// left out.
    #[must_use]
    pub fn new(end_pieces: ZigzagEndPieces, skip_count: Option<usize>) -> Self {
        Self {
            end_pieces,
            skip_count: skip_count
                .and_then(|n| i64::try_from(n).ok())
                .filter(|&n| n > 0),
            is_first_connector: true,
            first_connector: Vec::new(),
            first_connector_end_scanline: 0,
            current_connector: Vec::new(),
            last_scanline: 0,
            result: Vec::new(),
        }
    }

    fn should_add_connector(&self, start_scanline: i64, end_scanline: i64) -> bool {
        let is_endpiece = start_scanline == end_scanline;
        if is_endpiece {
            return self.end_pieces != ZigzagEndPieces::None;
        }
        let is_even = start_scanline.rem_euclid(2) == 0;
        let skipped = self
            .skip_count
            .is_some_and(|n| (start_scanline.div_euclid(2) + 1) % n == 0);
        is_even && !skipped
    }

    /// Adds the connector as one chain. The last edge of an end piece is
    /// left off unless end pieces are connected.
    fn add_connector(&mut self, mut points: Vec<Point>, is_endpiece: bool) {
        points.dedup();
        if is_endpiece && self.end_pieces != ZigzagEndPieces::Connected {
            points.pop();
        }
        if points.len() >= 2 {
            self.result.push(points);
        }
    }

    fn reset(&mut self) {
        self.is_first_connector = true;
        self.first_connector.clear();
        self.first_connector_end_scanline = 0;
        self.current_connector.clear();
        self.last_scanline = 0;
    }
}

impl ZigzagConnectorProcessor for ZigzagConnector {
    fn register_vertex(&mut self, vertex: Point) {
        if self.is_first_connector {
            self.first_connector.push(vertex);
        } else {
            self.current_connector.push(vertex);
        }
    }

    fn register_scanline_intersection(&mut self, intersection: Point, scanline_idx: i64) {
        if self.is_first_connector {
            self.first_connector.push(intersection);
            self.first_connector_end_scanline = scanline_idx;
            self.is_first_connector = false;
        } else if self.should_add_connector(self.last_scanline, scanline_idx) {
            let is_endpiece = self.last_scanline == scanline_idx;
            let mut points = std::mem::take(&mut self.current_connector);
            points.push(intersection);
            self.add_connector(points, is_endpiece);
        }
        self.current_connector.clear();
        self.current_connector.push(intersection);
        self.last_scanline = scanline_idx;
    }

    fn register_poly_finished(&mut self) {
        // A polygon no scan line crosses contributes nothing.
        if !self.is_first_connector {
            let start = self.last_scanline;
            let end = self.first_connector_end_scanline;
            if self.should_add_connector(start, end) {
                let mut points = std::mem::take(&mut self.current_connector);
                points.append(&mut self.first_connector);
                self.add_connector(points, start == end);
            }
        }
        self.reset();
    }

    fn take_result(&mut self) -> Vec<Polyline> {
        std::mem::take(&mut self.result)
    }
}
