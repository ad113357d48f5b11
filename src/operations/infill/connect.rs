use slotmap::{SecondaryMap, SlotMap};
use tracing::trace;

use crate::error::{ConnectError, Result, SegmentEnd};
use crate::math::linear_alg_2d::{bisector_vector, point_on_segment_with_dist, segment_intersection};
use crate::math::point::{dot, normal, turn90_ccw, vsize2};
use crate::math::{Coord, Point, Polygon, Polygons, Polyline};

use super::scanline::{EdgeRef, ScanSegment};

slotmap::new_key_type! {
    /// Unique identifier for a segment in the connection graph.
    pub struct SegmentId;
}

/// Whether a segment is a piece of infill or a link along the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Infill,
    Connector,
}

/// A node of the connection graph.
///
/// Segments form doubly linked chains: `previous` is the neighbour joined at
/// the start end, `next` the one joined at the end end. Chains carry no
/// global direction, so the neighbour's matching end must be looked up.
///
/// The original endpoints stay fixed; crossing resolution only moves the
/// altered endpoints and adds bend points beyond them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfillLineSegment {
    pub start: Point,
    pub end: Point,
    pub altered_start: Point,
    pub altered_end: Point,
    pub start_edge: EdgeRef,
    pub end_edge: EdgeRef,
    pub start_bend: Option<Point>,
    pub end_bend: Option<Point>,
    pub previous: Option<SegmentId>,
    pub next: Option<SegmentId>,
    pub kind: SegmentKind,
}

impl InfillLineSegment {
    #[must_use]
    pub fn new(
        start: Point,
        start_edge: EdgeRef,
        end: Point,
        end_edge: EdgeRef,
        kind: SegmentKind,
    ) -> Self {
        Self {
            start,
            end,
            altered_start: start,
            altered_end: end,
            start_edge,
            end_edge,
            start_bend: None,
            end_bend: None,
            previous: None,
            next: None,
            kind,
        }
    }

    #[must_use]
    pub fn point(&self, end: SegmentEnd) -> Point {
        match end {
            SegmentEnd::Start => self.start,
            SegmentEnd::End => self.end,
        }
    }

    #[must_use]
    pub fn altered(&self, end: SegmentEnd) -> Point {
        match end {
            SegmentEnd::Start => self.altered_start,
            SegmentEnd::End => self.altered_end,
        }
    }

    #[must_use]
    pub fn bend(&self, end: SegmentEnd) -> Option<Point> {
        match end {
            SegmentEnd::Start => self.start_bend,
            SegmentEnd::End => self.end_bend,
        }
    }

    #[must_use]
    pub fn link(&self, end: SegmentEnd) -> Option<SegmentId> {
        match end {
            SegmentEnd::Start => self.previous,
            SegmentEnd::End => self.next,
        }
    }

    #[must_use]
    pub fn edge(&self, end: SegmentEnd) -> EdgeRef {
        match end {
            SegmentEnd::Start => self.start_edge,
            SegmentEnd::End => self.end_edge,
        }
    }

    fn altered_mut(&mut self, end: SegmentEnd) -> &mut Point {
        match end {
            SegmentEnd::Start => &mut self.altered_start,
            SegmentEnd::End => &mut self.altered_end,
        }
    }

    fn bend_mut(&mut self, end: SegmentEnd) -> &mut Option<Point> {
        match end {
            SegmentEnd::Start => &mut self.start_bend,
            SegmentEnd::End => &mut self.end_bend,
        }
    }

    fn link_mut(&mut self, end: SegmentEnd) -> &mut Option<SegmentId> {
        match end {
            SegmentEnd::Start => &mut self.previous,
            SegmentEnd::End => &mut self.next,
        }
    }

    /// Appends the printed points of this segment when entered at `entry`,
    /// skipping repeats of the last point.
    fn append_points(&self, entry: SegmentEnd, points: &mut Polyline) {
        let exit = entry.opposite();
        let sequence = [
            self.bend(entry),
            Some(self.altered(entry)),
            Some(self.altered(exit)),
            self.bend(exit),
        ];
        for p in sequence.into_iter().flatten() {
            if points.last() != Some(&p) {
                points.push(p);
            }
        }
    }
}

/// One segment end: the segment and which of its ends.
type EndRef = (SegmentId, SegmentEnd);

/// The walk state while following the boundary from an unmatched crossing.
#[derive(Debug)]
struct OpenConnection {
    origin: EndRef,
    tip: EndRef,
    /// Connectors added along the boundary since `origin`.
    tail: Vec<SegmentId>,
}

/// Connection graph of infill segments and the boundary connectors
/// between them.
#[derive(Debug)]
pub struct SegmentGraph<'a> {
    outline: &'a [Polygon],
    segments: SlotMap<SegmentId, InfillLineSegment>,
    /// For every boundary edge, the infill ends lying on it.
    crossings: Vec<Vec<Vec<EndRef>>>,
    /// Union-find parents over infill segments; connected lines share a root.
    groups: SecondaryMap<SegmentId, SegmentId>,
}

impl<'a> SegmentGraph<'a> {
    /// Builds an unconnected graph from scan segments whose ends lie on
    /// `outline`.
    #[must_use]
    pub fn new(outline: &'a [Polygon], scan_segments: &[ScanSegment]) -> Self {
        let mut graph = Self {
            outline,
            segments: SlotMap::with_key(),
            crossings: outline.iter().map(|ring| vec![Vec::new(); ring.len()]).collect(),
            groups: SecondaryMap::new(),
        };
        for s in scan_segments {
            let id = graph.segments.insert(InfillLineSegment::new(
                s.start,
                s.start_edge,
                s.end,
                s.end_edge,
                SegmentKind::Infill,
            ));
            graph.groups.insert(id, id);
            for end in [SegmentEnd::Start, SegmentEnd::End] {
                let edge = if end == SegmentEnd::Start {
                    s.start_edge
                } else {
                    s.end_edge
                };
                if let Some(list) = graph
                    .crossings
                    .get_mut(edge.polygon)
                    .and_then(|ring| ring.get_mut(edge.edge))
                {
                    list.push((id, end));
                }
            }
        }
        graph
    }

    /// Returns the segment, or an error if it is not in the graph.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::MissingSegment`] for a stale id.
    pub fn segment(&self, id: SegmentId) -> Result<&InfillLineSegment> {
        Ok(self.segments.get(id).ok_or(ConnectError::MissingSegment)?)
    }

    fn segment_mut(&mut self, id: SegmentId) -> Result<&mut InfillLineSegment> {
        Ok(self.segments.get_mut(id).ok_or(ConnectError::MissingSegment)?)
    }

    /// Iterates over all segments.
    pub fn segments(&self) -> impl Iterator<Item = (SegmentId, &InfillLineSegment)> {
        self.segments.iter()
    }

    /// Adds a connector and returns its id.
    pub fn add_connector(
        &mut self,
        start: Point,
        start_edge: EdgeRef,
        end: Point,
        end_edge: EdgeRef,
    ) -> SegmentId {
        self.segments.insert(InfillLineSegment::new(
            start,
            start_edge,
            end,
            end_edge,
            SegmentKind::Connector,
        ))
    }

    /// Links two segment ends to each other.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::AlreadyLinked`] if either end already has a
    /// neighbour; a segment end joins at most one other.
    pub fn link(&mut self, a: EndRef, b: EndRef) -> Result<()> {
        for (this, other) in [(a, b), (b, a)] {
            let slot = self.segment_mut(this.0)?.link_mut(this.1);
            if slot.is_some() {
                return Err(ConnectError::AlreadyLinked { end: this.1 }.into());
            }
            *slot = Some(other.0);
        }
        Ok(())
    }

    fn find(&mut self, id: SegmentId) -> SegmentId {
        let mut root = id;
        while let Some(&parent) = self.groups.get(root) {
            if parent == root {
                break;
            }
            root = parent;
        }
        let mut current = id;
        while current != root {
            match self.groups.insert(current, root) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        root
    }

    fn unite(&mut self, a: SegmentId, b: SegmentId) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.groups.insert(rb, ra);
        }
    }

    /// Walks every boundary ring and joins consecutive infill ends.
    ///
    /// Along each ring, an unmatched end is carried forward, adding a
    /// connector at every vertex passed, until the next end of a line that
    /// is not already part of the same chain is reached. Ends of the same
    /// chain met on the way are passed through, not joined. An end still
    /// unmatched when the ring is complete has its connectors removed
    /// again.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnectError`] if the graph topology is inconsistent.
    pub fn connect(&mut self) -> Result<()> {
        let outline = self.outline;
        for (polygon, ring) in outline.iter().enumerate() {
            let n = ring.len();
            let mut open: Option<OpenConnection> = None;
            for edge in 0..n {
                let edge_ref = EdgeRef { polygon, edge };
                let edge_start = ring[edge];
                let vertex_after = ring[(edge + 1) % n];
                let on_edge = self
                    .crossings
                    .get_mut(polygon)
                    .and_then(|r| r.get_mut(edge))
                    .map(std::mem::take)
                    .unwrap_or_default();
                let mut keyed = Vec::with_capacity(on_edge.len());
                for &(id, end) in &on_edge {
                    keyed.push((vsize2(self.segment(id)?.point(end) - edge_start), (id, end)));
                }
                keyed.sort_by_key(|&(dist2, _)| dist2);

                for (_, crossing) in keyed {
                    let Some(mut connection) = open.take() else {
                        open = Some(OpenConnection {
                            origin: crossing,
                            tip: crossing,
                            tail: Vec::new(),
                        });
                        continue;
                    };
                    if self.find(connection.origin.0) == self.find(crossing.0) {
                        // Run through the end rather than past it, so the
                        // connector shares its point instead of grazing it.
                        let through = self.segment(crossing.0)?.point(crossing.1);
                        self.extend(&mut connection, through, edge_ref, edge_ref)?;
                        open = Some(connection);
                        continue;
                    }
                    self.join(connection.tip, crossing, edge_ref)?;
                    self.unite(connection.origin.0, crossing.0);
                }

                if let Some(connection) = open.as_mut() {
                    let next_edge = EdgeRef {
                        polygon,
                        edge: (edge + 1) % n,
                    };
                    self.extend(connection, vertex_after, edge_ref, next_edge)?;
                }
            }
            if let Some(connection) = open {
                self.roll_back(connection)?;
            }
        }
        Ok(())
    }

    /// Carries an open connection on to `to` with one more connector.
    fn extend(
        &mut self,
        connection: &mut OpenConnection,
        to: Point,
        from_edge: EdgeRef,
        to_edge: EdgeRef,
    ) -> Result<()> {
        let tip_point = self.segment(connection.tip.0)?.point(connection.tip.1);
        if tip_point == to {
            return Ok(());
        }
        let id = self.add_connector(tip_point, from_edge, to, to_edge);
        self.link(connection.tip, (id, SegmentEnd::Start))?;
        connection.tip = (id, SegmentEnd::End);
        connection.tail.push(id);
        Ok(())
    }

    /// Joins `from` to `to` with a connector along `edge`, or directly when
    /// the two ends coincide.
    fn join(&mut self, from: EndRef, to: EndRef, edge: EdgeRef) -> Result<()> {
        let a = self.segment(from.0)?.point(from.1);
        let b = self.segment(to.0)?.point(to.1);
        if a == b {
            return self.link(from, to);
        }
        let id = self.add_connector(a, edge, b, edge);
        self.link(from, (id, SegmentEnd::Start))?;
        self.link((id, SegmentEnd::End), to)
    }

    fn roll_back(&mut self, connection: OpenConnection) -> Result<()> {
        if connection.tail.is_empty() {
            return Ok(());
        }
        trace!(connectors = connection.tail.len(), "removing dangling connectors");
        for id in connection.tail {
            self.segments.remove(id);
        }
        *self
            .segment_mut(connection.origin.0)?
            .link_mut(connection.origin.1) = None;
        Ok(())
    }

    /// Which end of `id` links to `neighbour`.
    fn end_linked_to(&self, id: SegmentId, neighbour: SegmentId) -> Result<SegmentEnd> {
        let s = self.segment(id)?;
        if s.previous == Some(neighbour) {
            Ok(SegmentEnd::Start)
        } else if s.next == Some(neighbour) {
            Ok(SegmentEnd::End)
        } else {
            Err(ConnectError::BrokenChain.into())
        }
    }

    /// Follows connectors from `(id, end)` to the next infill segment.
    ///
    /// Returns the connectors passed (with the end each was entered at) and
    /// the infill end reached, or `None` when the chain ends first.
    fn follow_to_infill(&self, from: EndRef) -> Result<Option<(Vec<EndRef>, EndRef)>> {
        let mut previous = from.0;
        let mut current = self.segment(from.0)?.link(from.1);
        let mut connectors = Vec::new();
        while let Some(id) = current {
            let entry = self.end_linked_to(id, previous)?;
            let s = self.segment(id)?;
            if s.kind == SegmentKind::Infill {
                return Ok(Some((connectors, (id, entry))));
            }
            connectors.push((id, entry));
            if connectors.len() > self.segments.len() {
                return Err(ConnectError::BrokenChain.into());
            }
            previous = id;
            current = s.link(entry.opposite());
        }
        Ok(None)
    }

    /// Removes crossings between pairs of linked infill lines near the
    /// boundary.
    ///
    /// Two lines joined through the boundary whose joined ends lie less
    /// than half a `line_distance` apart, and which cross each other at `X`,
    /// form a small loop at the boundary. Both lines are cut back to
    /// `distance` before `X`. From there each runs to a bend point beside
    /// the bisector of the crossing, `distance` past `X` and `distance / 2`
    /// to its side, so the connection runs around the crossing at
    /// `distance` from it instead of through it. Resolved pairs no longer
    /// cross, so a second pass changes nothing.
    ///
    /// Returns the number of crossings resolved.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnectError`] if the graph topology is inconsistent.
    pub fn resolve_crossings(&mut self, line_distance: Coord, distance: Coord) -> Result<usize> {
        let infill: Vec<SegmentId> = self
            .segments
            .iter()
            .filter(|(_, s)| s.kind == SegmentKind::Infill)
            .map(|(id, _)| id)
            .collect();
        let max_gap2 = line_distance * line_distance / 4;
        let mut resolved = 0;
        for a in infill {
            for a_end in [SegmentEnd::Start, SegmentEnd::End] {
                let Some((connectors, b)) = self.follow_to_infill((a, a_end))? else {
                    continue;
                };
                // Every pair is seen from both sides; handle it once.
                if b.0 <= a {
                    continue;
                }
                if self.resolve_pair((a, a_end), b, &connectors, max_gap2, distance)? {
                    resolved += 1;
                }
            }
        }
        Ok(resolved)
    }

    fn resolve_pair(
        &mut self,
        a: EndRef,
        b: EndRef,
        connectors: &[EndRef],
        max_gap2: Coord,
        distance: Coord,
    ) -> Result<bool> {
        let sa = self.segment(a.0)?;
        let sb = self.segment(b.0)?;
        let (a_tip, a_far) = (sa.altered(a.1), sa.altered(a.1.opposite()));
        let (b_tip, b_far) = (sb.altered(b.1), sb.altered(b.1.opposite()));
        if vsize2(a_tip - b_tip) >= max_gap2 {
            return Ok(false);
        }
        let Some(intersect) = segment_intersection(a_far, a_tip, b_far, b_tip) else {
            return Ok(false);
        };

        let bisector = bisector_vector(intersect, a_tip, b_tip, distance);
        if bisector == Point::default() {
            return Ok(false);
        }
        let perpendicular = normal(turn90_ccw(bisector), distance / 2);
        let a_side = if dot(perpendicular, a_tip - intersect) > 0 {
            -perpendicular
        } else {
            perpendicular
        };
        let b_side = -a_side;

        let cut = |far: Point, tip: Point| {
            point_on_segment_with_dist(intersect, far, tip, distance)
                .filter(|&p| strictly_before(p, far, intersect))
        };
        let (Some(new_a), Some(new_b)) = (cut(a_far, a_tip), cut(b_far, b_tip)) else {
            return Ok(false);
        };
        let bend_a = intersect + bisector + a_side;
        let bend_b = intersect + bisector + b_side;
        trace!(?intersect, ?bend_a, ?bend_b, "resolving crossing");

        let sa = self.segment_mut(a.0)?;
        *sa.altered_mut(a.1) = new_a;
        *sa.bend_mut(a.1) = Some(bend_a);
        let sb = self.segment_mut(b.0)?;
        *sb.altered_mut(b.1) = new_b;
        *sb.bend_mut(b.1) = Some(bend_b);
        for (i, &(id, entry)) in connectors.iter().enumerate() {
            let s = self.segment_mut(id)?;
            *s.altered_mut(entry) = if i == 0 { bend_a } else { bend_b };
            *s.altered_mut(entry.opposite()) = bend_b;
        }
        Ok(true)
    }

    /// Emits every chain: open chains as polylines, cycles as polygons.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::BrokenChain`] if a link is not mirrored by
    /// the neighbour it points to.
    pub fn into_paths(self) -> Result<(Vec<Polyline>, Polygons)> {
        let ids: Vec<SegmentId> = self.segments.keys().collect();
        let mut visited: SecondaryMap<SegmentId, ()> = SecondaryMap::new();
        let mut lines = Vec::new();
        let mut polygons = Vec::new();

        for &id in &ids {
            if visited.contains_key(id) {
                continue;
            }
            let s = self.segment(id)?;
            let entry = if s.previous.is_none() {
                SegmentEnd::Start
            } else if s.next.is_none() {
                SegmentEnd::End
            } else {
                continue;
            };
            let points = self.walk_chain(id, entry, &mut visited)?;
            if points.len() >= 2 {
                lines.push(points);
            }
        }

        for &id in &ids {
            if visited.contains_key(id) {
                continue;
            }
            let mut points = self.walk_chain(id, SegmentEnd::Start, &mut visited)?;
            if points.len() > 1 && points.first() == points.last() {
                points.pop();
            }
            if points.len() >= 3 {
                polygons.push(points);
            } else if points.len() == 2 {
                lines.push(points);
            }
        }
        Ok((lines, polygons))
    }

    fn walk_chain(
        &self,
        first: SegmentId,
        first_entry: SegmentEnd,
        visited: &mut SecondaryMap<SegmentId, ()>,
    ) -> Result<Polyline> {
        let mut points = Vec::new();
        let (mut id, mut entry) = (first, first_entry);
        loop {
            visited.insert(id, ());
            let s = self.segment(id)?;
            s.append_points(entry, &mut points);
            let Some(next) = s.link(entry.opposite()) else {
                break;
            };
            if visited.contains_key(next) {
                break;
            }
            entry = self.end_linked_to(next, id)?;
            id = next;
        }
        Ok(points)
    }
}

/// Whether `p` lies on the open stretch from `from` towards `to`.
fn strictly_before(p: Point, from: Point, to: Point) -> bool {
    let direction = to - from;
    let t = i128::from(dot(p - from, direction));
    t > 0 && t < i128::from(vsize2(direction))
}

/// Joins scan segments into long polylines along the region boundary.
///
/// The result contains every input segment exactly once, possibly
/// shortened where two joined lines would cross near the boundary. Chains
/// that close on themselves come back as polygons.
#[derive(Debug)]
pub struct ConnectLines<'a> {
    outline: &'a [Polygon],
    segments: &'a [ScanSegment],
    line_distance: Coord,
    bend_distance: Coord,
}

impl<'a> ConnectLines<'a> {
    /// Creates a new connect operation. Crossings are resolved between
    /// lines whose joined ends lie within half a `line_distance`;
    /// `bend_distance` is how far the detour stays from the crossing point.
    #[must_use]
    pub fn new(
        outline: &'a [Polygon],
        segments: &'a [ScanSegment],
        line_distance: Coord,
        bend_distance: Coord,
    ) -> Self {
        Self {
            outline,
            segments,
            line_distance,
            bend_distance,
        }
    }

    /// Executes the connection, returning `(polylines, polygons)`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::InfillError::Connect`] if the connection graph
    /// becomes inconsistent.
    pub fn execute(&self) -> Result<(Vec<Polyline>, Polygons)> {
        let mut graph = SegmentGraph::new(self.outline, self.segments);
        graph.connect()?;
        let resolved = graph.resolve_crossings(self.line_distance, self.bend_distance)?;
        trace!(segments = self.segments.len(), resolved, "lines connected");
        graph.into_paths()
    }
}
