use tracing::trace;

use crate::math::{Point, Polygon, Polyline};
use crate::operations::clip::ClipPolylines;
use crate::operations::stitch::StitchPolylines;

/// Tree structure of lightning infill for one layer.
///
/// Lightning infill grows trees that only support the overhangs above them;
/// growing the trees needs the whole model and happens before per-layer
/// generation. A layer exposes its trees as parent-to-child edges.
pub trait LightningLayer: Sync {
    fn tree_edges(&self) -> Vec<(Point, Point)>;
}

impl LightningLayer for Vec<(Point, Point)> {
    fn tree_edges(&self) -> Vec<(Point, Point)> {
        self.clone()
    }
}

/// Turns the trees of a lightning layer into polylines inside the region.
///
/// Edges sharing an endpoint are chained into branches; the branches are
/// clipped to the region.
pub struct LightningFill<'a> {
    region: &'a [Polygon],
    layer: &'a dyn LightningLayer,
}

impl std::fmt::Debug for LightningFill<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LightningFill")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl<'a> LightningFill<'a> {
    /// Creates a new lightning fill operation.
    #[must_use]
    pub fn new(region: &'a [Polygon], layer: &'a dyn LightningLayer) -> Self {
        Self { region, layer }
    }

    /// Executes the fill.
    #[must_use]
    pub fn execute(&self) -> Vec<Polyline> {
        let edges: Vec<Polyline> = self
            .layer
            .tree_edges()
            .into_iter()
            .filter(|(parent, child)| parent != child)
            .map(|(parent, child)| vec![parent, child])
            .collect();
        // Only exactly shared endpoints join.
        let (mut branches, rings) = StitchPolylines::new(&edges, 1).execute();
        branches.extend(rings.into_iter().map(|mut ring| {
            if let Some(&first) = ring.first() {
                ring.push(first);
            }
            ring
        }));
        trace!(edges = edges.len(), branches = branches.len(), "lightning branches");
        ClipPolylines::new(self.region, &branches, false)
            .execute()
            .polylines
    }
}
