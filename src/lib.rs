//! Per-layer infill generation for fused-filament slicers.
//!
//! Regions are sets of integer rings, outer rings counter-clockwise and
//! holes clockwise. [`Infill`] fills one layer's region with one of the
//! patterns in [`FillPattern`].

pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;

pub use error::{ConnectError, InfillError, ParameterError, Result};
pub use math::{Coord, Point, Polygon, Polygons, Polyline};
pub use operations::infill::{
    CrossFillProvider, FillPattern, Infill, InfillOutput, InfillParams, InfillProviders,
    LightningLayer, UniformCrossFill, ZigzagConnectorProcessor, ZigzagEndPieces,
};
pub use operations::walls::{InsetWalls, WallGenerator, WallToolpaths};
