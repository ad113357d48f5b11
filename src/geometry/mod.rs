pub mod aabb;
pub mod extrusion;

pub use aabb::Aabb;
pub use extrusion::{ExtrusionJunction, ExtrusionLine, VariableWidthLines};
