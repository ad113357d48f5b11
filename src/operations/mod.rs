pub mod clip;
pub mod infill;
pub mod offset;
pub mod stitch;
pub mod walls;
