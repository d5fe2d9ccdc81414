//! Toolpath geometry: arc tessellation, rotary transform and extents

pub mod arc;
pub mod bounds;
pub mod rotary;

pub use arc::{arc_sweep, tessellate_arc, tessellate_arc_into, ArcParams};
pub use bounds::Bounds;
pub use rotary::{
    detect_stock_radius, file_has_y_moves, has_rotary_motion, resolve_stock_radius,
    rotate_around_axis, RotaryAxis, RotaryTransform,
};
