//! Shared numeric constants for interpretation and tessellation.

/// Millimetres per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Number of line segments used to approximate a planar arc.
pub const ARC_DIVISIONS: usize = 30;

/// Angular step used when tessellating helical and rotary sweeps.
pub const DEGREES_PER_SEGMENT: f64 = 5.0;

/// Lower bound on segments for a rotary sweep.
pub const MIN_ROTARY_SEGMENTS: usize = 8;

/// Upper bound on segments for a rotary sweep (100 turns at 5 degrees).
pub const MAX_ROTARY_SEGMENTS: usize = 7200;

/// A-axis changes at or below this many degrees are treated as no rotation.
pub const ROTARY_EPSILON_DEG: f64 = 1e-6;

/// Start and end angles closer than this (radians) describe a full circle.
pub const FULL_CIRCLE_EPSILON: f64 = 1e-9;

/// Alpha applied to rapid (G0) segments.
pub const RAPID_OPACITY: f32 = 0.5;

/// Alpha applied to cutting segments.
pub const CUTTING_OPACITY: f32 = 1.0;

/// Rapid traverse rate (mm/min) assumed when no max-feedrate table is supplied.
pub const DEFAULT_RAPID_RATE: f64 = 3000.0;
