//! Data models for positions and modal values
//!
//! This module provides:
//! - Position tracking with full 6-axis support (X, Y, Z, A, B, C)
//! - Unit management (MM, INCH)
//! - Modal group enumerations (motion, plane, distance, feed-rate mode)

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::MM_PER_INCH;

/// Machine coordinate units (millimeters or inches)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Units {
    /// Millimeters (G21)
    #[default]
    MM,
    /// Inches (G20)
    INCH,
}

impl Units {
    /// Convert a value from one unit to another
    pub fn convert(value: f64, from: Units, to: Units) -> f64 {
        match (from, to) {
            (Units::MM, Units::INCH) => value / MM_PER_INCH,
            (Units::INCH, Units::MM) => value * MM_PER_INCH,
            _ => value,
        }
    }

    /// Convert a value expressed in these units to millimeters
    #[inline]
    pub fn to_mm(self, value: f64) -> f64 {
        Self::convert(value, self, Units::MM)
    }

    /// The G-code word that selects these units
    pub fn gcode(self) -> &'static str {
        match self {
            Units::MM => "G21",
            Units::INCH => "G20",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Units::MM => write!(f, "mm"),
            Units::INCH => write!(f, "in"),
        }
    }
}

/// Motion mode - modal group 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MotionMode {
    /// G0 rapid positioning
    #[default]
    Rapid,
    /// G1 linear interpolation
    Linear,
    /// G2 clockwise arc
    ArcCw,
    /// G3 counter-clockwise arc
    ArcCcw,
}

impl MotionMode {
    /// Map a G number onto a motion mode
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Rapid),
            1 => Some(Self::Linear),
            2 => Some(Self::ArcCw),
            3 => Some(Self::ArcCcw),
            _ => None,
        }
    }

    pub fn gcode(self) -> &'static str {
        match self {
            Self::Rapid => "G0",
            Self::Linear => "G1",
            Self::ArcCw => "G2",
            Self::ArcCcw => "G3",
        }
    }

    pub fn is_rapid(self) -> bool {
        self == Self::Rapid
    }

    pub fn is_arc(self) -> bool {
        matches!(self, Self::ArcCw | Self::ArcCcw)
    }
}

impl fmt::Display for MotionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.gcode())
    }
}

/// Plane selection - modal group 2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Plane {
    /// G17 XY plane
    #[default]
    XY,
    /// G18 ZX plane
    ZX,
    /// G19 YZ plane
    YZ,
}

impl Plane {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            17 => Some(Self::XY),
            18 => Some(Self::ZX),
            19 => Some(Self::YZ),
            _ => None,
        }
    }

    pub fn gcode(self) -> &'static str {
        match self {
            Self::XY => "G17",
            Self::ZX => "G18",
            Self::YZ => "G19",
        }
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.gcode())
    }
}

/// Distance mode - modal group 3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceMode {
    /// G90 absolute coordinates
    #[default]
    Absolute,
    /// G91 incremental coordinates
    Incremental,
}

impl DistanceMode {
    pub fn gcode(self) -> &'static str {
        match self {
            Self::Absolute => "G90",
            Self::Incremental => "G91",
        }
    }
}

/// Feed rate mode - modal group 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FeedRateMode {
    /// G93 inverse time
    InverseTime,
    /// G94 units per minute
    #[default]
    UnitsPerMinute,
}

/// Machine position in millimeters (linear axes) and degrees (rotary axes)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X-axis position
    pub x: f64,
    /// Y-axis position
    pub y: f64,
    /// Z-axis position
    pub z: f64,
    /// A-axis (4th axis) position
    pub a: f64,
    /// B-axis (5th axis) position
    pub b: f64,
    /// C-axis (6th axis) position
    pub c: f64,
}

impl Position {
    /// Create a new position with X, Y, Z coordinates and rotary axes at zero
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            ..Self::default()
        }
    }

    /// Create a position with four axes including the A axis
    pub fn with_a(x: f64, y: f64, z: f64, a: f64) -> Self {
        Self {
            x,
            y,
            z,
            a,
            ..Self::default()
        }
    }

    /// Euclidean distance to another position over the linear axes
    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Linear axes as an array
    pub fn xyz(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Linear interpolation between two positions, `t` in `0.0..=1.0`
    pub fn lerp(&self, other: &Position, t: f64) -> Self {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Self {
            x: mix(self.x, other.x),
            y: mix(self.y, other.y),
            z: mix(self.z, other.z),
            a: mix(self.a, other.a),
            b: mix(self.b, other.b),
            c: mix(self.c, other.c),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a != 0.0 {
            write!(
                f,
                "X:{:.3} Y:{:.3} Z:{:.3} A:{:.3}",
                self.x, self.y, self.z, self.a
            )
        } else {
            write!(f, "X:{:.3} Y:{:.3} Z:{:.3}", self.x, self.y, self.z)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_convert() {
        assert_eq!(Units::INCH.to_mm(1.0), 25.4);
        assert_eq!(Units::MM.to_mm(3.5), 3.5);
        assert!((Units::convert(25.4, Units::MM, Units::INCH) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_motion_mode_codes() {
        assert_eq!(MotionMode::from_code(2), Some(MotionMode::ArcCw));
        assert_eq!(MotionMode::from_code(4), None);
        assert_eq!(MotionMode::Linear.to_string(), "G1");
        assert!(MotionMode::ArcCcw.is_arc());
        assert!(!MotionMode::Linear.is_arc());
    }

    #[test]
    fn test_plane_codes() {
        assert_eq!(Plane::from_code(18), Some(Plane::ZX));
        assert_eq!(Plane::default(), Plane::XY);
        assert_eq!(Plane::YZ.to_string(), "G19");
    }

    #[test]
    fn test_position_distance_ignores_rotary() {
        let a = Position::with_a(0.0, 0.0, 0.0, 0.0);
        let b = Position::with_a(3.0, 4.0, 0.0, 90.0);
        assert_eq!(a.distance_to(&b), 5.0);
    }

    #[test]
    fn test_position_lerp() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::with_a(10.0, -10.0, 2.0, 180.0);
        let mid = a.lerp(&b, 0.5);
        assert_eq!(mid, Position::with_a(5.0, -5.0, 1.0, 90.0));
    }
}
