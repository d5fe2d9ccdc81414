//! Modal state tracking
//!
//! Tracks the active modal groups while interpreting a program. Modal
//! groups persist across lines until changed by another word of the same
//! group. Handlers only ever see copies of this record.

use gcodetrace_core::{DistanceMode, FeedRateMode, MotionMode, Plane, Units};
use serde::{Deserialize, Serialize};

/// Interpreter modal record
///
/// - Motion group (G0, G1, G2, G3)
/// - Plane selection group (G17, G18, G19)
/// - Units group (G20, G21)
/// - Distance mode group (G90, G91)
/// - Feed rate mode group (G93, G94)
/// - Active tool, feed rate and spindle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalState {
    pub motion: MotionMode,
    pub plane: Plane,
    pub units: Units,
    pub distance: DistanceMode,
    pub feed_rate_mode: FeedRateMode,
    /// Active tool number
    pub tool: u32,
    /// Feed rate in mm/min, or the raw inverse-time value under G93
    pub feed_rate: f64,
    pub spindle_on: bool,
    pub spindle_speed: f64,
}

impl Default for ModalState {
    fn default() -> Self {
        Self {
            motion: MotionMode::Rapid,
            plane: Plane::XY,
            units: Units::MM,
            distance: DistanceMode::Absolute,
            feed_rate_mode: FeedRateMode::UnitsPerMinute,
            tool: 0,
            feed_rate: 0.0,
            spindle_on: false,
            spindle_speed: 0.0,
        }
    }
}

impl ModalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a non-motion G code (plane, units, distance, feed mode).
    ///
    /// Returns false when the code belongs to none of these groups.
    pub fn apply_g_code(&mut self, code: u32) -> bool {
        if let Some(plane) = Plane::from_code(code) {
            self.plane = plane;
            return true;
        }
        match code {
            20 => self.units = Units::INCH,
            21 => self.units = Units::MM,
            90 => self.distance = DistanceMode::Absolute,
            91 => self.distance = DistanceMode::Incremental,
            93 => self.feed_rate_mode = FeedRateMode::InverseTime,
            94 => self.feed_rate_mode = FeedRateMode::UnitsPerMinute,
            _ => return false,
        }
        true
    }

    /// True while the laser (or spindle) would be emitting
    pub fn is_beam_on(&self) -> bool {
        self.spindle_on && self.spindle_speed > 0.0
    }

    /// Get a human-readable description of the current motion mode
    pub fn motion_mode_description(&self) -> &'static str {
        match self.motion {
            MotionMode::Rapid => "Rapid positioning (G0)",
            MotionMode::Linear => "Linear interpolation (G1)",
            MotionMode::ArcCw => "Clockwise arc (G2)",
            MotionMode::ArcCcw => "Counter-clockwise arc (G3)",
        }
    }

    /// Get a human-readable description of the current plane
    pub fn plane_description(&self) -> &'static str {
        match self.plane {
            Plane::XY => "XY plane (G17)",
            Plane::ZX => "ZX plane (G18)",
            Plane::YZ => "YZ plane (G19)",
        }
    }

    /// Get a human-readable description of distance mode
    pub fn distance_mode_description(&self) -> &'static str {
        match self.distance {
            DistanceMode::Absolute => "Absolute positioning (G90)",
            DistanceMode::Incremental => "Incremental positioning (G91)",
        }
    }

    /// Get a human-readable description of units
    pub fn units_description(&self) -> &'static str {
        match self.units {
            Units::INCH => "Inches (G20)",
            Units::MM => "Millimeters (G21)",
        }
    }
}
