//! # GCodeTrace Core
//!
//! Core types and utilities shared by the GCodeTrace crates.
//! Provides machine positions, modal enumerations, unit helpers,
//! the shared color palette, and the unified error types.

pub mod constants;
pub mod data;
pub mod error;
pub mod palette;
pub mod units;

pub use data::{DistanceMode, FeedRateMode, MotionMode, Plane, Position, Units};

pub use error::{Error, GcodeError, JobError, Result};

pub use palette::{Rgba, ThemeColors, TOOL_PALETTE};
