//! Records reported at end of stream

use gcodetrace_core::GcodeError;
use serde::{Deserialize, Serialize};

use super::estimate::Estimates;
use crate::geometry::Bounds;

/// Motion class of an emitted event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SegmentKind {
    Rapid,
    Linear,
    Arc,
    Curve,
}

/// Event counters per motion class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCounts {
    pub rapid: u64,
    pub linear: u64,
    pub arc: u64,
    pub curve: u64,
}

impl EventCounts {
    pub fn record(&mut self, kind: SegmentKind) {
        match kind {
            SegmentKind::Rapid => self.rapid += 1,
            SegmentKind::Linear => self.linear += 1,
            SegmentKind::Arc => self.arc += 1,
            SegmentKind::Curve => self.curve += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.rapid + self.linear + self.arc + self.curve
    }
}

/// Point in the event stream where the active tool changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolChangeRecord {
    /// Index of the first event cut with the new tool
    pub event_index: u64,
    pub tool: u32,
    /// 1-based source line carrying the change
    pub line_number: u32,
}

/// A line that raised at least one diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidLine {
    /// 1-based position in the file
    pub line_number: u32,
    pub content: String,
    pub errors: Vec<GcodeError>,
}

/// Aggregate statistics for one interpreted file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStats {
    pub total_lines: u64,
    /// Total emitted events
    pub total_segments: u64,
    pub counts: EventCounts,
    pub invalid_lines: Vec<InvalidLine>,
    pub tool_changes: Vec<ToolChangeRecord>,
    pub estimates: Estimates,
    /// Extent of every move
    pub bounds: Option<Bounds>,
    /// Extent of non-rapid moves
    pub cutting_bounds: Option<Bounds>,
}
