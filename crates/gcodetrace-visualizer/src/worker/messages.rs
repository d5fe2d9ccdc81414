//! Worker message contract
//!
//! Field names follow the camelCase wire format consumed by hosts.

use chrono::{DateTime, Utc};
use gcodetrace_core::ThemeColors;
use serde::{Deserialize, Serialize};

use crate::gcode::estimate::{AxisRates, Estimates};
use crate::gcode::report::{FileStats, InvalidLine, ToolChangeRecord};
use crate::geometry::Bounds;

/// Input of one parse job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobRequest {
    pub content: String,
    pub is_laser: bool,
    #[serde(rename = "shouldIncludeSVG")]
    pub should_include_svg: bool,
    /// Return the flattened XY outline points in `GeometryInfo::points`
    pub collect_points: bool,
    pub needs_visualization: bool,
    pub accelerations: Option<AxisRates>,
    pub max_feedrates: Option<AxisRates>,
    pub default_rapid_rate: Option<f64>,
    pub atc_enabled: bool,
    pub rotary_diameter_offset_enabled: bool,
    pub theme: Option<ThemeColors>,
    pub job_id: u64,
    /// Fold geometry and metadata into a single `parsed` message
    pub legacy_messages: bool,
}

impl Default for JobRequest {
    fn default() -> Self {
        Self {
            content: String::new(),
            is_laser: false,
            should_include_svg: false,
            collect_points: false,
            needs_visualization: true,
            accelerations: None,
            max_feedrates: None,
            default_rapid_rate: None,
            atc_enabled: false,
            rotary_diameter_offset_enabled: false,
            theme: None,
            job_id: 0,
            legacy_messages: false,
        }
    }
}

impl JobRequest {
    pub fn new(content: impl Into<String>, job_id: u64) -> Self {
        Self {
            content: content.into(),
            job_id,
            ..Self::default()
        }
    }
}

/// Summary sent with the geometry buffers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryInfo {
    pub toolchanges: Vec<ToolChangeRecord>,
    /// Number of motion events
    pub total: u64,
    pub invalid_lines: Vec<InvalidLine>,
    /// Extent of cutting moves
    pub bounds: Option<Bounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg: Option<String>,
    /// Interleaved XY points of cutting moves, when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<f64>>,
}

/// Interpretation results sent with `metadataReady`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedData {
    pub estimates: Estimates,
    pub info: FileStats,
    pub invalid_lines: Vec<InvalidLine>,
}

/// Timing of a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub started_at: DateTime<Utc>,
    pub parse_ms: f64,
    pub lines_per_second: f64,
}

/// Output of a parse job, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum WorkerMessage {
    Progress {
        /// Percentage, never decreasing within a job
        progress: u8,
        job_id: u64,
    },
    GeometryReady {
        vertices: Vec<f32>,
        colors: Vec<f32>,
        frames: Vec<u32>,
        info: GeometryInfo,
        needs_visualization: bool,
        job_id: u64,
    },
    MetadataReady {
        parsed_data: ParsedData,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        profile: Option<Profile>,
        job_id: u64,
    },
    /// Geometry and metadata in one message
    Parsed {
        vertices: Vec<f32>,
        colors: Vec<f32>,
        frames: Vec<u32>,
        info: GeometryInfo,
        parsed_data: ParsedData,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        profile: Option<Profile>,
        job_id: u64,
    },
}

impl WorkerMessage {
    pub fn job_id(&self) -> u64 {
        match self {
            Self::Progress { job_id, .. }
            | Self::GeometryReady { job_id, .. }
            | Self::MetadataReady { job_id, .. }
            | Self::Parsed { job_id, .. } => *job_id,
        }
    }

    /// True for the message that completes a job
    pub fn is_final(&self) -> bool {
        matches!(self, Self::MetadataReady { .. } | Self::Parsed { .. })
    }
}
