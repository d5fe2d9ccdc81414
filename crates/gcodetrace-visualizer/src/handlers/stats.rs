//! Statistics sink: distances, time estimate, event counts and tool changes

use gcodetrace_core::{MotionMode, Position};
use glam::DVec3;
use tracing::trace;

use super::MotionHandler;
use crate::gcode::estimate::{Estimates, Estimator};
use crate::gcode::modal::ModalState;
use crate::gcode::report::{EventCounts, SegmentKind, ToolChangeRecord};
use crate::geometry::arc::{tessellate_arc_into, ArcParams};
use crate::geometry::Bounds;

#[derive(Debug, Clone, Default)]
pub struct StatsHandler {
    estimator: Estimator,
    counts: EventCounts,
    tool_changes: Vec<ToolChangeRecord>,
    bounds: Bounds,
    cutting_bounds: Bounds,
    scratch: Vec<DVec3>,
}

fn xyz(p: &Position) -> DVec3 {
    DVec3::new(p.x, p.y, p.z)
}

fn delta(from: &Position, to: &Position) -> [f64; 4] {
    [to.x - from.x, to.y - from.y, to.z - from.z, to.a - from.a]
}

impl StatsHandler {
    pub fn new(estimator: Estimator) -> Self {
        Self {
            estimator,
            ..Self::default()
        }
    }

    pub fn estimates(&self) -> Estimates {
        self.estimator.estimates()
    }

    pub fn counts(&self) -> EventCounts {
        self.counts
    }

    pub fn tool_changes(&self) -> &[ToolChangeRecord] {
        &self.tool_changes
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds.finished()
    }

    pub fn cutting_bounds(&self) -> Option<Bounds> {
        self.cutting_bounds.finished()
    }

    /// Account for a G4 pause
    pub fn add_dwell(&mut self, seconds: f64) {
        self.estimator.add_dwell(seconds);
    }

    fn extend_bounds(&mut self, kind: SegmentKind, points: &[DVec3]) {
        for p in points {
            self.bounds.update_point(*p);
            if kind != SegmentKind::Rapid {
                self.cutting_bounds.update_point(*p);
            }
        }
    }

    fn record(
        &mut self,
        modal: &ModalState,
        kind: SegmentKind,
        from: &Position,
        to: &Position,
        length: f64,
    ) {
        self.counts.record(kind);
        self.estimator.add_segment(modal, kind, delta(from, to), length);
    }
}

impl MotionHandler for StatsHandler {
    fn add_line(&mut self, modal: ModalState, from: Position, to: Position) {
        let kind = if modal.motion.is_rapid() {
            SegmentKind::Rapid
        } else {
            SegmentKind::Linear
        };
        self.record(&modal, kind, &from, &to, from.distance_to(&to));
        self.extend_bounds(kind, &[xyz(&from), xyz(&to)]);
    }

    fn add_arc_curve(&mut self, modal: ModalState, from: Position, to: Position, center: Position) {
        let clockwise = modal.motion == MotionMode::ArcCw;
        let (c, f, t) = (xyz(&center), xyz(&from), xyz(&to));
        let arc = ArcParams::new(c, f, t, clockwise, modal.plane);
        trace!(
            "Arc r={:.4} sweep={:.4} length={:.4}",
            arc.radius,
            arc.sweep,
            arc.length()
        );
        self.record(&modal, SegmentKind::Arc, &from, &to, arc.length());

        let mut points = std::mem::take(&mut self.scratch);
        tessellate_arc_into(c, f, t, clockwise, modal.plane, &mut points);
        self.extend_bounds(SegmentKind::Arc, &points);
        self.scratch = points;
    }

    fn add_curve(&mut self, modal: ModalState, from: Position, to: Position) {
        let linear = from.distance_to(&to);
        // a pure rotation travels in degrees
        let length = if linear > 0.0 {
            linear
        } else {
            (to.a - from.a).abs()
        };
        let kind = if modal.motion.is_rapid() {
            SegmentKind::Rapid
        } else {
            SegmentKind::Curve
        };
        self.record(&modal, kind, &from, &to, length);
        self.extend_bounds(kind, &[xyz(&from), xyz(&to)]);
    }

    fn on_tool_change(&mut self, change: &ToolChangeRecord) {
        self.tool_changes.push(*change);
    }
}
