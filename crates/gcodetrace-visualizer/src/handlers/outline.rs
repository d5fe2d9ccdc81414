//! Outline sink: extent of the cut, flattened XY points and SVG path data
//!
//! Rapid moves are skipped entirely. Coordinates are logical machine
//! coordinates; the SVG path flips Y so the drawing reads like the table
//! seen from above.

use std::f64::consts::PI;
use std::fmt::Write;

use gcodetrace_core::{MotionMode, Plane, Position};
use glam::DVec3;
use tracing::{debug, trace};

use super::MotionHandler;
use crate::gcode::modal::ModalState;
use crate::geometry::arc::{tessellate_arc_into, ArcParams};
use crate::geometry::rotary::rotary_segments;
use crate::geometry::Bounds;

const MIN_SVG_ARC_RADIUS: f64 = 0.001;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutlineOptions {
    /// Keep every cutting point as flat `[x0, y0, x1, y1, ...]`
    pub collect_points: bool,
    pub include_svg: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutlineResult {
    pub bounds: Option<Bounds>,
    pub points: Vec<f64>,
    pub svg: Option<String>,
}

#[derive(Debug, Default)]
pub struct OutlineHandler {
    options: OutlineOptions,
    bounds: Bounds,
    points: Vec<f64>,
    svg: String,
    last_pos: Option<DVec3>,
    scratch: Vec<DVec3>,
}

impl OutlineHandler {
    pub fn new(options: OutlineOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds.finished()
    }

    pub fn svg_path(&self) -> &str {
        &self.svg
    }

    pub fn finish(self) -> OutlineResult {
        debug!(
            "Outline: {} points, {} bytes of SVG path",
            self.points.len() / 2,
            self.svg.len()
        );
        OutlineResult {
            bounds: self.bounds.finished(),
            points: self.points,
            svg: self.options.include_svg.then_some(self.svg),
        }
    }

    fn add_point(&mut self, p: DVec3) {
        self.bounds.update_point(p);
        if self.options.collect_points {
            self.points.extend_from_slice(&[p.x, p.y]);
        }
    }

    fn move_to_if_needed(&mut self, from: DVec3) {
        if self.last_pos != Some(from) {
            let _ = write!(self.svg, "M {:.2} {:.2} ", from.x, -from.y);
        }
    }

    /// Record a polyline held in `scratch`
    fn add_polyline(&mut self) {
        let points = std::mem::take(&mut self.scratch);
        for p in &points {
            self.add_point(*p);
        }
        if self.options.include_svg {
            if let (Some(first), Some(last)) = (points.first(), points.last()) {
                self.move_to_if_needed(*first);
                for p in &points[1..] {
                    let _ = write!(self.svg, "L {:.2} {:.2} ", p.x, -p.y);
                }
                self.last_pos = Some(*last);
            }
        }
        self.scratch = points;
    }
}

fn xyz(p: &Position) -> DVec3 {
    DVec3::new(p.x, p.y, p.z)
}

impl MotionHandler for OutlineHandler {
    fn add_line(&mut self, modal: ModalState, from: Position, to: Position) {
        if modal.motion.is_rapid() {
            self.last_pos = None;
            return;
        }
        self.scratch.clear();
        self.scratch.extend_from_slice(&[xyz(&from), xyz(&to)]);
        self.add_polyline();
    }

    fn add_arc_curve(&mut self, modal: ModalState, from: Position, to: Position, center: Position) {
        let clockwise = modal.motion == MotionMode::ArcCw;
        let (c, f, t) = (xyz(&center), xyz(&from), xyz(&to));
        tessellate_arc_into(c, f, t, clockwise, modal.plane, &mut self.scratch);

        let arc = ArcParams::new(c, f, t, clockwise, modal.plane);
        let drawable = modal.plane == Plane::XY
            && arc.radius.is_finite()
            && arc.radius > MIN_SVG_ARC_RADIUS
            && arc.sweep.abs() < 2.0 * PI;

        if !(self.options.include_svg && drawable) {
            self.add_polyline();
            return;
        }

        let points = std::mem::take(&mut self.scratch);
        for p in &points {
            self.add_point(*p);
        }
        self.scratch = points;
        self.move_to_if_needed(f);
        let large_arc = u8::from(arc.sweep.abs() > PI);
        // SVG sweep flag is mirrored by the flipped Y axis
        let sweep = u8::from(!clockwise);
        let _ = write!(
            self.svg,
            "A {:.2} {:.2} 0 {} {} {:.2} {:.2} ",
            arc.radius, arc.radius, large_arc, sweep, t.x, -t.y
        );
        trace!("Outline arc r={:.4} sweep={:.4}", arc.radius, arc.sweep);
        self.last_pos = Some(t);
    }

    fn add_curve(&mut self, modal: ModalState, from: Position, to: Position) {
        if modal.motion.is_rapid() {
            self.last_pos = None;
            return;
        }
        let segments = rotary_segments(to.a - from.a);
        self.scratch.clear();
        self.scratch
            .extend((0..=segments).map(|i| xyz(&from.lerp(&to, i as f64 / segments as f64))));
        self.add_polyline();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modal(motion: MotionMode) -> ModalState {
        ModalState {
            motion,
            ..ModalState::default()
        }
    }

    #[test]
    fn test_rapids_do_not_extend_bounds() {
        let mut outline = OutlineHandler::default();
        outline.add_line(
            modal(MotionMode::Rapid),
            Position::default(),
            Position::new(100.0, 100.0, 0.0),
        );
        assert_eq!(outline.bounds(), None);

        outline.add_line(
            modal(MotionMode::Linear),
            Position::new(1.0, 2.0, 0.0),
            Position::new(3.0, -4.0, -1.0),
        );
        let b = outline.bounds().unwrap();
        assert_eq!((b.min_x, b.max_x, b.min_y, b.max_y), (1.0, 3.0, -4.0, 2.0));
        assert_eq!((b.min_z, b.max_z), (-1.0, 0.0));
    }

    #[test]
    fn test_arc_extends_past_endpoints() {
        let mut outline = OutlineHandler::default();
        outline.add_arc_curve(
            modal(MotionMode::ArcCw),
            Position::default(),
            Position::new(10.0, 0.0, 0.0),
            Position::new(5.0, 0.0, 0.0),
        );
        let b = outline.bounds().unwrap();
        assert!((b.max_y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_svg_path_joins_contiguous_moves() {
        let mut outline = OutlineHandler::new(OutlineOptions {
            include_svg: true,
            ..OutlineOptions::default()
        });
        let linear = modal(MotionMode::Linear);
        outline.add_line(linear, Position::default(), Position::new(10.0, 0.0, 0.0));
        outline.add_line(
            linear,
            Position::new(10.0, 0.0, 0.0),
            Position::new(10.0, 5.0, 0.0),
        );
        assert_eq!(
            outline.svg_path(),
            "M 0.00 -0.00 L 10.00 -0.00 L 10.00 -5.00 "
        );
    }

    #[test]
    fn test_svg_arc_command() {
        let mut outline = OutlineHandler::new(OutlineOptions {
            include_svg: true,
            ..OutlineOptions::default()
        });
        outline.add_arc_curve(
            modal(MotionMode::ArcCw),
            Position::default(),
            Position::new(10.0, 0.0, 0.0),
            Position::new(5.0, 0.0, 0.0),
        );
        assert!(outline.svg_path().contains("A 5.00 5.00 0 0 0 10.00 -0.00"));
    }

    #[test]
    fn test_collect_points_and_finish() {
        let mut outline = OutlineHandler::new(OutlineOptions {
            collect_points: true,
            include_svg: false,
        });
        outline.add_line(
            modal(MotionMode::Linear),
            Position::default(),
            Position::new(1.0, 2.0, 0.0),
        );
        let result = outline.finish();
        assert_eq!(result.points, vec![0.0, 0.0, 1.0, 2.0]);
        assert_eq!(result.svg, None);
    }
}
