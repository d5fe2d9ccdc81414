//! Rotary-axis (4th axis) transform
//!
//! Maps logical `(x, y, z, a)` poses onto Cartesian points by rotating the
//! linear position about the rotary axis. For lathe-style jobs the cut
//! depth is carried on Z, so the stock radius read from the program's
//! `Cylinder Dia:` annotation can be added to Z before rotating.

use std::sync::OnceLock;

use gcodetrace_core::constants::{
    DEGREES_PER_SEGMENT, MAX_ROTARY_SEGMENTS, MIN_ROTARY_SEGMENTS, ROTARY_EPSILON_DEG,
};
use gcodetrace_core::Position;
use glam::{DQuat, DVec3};
use regex::Regex;
use tracing::{debug, warn};

use crate::gcode::tokenizer::Tokenizer;

/// Axis the A word rotates about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotaryAxis {
    #[default]
    X,
    Y,
    Z,
}

impl RotaryAxis {
    pub fn direction(self) -> DVec3 {
        match self {
            Self::X => DVec3::X,
            Self::Y => DVec3::Y,
            Self::Z => DVec3::Z,
        }
    }
}

/// Rotate the linear part of `pos` by `pos.a` degrees about `axis`
pub fn rotate_around_axis(axis: RotaryAxis, pos: &Position) -> DVec3 {
    let point = DVec3::new(pos.x, pos.y, pos.z);
    if pos.a == 0.0 {
        return point;
    }
    DQuat::from_axis_angle(axis.direction(), pos.a.to_radians()) * point
}

/// Whether the A axis moves between two poses
#[inline]
pub fn has_rotary_motion(from: &Position, to: &Position) -> bool {
    (to.a - from.a).abs() > ROTARY_EPSILON_DEG
}

/// Segment count for a rotary sweep of `delta_a` degrees, clamped to
/// `MIN_ROTARY_SEGMENTS..=MAX_ROTARY_SEGMENTS`
pub fn rotary_segments(delta_a: f64) -> usize {
    if !delta_a.is_finite() {
        return MIN_ROTARY_SEGMENTS;
    }
    let steps = (delta_a.abs() / DEGREES_PER_SEGMENT).ceil();
    if steps >= MAX_ROTARY_SEGMENTS as f64 {
        return MAX_ROTARY_SEGMENTS;
    }
    (steps as usize).max(MIN_ROTARY_SEGMENTS)
}

/// Rotary transform applied to every emitted point
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotaryTransform {
    pub axis: RotaryAxis,
    /// Added to Z before rotation
    pub stock_radius: f64,
}

impl RotaryTransform {
    pub fn new(axis: RotaryAxis, stock_radius: f64) -> Self {
        Self { axis, stock_radius }
    }

    pub fn apply(&self, pos: &Position) -> DVec3 {
        let shifted = Position {
            z: pos.z + self.stock_radius,
            ..*pos
        };
        rotate_around_axis(self.axis, &shifted)
    }

    /// Sweep from `from` to `to` with A interpolated across sub-points.
    ///
    /// Writes `segments + 1` points into `out`, endpoints included.
    pub fn sweep_into(&self, from: &Position, to: &Position, out: &mut Vec<DVec3>) {
        let segments = rotary_segments(to.a - from.a);
        out.clear();
        out.reserve(segments + 1);
        for i in 0..=segments {
            let t = i as f64 / segments as f64;
            out.push(self.apply(&from.lerp(to, t)));
        }
    }

    pub fn sweep(&self, from: &Position, to: &Position) -> Vec<DVec3> {
        let mut points = Vec::new();
        self.sweep_into(from, to, &mut points);
        points
    }
}

fn cylinder_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)Cylinder\s+Dia:\s*([0-9]*\.?[0-9]+)").ok())
        .as_ref()
}

/// Stock diameter from a `Cylinder Dia: <n>` annotation
pub fn detect_stock_diameter(content: &str) -> Option<f64> {
    let captures = cylinder_regex()?.captures(content)?;
    let raw = captures.get(1)?.as_str();
    match raw.parse::<f64>() {
        Ok(dia) if dia.is_finite() && dia > 0.0 => Some(dia),
        _ => {
            warn!("Ignoring unusable Cylinder Dia annotation: {}", raw);
            None
        }
    }
}

/// Stock radius from a `Cylinder Dia: <n>` annotation
pub fn detect_stock_radius(content: &str) -> Option<f64> {
    detect_stock_diameter(content).map(|dia| dia / 2.0)
}

/// Whether any line carries a Y word
pub fn file_has_y_moves(content: &str) -> bool {
    let mut tokenizer = Tokenizer::new();
    content.lines().any(|line| tokenizer.scan(line).contains('Y'))
}

/// Stock radius to add to Z, when the offset applies to this program.
///
/// The offset is used only when enabled, annotated, and no line moves Y.
pub fn resolve_stock_radius(content: &str, enabled: bool) -> f64 {
    if !enabled {
        return 0.0;
    }
    let Some(radius) = detect_stock_radius(content) else {
        return 0.0;
    };
    if file_has_y_moves(content) {
        debug!("Cylinder annotation present but program moves Y; no stock offset");
        return 0.0;
    }
    debug!("Rotary stock radius offset: {}", radius);
    radius
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: DVec3, b: DVec3) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn test_rotate_quarter_turn_about_x() {
        let p = rotate_around_axis(RotaryAxis::X, &Position::with_a(1.0, 0.0, 5.0, 90.0));
        assert!(close(p, DVec3::new(1.0, -5.0, 0.0)));
    }

    #[test]
    fn test_zero_a_is_identity() {
        let p = rotate_around_axis(RotaryAxis::X, &Position::new(1.0, 2.0, 3.0));
        assert_eq!(p, DVec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_sweep_segment_counts() {
        assert_eq!(rotary_segments(10.0), MIN_ROTARY_SEGMENTS);
        assert_eq!(rotary_segments(-90.0), 18);
        assert_eq!(rotary_segments(92.0), 19);

        let transform = RotaryTransform::default();
        let from = Position::with_a(0.0, 0.0, 1.0, 0.0);
        let to = Position::with_a(0.0, 0.0, 1.0, 180.0);
        let points = transform.sweep(&from, &to);
        assert_eq!(points.len(), 37);
        // every sub-point stays on the cylinder
        assert!(points.iter().all(|p| (p.length() - 1.0).abs() < 1e-9));
        assert!(close(points[36], DVec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_segment_count_is_bounded() {
        assert_eq!(rotary_segments(1e20), MAX_ROTARY_SEGMENTS);
        assert_eq!(rotary_segments(-1e300), MAX_ROTARY_SEGMENTS);
        assert_eq!(rotary_segments(f64::INFINITY), MIN_ROTARY_SEGMENTS);
        assert_eq!(rotary_segments(f64::NAN), MIN_ROTARY_SEGMENTS);

        let from = Position::default();
        let to = Position::with_a(0.0, 0.0, 0.0, 1e20);
        let points = RotaryTransform::default().sweep(&from, &to);
        assert_eq!(points.len(), MAX_ROTARY_SEGMENTS + 1);
    }

    #[test]
    fn test_stock_radius_added_before_rotation() {
        let transform = RotaryTransform::new(RotaryAxis::X, 20.0);
        let p = transform.apply(&Position::with_a(0.0, 0.0, -1.0, 0.0));
        assert_eq!(p, DVec3::new(0.0, 0.0, 19.0));
    }

    #[test]
    fn test_detect_stock_radius() {
        let content = "(Stock: Cylinder Dia: 40)\nG1 X10 Z-1 A90\n";
        assert_eq!(detect_stock_radius(content), Some(20.0));
        assert_eq!(detect_stock_radius("G1 X1"), None);
    }

    #[test]
    fn test_offset_requires_no_y_moves() {
        let content = "(Cylinder Dia: 40)\nG1 X10 Z-1 A90\n";
        assert_eq!(resolve_stock_radius(content, true), 20.0);
        assert_eq!(resolve_stock_radius(content, false), 0.0);

        let with_y = "(Cylinder Dia: 40)\nG1 X10 Y2 Z-1\n";
        assert_eq!(resolve_stock_radius(with_y, true), 0.0);
    }

    #[test]
    fn test_y_in_comment_is_not_a_move() {
        assert!(!file_has_y_moves("(Y axis unused)\nG1 X1"));
        assert!(file_has_y_moves("G1 y3"));
    }
}
