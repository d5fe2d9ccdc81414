//! Arc tessellation
//!
//! Arcs are resolved in the plane selected by G17/G18/G19. Points are
//! mapped onto `(u, v, w)` where `u`/`v` span the arc plane and `w` is the
//! helical axis, then mapped back to machine XYZ.

use std::f64::consts::TAU;

use gcodetrace_core::constants::{ARC_DIVISIONS, DEGREES_PER_SEGMENT, FULL_CIRCLE_EPSILON};
use gcodetrace_core::Plane;
use glam::DVec3;

const HELIX_EPSILON: f64 = 1e-9;

/// Map XYZ onto the plane frame `(u, v, w)`
#[inline]
pub fn to_plane(plane: Plane, p: DVec3) -> DVec3 {
    match plane {
        Plane::XY => DVec3::new(p.x, p.y, p.z),
        Plane::ZX => DVec3::new(p.z, p.x, p.y),
        Plane::YZ => DVec3::new(p.y, p.z, p.x),
    }
}

/// Inverse of [`to_plane`]
#[inline]
pub fn from_plane(plane: Plane, q: DVec3) -> DVec3 {
    match plane {
        Plane::XY => DVec3::new(q.x, q.y, q.z),
        Plane::ZX => DVec3::new(q.y, q.z, q.x),
        Plane::YZ => DVec3::new(q.z, q.x, q.y),
    }
}

/// Signed angular sweep from `start_angle` to `end_angle`.
///
/// Coincident angles mean a full turn. Otherwise the sweep is the
/// counter-clockwise difference normalized to `(0, 2π]`, mirrored to the
/// negative side for clockwise arcs.
pub fn arc_sweep(start_angle: f64, end_angle: f64, clockwise: bool) -> f64 {
    if (end_angle - start_angle).abs() <= FULL_CIRCLE_EPSILON {
        return if clockwise { -TAU } else { TAU };
    }

    let mut delta = (end_angle - start_angle).rem_euclid(TAU);
    if delta < FULL_CIRCLE_EPSILON {
        delta = TAU;
    }

    if !clockwise {
        delta
    } else if delta >= TAU {
        -TAU
    } else {
        delta - TAU
    }
}

/// Arc resolved in its plane frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcParams {
    pub plane: Plane,
    pub center: DVec3,
    pub radius: f64,
    pub start_angle: f64,
    /// Signed sweep in radians, negative for clockwise
    pub sweep: f64,
    pub w_from: f64,
    pub w_to: f64,
}

impl ArcParams {
    pub fn new(center: DVec3, from: DVec3, to: DVec3, clockwise: bool, plane: Plane) -> Self {
        let c = to_plane(plane, center);
        let f = to_plane(plane, from);
        let t = to_plane(plane, to);

        let start_angle = (f.y - c.y).atan2(f.x - c.x);
        let end_angle = (t.y - c.y).atan2(t.x - c.x);

        Self {
            plane,
            center: c,
            radius: (f.x - c.x).hypot(f.y - c.y),
            start_angle,
            sweep: arc_sweep(start_angle, end_angle, clockwise),
            w_from: f.z,
            w_to: t.z,
        }
    }

    pub fn is_helical(&self) -> bool {
        (self.w_to - self.w_from).abs() > HELIX_EPSILON
    }

    /// Path length including helical rise
    pub fn length(&self) -> f64 {
        (self.radius * self.sweep.abs()).hypot(self.w_to - self.w_from)
    }

    /// Fixed subdivision for planar arcs, one segment per few degrees for helices
    pub fn divisions(&self) -> usize {
        if self.is_helical() {
            ((self.sweep.abs().to_degrees() / DEGREES_PER_SEGMENT).ceil() as usize).max(1)
        } else {
            ARC_DIVISIONS
        }
    }

    /// Point at parameter `t` in `0.0..=1.0`, in machine XYZ
    pub fn point_at(&self, t: f64) -> DVec3 {
        let angle = self.start_angle + self.sweep * t;
        let q = DVec3::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
            self.w_from + (self.w_to - self.w_from) * t,
        );
        from_plane(self.plane, q)
    }
}

/// Tessellate an arc into a polyline
pub fn tessellate_arc(
    center: DVec3,
    from: DVec3,
    to: DVec3,
    clockwise: bool,
    plane: Plane,
) -> Vec<DVec3> {
    let mut points = Vec::new();
    tessellate_arc_into(center, from, to, clockwise, plane, &mut points);
    points
}

/// Tessellate an arc into `out`, replacing its contents.
///
/// The first point is exactly `from` and the last exactly `to`.
pub fn tessellate_arc_into(
    center: DVec3,
    from: DVec3,
    to: DVec3,
    clockwise: bool,
    plane: Plane,
    out: &mut Vec<DVec3>,
) {
    let arc = ArcParams::new(center, from, to, clockwise, plane);
    let divisions = arc.divisions();

    out.clear();
    out.reserve(divisions + 1);
    out.push(from);
    for i in 1..divisions {
        out.push(arc.point_at(i as f64 / divisions as f64));
    }
    out.push(to);
}
