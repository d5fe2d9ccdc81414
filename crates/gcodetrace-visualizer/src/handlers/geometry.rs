//! Render geometry sink
//!
//! Emits flat line-segment buffers ready for upload: three `f32` per
//! vertex position, four per vertex color, two vertices per segment. Arcs
//! and rotary curves are tessellated here. `frames[n]` holds the first
//! vertex of event `n`, so a consumer can replay the path progressively.

use gcodetrace_core::constants::{CUTTING_OPACITY, RAPID_OPACITY};
use gcodetrace_core::palette::tool_color;
use gcodetrace_core::{MotionMode, Position, Rgba, ThemeColors};
use glam::DVec3;
use tracing::trace;

use super::MotionHandler;
use crate::gcode::modal::ModalState;
use crate::gcode::report::ToolChangeRecord;
use crate::geometry::arc::tessellate_arc_into;
use crate::geometry::rotary::RotaryTransform;

/// Options for [`GeometryHandler`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GeometryOptions {
    /// Cutting moves with the beam off render like rapids
    pub laser_mode: bool,
    pub theme: ThemeColors,
    pub rotary: RotaryTransform,
}

/// Output buffers of a [`GeometryHandler`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryBuffers {
    pub vertices: Vec<f32>,
    pub colors: Vec<f32>,
    pub frames: Vec<u32>,
}

impl GeometryBuffers {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Raw bytes of the position buffer for GPU upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw bytes of the color buffer for GPU upload
    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }
}

#[derive(Debug, Default)]
pub struct GeometryHandler {
    options: GeometryOptions,
    buffers: GeometryBuffers,
    /// Palette slot of the active tool once any tool change was seen
    tool_segment: Option<usize>,
    scratch: Vec<DVec3>,
}

impl GeometryHandler {
    pub fn new(options: GeometryOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn buffers(&self) -> &GeometryBuffers {
        &self.buffers
    }

    pub fn into_buffers(self) -> GeometryBuffers {
        self.buffers
    }

    fn color_for(&self, modal: &ModalState) -> Rgba {
        let theme = &self.options.theme;
        if modal.motion.is_rapid() {
            return theme.rapid.with_alpha(RAPID_OPACITY);
        }
        if self.options.laser_mode && !modal.is_beam_on() {
            return theme.laser_off.with_alpha(RAPID_OPACITY);
        }
        if let Some(segment) = self.tool_segment {
            return tool_color(segment).with_alpha(CUTTING_OPACITY);
        }
        let base = match modal.motion {
            MotionMode::ArcCw => theme.arc_cw,
            MotionMode::ArcCcw => theme.arc_ccw,
            MotionMode::Linear | MotionMode::Rapid => theme.linear,
        };
        base.with_alpha(CUTTING_OPACITY)
    }

    fn begin_event(&mut self) {
        let first_vertex = self.buffers.vertex_count() as u32;
        self.buffers.frames.push(first_vertex);
    }

    fn push_vertex(&mut self, p: DVec3, color: [f32; 4]) {
        self.buffers
            .vertices
            .extend_from_slice(&[p.x as f32, p.y as f32, p.z as f32]);
        self.buffers.colors.extend_from_slice(&color);
    }

    fn push_segment(&mut self, a: DVec3, b: DVec3, color: [f32; 4]) {
        self.push_vertex(a, color);
        self.push_vertex(b, color);
    }

    /// Emit the scratch polyline as segment pairs
    fn flush_scratch(&mut self, color: [f32; 4]) {
        let points = std::mem::take(&mut self.scratch);
        for pair in points.windows(2) {
            self.push_segment(pair[0], pair[1], color);
        }
        self.scratch = points;
    }
}

impl MotionHandler for GeometryHandler {
    fn add_line(&mut self, modal: ModalState, from: Position, to: Position) {
        self.begin_event();
        let color = self.color_for(&modal).to_array();
        let rotary = self.options.rotary;
        self.push_segment(rotary.apply(&from), rotary.apply(&to), color);
    }

    fn add_arc_curve(&mut self, modal: ModalState, from: Position, to: Position, center: Position) {
        self.begin_event();
        let color = self.color_for(&modal).to_array();

        tessellate_arc_into(
            DVec3::new(center.x, center.y, center.z),
            DVec3::new(from.x, from.y, from.z),
            DVec3::new(to.x, to.y, to.z),
            modal.motion == MotionMode::ArcCw,
            modal.plane,
            &mut self.scratch,
        );

        let rotary = self.options.rotary;
        let last = self.scratch.len().saturating_sub(1).max(1) as f64;
        for (i, p) in self.scratch.iter_mut().enumerate() {
            let t = i as f64 / last;
            let pose = Position {
                x: p.x,
                y: p.y,
                z: p.z,
                ..from.lerp(&to, t)
            };
            *p = rotary.apply(&pose);
        }
        self.flush_scratch(color);
    }

    fn add_curve(&mut self, modal: ModalState, from: Position, to: Position) {
        self.begin_event();
        let color = self.color_for(&modal).to_array();
        let rotary = self.options.rotary;
        rotary.sweep_into(&from, &to, &mut self.scratch);
        self.flush_scratch(color);
    }

    fn on_tool_change(&mut self, change: &ToolChangeRecord) {
        let next = self.tool_segment.map_or(0, |s| s + 1);
        trace!(
            "Geometry: tool T{} at event {} uses palette slot {}",
            change.tool,
            change.event_index,
            next
        );
        self.tool_segment = Some(next);
    }
}

/// Recolor cutting vertices by tool segment.
///
/// Vertices from the event at `tool_changes[k].event_index` up to the next
/// change take palette color `k`. Translucent (rapid or beam-off) vertices
/// keep their color, as do vertices before the first change.
pub fn recolor_by_tool(colors: &mut [f32], frames: &[u32], tool_changes: &[ToolChangeRecord]) {
    let vertex_count = colors.len() / 4;
    let start_of = |event: u64| -> usize {
        usize::try_from(event)
            .ok()
            .and_then(|i| frames.get(i))
            .map_or(vertex_count, |&v| v as usize)
    };

    for (segment, change) in tool_changes.iter().enumerate() {
        let start = start_of(change.event_index).min(vertex_count);
        let end = tool_changes
            .get(segment + 1)
            .map_or(vertex_count, |next| start_of(next.event_index))
            .min(vertex_count);
        let color = tool_color(segment);

        for rgba in colors[start * 4..end * 4].chunks_exact_mut(4) {
            if rgba[3] >= CUTTING_OPACITY {
                rgba[0] = color.r;
                rgba[1] = color.g;
                rgba[2] = color.b;
            }
        }
    }
}
