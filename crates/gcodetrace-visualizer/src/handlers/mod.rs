//! Motion event sinks
//!
//! The interpreter hands every motion event to a [`MotionHandler`]. Sinks
//! receive copies of the modal record and positions, never references into
//! interpreter state, and can be combined with [`Fanout`].

pub mod geometry;
pub mod outline;
pub mod stats;

use gcodetrace_core::Position;
use serde::{Deserialize, Serialize};

use crate::gcode::modal::ModalState;
use crate::gcode::report::{SegmentKind, ToolChangeRecord};

pub use geometry::{recolor_by_tool, GeometryBuffers, GeometryHandler, GeometryOptions};
pub use outline::{OutlineHandler, OutlineOptions, OutlineResult};
pub use stats::StatsHandler;

/// Trait for receiving motion events
///
/// Implementations react to each motion class:
/// - Straight moves (G0/G1 without rotary motion)
/// - Arcs (G2/G3 with a resolved center)
/// - Rotary curves (any move that changes A)
pub trait MotionHandler {
    /// Called for a straight move
    fn add_line(&mut self, modal: ModalState, from: Position, to: Position);

    /// Called for an arc; `center` shares the units of `from` and `to`
    fn add_arc_curve(&mut self, modal: ModalState, from: Position, to: Position, center: Position);

    /// Called for a move that rotates the A axis
    fn add_curve(&mut self, modal: ModalState, from: Position, to: Position);

    /// Called before the first event cut with a newly activated tool
    fn on_tool_change(&mut self, _change: &ToolChangeRecord) {}
}

/// Handler that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

impl MotionHandler for NoopHandler {
    fn add_line(&mut self, _modal: ModalState, _from: Position, _to: Position) {}
    fn add_arc_curve(
        &mut self,
        _modal: ModalState,
        _from: Position,
        _to: Position,
        _center: Position,
    ) {
    }
    fn add_curve(&mut self, _modal: ModalState, _from: Position, _to: Position) {}
}

impl<H: MotionHandler + ?Sized> MotionHandler for &mut H {
    fn add_line(&mut self, modal: ModalState, from: Position, to: Position) {
        (**self).add_line(modal, from, to)
    }

    fn add_arc_curve(&mut self, modal: ModalState, from: Position, to: Position, center: Position) {
        (**self).add_arc_curve(modal, from, to, center)
    }

    fn add_curve(&mut self, modal: ModalState, from: Position, to: Position) {
        (**self).add_curve(modal, from, to)
    }

    fn on_tool_change(&mut self, change: &ToolChangeRecord) {
        (**self).on_tool_change(change)
    }
}

impl<H: MotionHandler + ?Sized> MotionHandler for Box<H> {
    fn add_line(&mut self, modal: ModalState, from: Position, to: Position) {
        (**self).add_line(modal, from, to)
    }

    fn add_arc_curve(&mut self, modal: ModalState, from: Position, to: Position, center: Position) {
        (**self).add_arc_curve(modal, from, to, center)
    }

    fn add_curve(&mut self, modal: ModalState, from: Position, to: Position) {
        (**self).add_curve(modal, from, to)
    }

    fn on_tool_change(&mut self, change: &ToolChangeRecord) {
        (**self).on_tool_change(change)
    }
}

/// An absent sink ignores events
impl<H: MotionHandler> MotionHandler for Option<H> {
    fn add_line(&mut self, modal: ModalState, from: Position, to: Position) {
        if let Some(h) = self {
            h.add_line(modal, from, to);
        }
    }

    fn add_arc_curve(&mut self, modal: ModalState, from: Position, to: Position, center: Position) {
        if let Some(h) = self {
            h.add_arc_curve(modal, from, to, center);
        }
    }

    fn add_curve(&mut self, modal: ModalState, from: Position, to: Position) {
        if let Some(h) = self {
            h.add_curve(modal, from, to);
        }
    }

    fn on_tool_change(&mut self, change: &ToolChangeRecord) {
        if let Some(h) = self {
            h.on_tool_change(change);
        }
    }
}

/// Forwards every event to two sinks, first then second. Nest for more.
#[derive(Debug, Clone, Default)]
pub struct Fanout<A, B>(pub A, pub B);

impl<A: MotionHandler, B: MotionHandler> MotionHandler for Fanout<A, B> {
    fn add_line(&mut self, modal: ModalState, from: Position, to: Position) {
        self.0.add_line(modal, from, to);
        self.1.add_line(modal, from, to);
    }

    fn add_arc_curve(&mut self, modal: ModalState, from: Position, to: Position, center: Position) {
        self.0.add_arc_curve(modal, from, to, center);
        self.1.add_arc_curve(modal, from, to, center);
    }

    fn add_curve(&mut self, modal: ModalState, from: Position, to: Position) {
        self.0.add_curve(modal, from, to);
        self.1.add_curve(modal, from, to);
    }

    fn on_tool_change(&mut self, change: &ToolChangeRecord) {
        self.0.on_tool_change(change);
        self.1.on_tool_change(change);
    }
}

/// One motion event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MotionEvent {
    Line {
        modal: ModalState,
        from: Position,
        to: Position,
    },
    ArcCurve {
        modal: ModalState,
        from: Position,
        to: Position,
        center: Position,
    },
    Curve {
        modal: ModalState,
        from: Position,
        to: Position,
    },
}

impl MotionEvent {
    pub fn modal(&self) -> &ModalState {
        match self {
            Self::Line { modal, .. } | Self::ArcCurve { modal, .. } | Self::Curve { modal, .. } => {
                modal
            }
        }
    }

    pub fn from(&self) -> Position {
        match self {
            Self::Line { from, .. } | Self::ArcCurve { from, .. } | Self::Curve { from, .. } => {
                *from
            }
        }
    }

    pub fn to(&self) -> Position {
        match self {
            Self::Line { to, .. } | Self::ArcCurve { to, .. } | Self::Curve { to, .. } => *to,
        }
    }

    pub fn kind(&self) -> SegmentKind {
        match self {
            Self::Line { modal, .. } if modal.motion.is_rapid() => SegmentKind::Rapid,
            Self::Line { .. } => SegmentKind::Linear,
            Self::ArcCurve { .. } => SegmentKind::Arc,
            Self::Curve { .. } => SegmentKind::Curve,
        }
    }

    /// Replay this event into `handler`
    pub fn dispatch<H: MotionHandler + ?Sized>(&self, handler: &mut H) {
        match *self {
            Self::Line { modal, from, to } => handler.add_line(modal, from, to),
            Self::ArcCurve {
                modal,
                from,
                to,
                center,
            } => handler.add_arc_curve(modal, from, to, center),
            Self::Curve { modal, from, to } => handler.add_curve(modal, from, to),
        }
    }
}

/// Records events in order
impl MotionHandler for Vec<MotionEvent> {
    fn add_line(&mut self, modal: ModalState, from: Position, to: Position) {
        self.push(MotionEvent::Line { modal, from, to });
    }

    fn add_arc_curve(&mut self, modal: ModalState, from: Position, to: Position, center: Position) {
        self.push(MotionEvent::ArcCurve {
            modal,
            from,
            to,
            center,
        });
    }

    fn add_curve(&mut self, modal: ModalState, from: Position, to: Position) {
        self.push(MotionEvent::Curve { modal, from, to });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcodetrace_core::MotionMode;

    #[test]
    fn test_fanout_reaches_both_sinks() {
        let mut fan = Fanout(Vec::<MotionEvent>::new(), Vec::<MotionEvent>::new());
        fan.add_line(
            ModalState::default(),
            Position::default(),
            Position::new(1.0, 0.0, 0.0),
        );
        assert_eq!(fan.0.len(), 1);
        assert_eq!(fan.0, fan.1);
    }

    #[test]
    fn test_event_kind_and_dispatch() {
        let linear = ModalState {
            motion: MotionMode::Linear,
            ..ModalState::default()
        };
        let events = vec![
            MotionEvent::Line {
                modal: ModalState::default(),
                from: Position::default(),
                to: Position::new(1.0, 0.0, 0.0),
            },
            MotionEvent::Curve {
                modal: linear,
                from: Position::default(),
                to: Position::with_a(0.0, 0.0, 0.0, 90.0),
            },
        ];
        assert_eq!(events[0].kind(), SegmentKind::Rapid);
        assert_eq!(events[1].kind(), SegmentKind::Curve);

        let mut replay: Vec<MotionEvent> = Vec::new();
        for e in &events {
            e.dispatch(&mut replay);
        }
        assert_eq!(replay, events);
    }

    #[test]
    fn test_absent_sink_is_silent() {
        let mut none: Option<Vec<MotionEvent>> = None;
        none.add_curve(ModalState::default(), Position::default(), Position::default());
        assert!(none.is_none());
    }
}
