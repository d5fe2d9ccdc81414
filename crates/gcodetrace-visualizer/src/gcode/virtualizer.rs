//! Modal interpreter
//!
//! Folds a program, one line at a time, into position and modal-state
//! transitions and dispatches one motion event per moving line. The
//! interpreter owns its [`ModalState`] for the lifetime of a job; sinks only
//! see copies. Malformed input never stops interpretation: diagnostics are
//! collected and reported by [`Virtualizer::generate_file_stats`].

use gcodetrace_core::constants::DEFAULT_RAPID_RATE;
use gcodetrace_core::{DistanceMode, FeedRateMode, GcodeError, MotionMode, Position};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::estimate::{AxisRates, Estimates, Estimator};
use super::modal::ModalState;
use super::parser::verify_checksum;
use super::report::{EventCounts, FileStats, InvalidLine, ToolChangeRecord};
use super::tokenizer::{scan_line_into, TokenSet};
use crate::geometry::arc::{from_plane, to_plane};
use crate::geometry::rotary::has_rotary_motion;
use crate::handlers::{MotionEvent, MotionHandler, StatsHandler};

/// Interpreter configuration
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualizerOptions {
    /// A `T` word activates the tool without waiting for `M6`
    pub atc_enabled: bool,
    pub accelerations: Option<AxisRates>,
    pub max_feedrates: Option<AxisRates>,
    /// Rapid rate in mm/min when no max-feedrate table is given
    pub default_rapid_rate: f64,
    pub validate_checksums: bool,
}

impl Default for VirtualizerOptions {
    fn default() -> Self {
        Self {
            atc_enabled: false,
            accelerations: None,
            max_feedrates: None,
            default_rapid_rate: DEFAULT_RAPID_RATE,
            validate_checksums: true,
        }
    }
}

/// Snapshot of interpreter totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualizerData {
    pub modal: ModalState,
    pub position: Position,
    pub estimates: Estimates,
    pub counts: EventCounts,
    pub tool_changes: Vec<ToolChangeRecord>,
}

/// Words of one line that drive interpretation
#[derive(Debug, Default)]
struct LineWords {
    motion: Option<MotionMode>,
    dwell: bool,
    set_position: bool,
    /// G10/G28/G30 give axis words a non-motion meaning
    axes_consumed: bool,
    tool_change: bool,
    spindle: Option<bool>,
    tool: Option<u32>,
    feed: Option<f64>,
    speed: Option<f64>,
    x: Option<f64>,
    y: Option<f64>,
    z: Option<f64>,
    a: Option<f64>,
    b: Option<f64>,
    c: Option<f64>,
    i: Option<f64>,
    j: Option<f64>,
    k: Option<f64>,
    r: Option<f64>,
    p: Option<f64>,
}

impl LineWords {
    fn collect(tokens: &TokenSet, state: &mut ModalState) -> Self {
        let mut words = Self::default();
        for index in 0..tokens.len() {
            let Some(value) = tokens.number(index) else {
                continue;
            };
            match tokens.letter(index) {
                'G' => words.apply_g(value, state),
                'M' if value.fract() == 0.0 => match value as u32 {
                    3 | 4 => words.spindle = Some(true),
                    5 => words.spindle = Some(false),
                    6 => words.tool_change = true,
                    _ => {}
                },
                'T' if value >= 0.0 && value.fract() == 0.0 => words.tool = Some(value as u32),
                'F' => words.feed = Some(value),
                'S' => words.speed = Some(value),
                'X' => words.x = Some(value),
                'Y' => words.y = Some(value),
                'Z' => words.z = Some(value),
                'A' => words.a = Some(value),
                'B' => words.b = Some(value),
                'C' => words.c = Some(value),
                'I' => words.i = Some(value),
                'J' => words.j = Some(value),
                'K' => words.k = Some(value),
                'R' => words.r = Some(value),
                'P' => words.p = Some(value),
                _ => {}
            }
        }
        words
    }

    fn apply_g(&mut self, value: f64, state: &mut ModalState) {
        if value.fract() != 0.0 || value < 0.0 {
            return;
        }
        let code = value as u32;
        if let Some(motion) = MotionMode::from_code(code) {
            self.motion = Some(motion);
            return;
        }
        match code {
            4 => self.dwell = true,
            92 => self.set_position = true,
            10 | 28 | 30 => self.axes_consumed = true,
            _ => {
                state.apply_g_code(code);
            }
        }
    }

    fn has_axis(&self) -> bool {
        self.x.is_some()
            || self.y.is_some()
            || self.z.is_some()
            || self.a.is_some()
            || self.b.is_some()
            || self.c.is_some()
    }

    fn has_offsets(&self) -> bool {
        self.i.is_some() || self.j.is_some() || self.k.is_some()
    }
}

/// The modal interpreter
pub struct Virtualizer<H: MotionHandler> {
    options: VirtualizerOptions,
    tokens: TokenSet,
    state: ModalState,
    position: Position,
    /// Tool named by the most recent `T` word
    selected_tool: Option<u32>,
    handler: H,
    stats: StatsHandler,
    line_count: u32,
    invalid_lines: Vec<InvalidLine>,
}

impl<H: MotionHandler> Virtualizer<H> {
    pub fn new(handler: H, options: VirtualizerOptions) -> Self {
        let estimator = Estimator::new(
            options.accelerations,
            options.max_feedrates,
            options.default_rapid_rate,
        );
        Self {
            options,
            tokens: TokenSet::new(),
            state: ModalState::default(),
            position: Position::default(),
            selected_tool: None,
            handler,
            stats: StatsHandler::new(estimator),
            line_count: 0,
            invalid_lines: Vec::new(),
        }
    }

    pub fn state(&self) -> &ModalState {
        &self.state
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Replace modal state and position, as if a prior program had left them
    pub fn set_state(&mut self, state: ModalState, position: Position) {
        self.state = state;
        self.position = position;
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn lines_processed(&self) -> u32 {
        self.line_count
    }

    /// Number of motion events emitted so far
    pub fn event_count(&self) -> u64 {
        self.stats.counts().total()
    }

    /// Interpret every line of `content` in order
    pub fn virtualize_all(&mut self, content: &str) {
        for line in content.lines() {
            self.virtualize(line);
        }
    }

    /// Interpret one line
    pub fn virtualize(&mut self, line: &str) {
        self.line_count += 1;
        let line_number = self.line_count;

        let mut tokens = std::mem::take(&mut self.tokens);
        scan_line_into(line, &mut tokens);
        self.check_line(line, line_number, &tokens);
        if !tokens.is_empty() {
            self.interpret(&tokens, line_number);
        }
        self.tokens = tokens;
    }

    pub fn get_data(&self) -> VirtualizerData {
        VirtualizerData {
            modal: self.state,
            position: self.position,
            estimates: self.stats.estimates(),
            counts: self.stats.counts(),
            tool_changes: self.stats.tool_changes().to_vec(),
        }
    }

    pub fn generate_file_stats(&self) -> FileStats {
        let counts = self.stats.counts();
        FileStats {
            total_lines: u64::from(self.line_count),
            total_segments: counts.total(),
            counts,
            invalid_lines: self.invalid_lines.clone(),
            tool_changes: self.stats.tool_changes().to_vec(),
            estimates: self.stats.estimates(),
            bounds: self.stats.bounds(),
            cutting_bounds: self.stats.cutting_bounds(),
        }
    }

    /// Finish the job, returning the sink and the final statistics
    pub fn into_parts(self) -> (H, FileStats) {
        let stats = self.generate_file_stats();
        debug!(
            "Virtualized {} lines: {} events, {} invalid lines, {} tool changes",
            stats.total_lines,
            stats.total_segments,
            stats.invalid_lines.len(),
            stats.tool_changes.len()
        );
        (self.handler, stats)
    }

    fn check_line(&mut self, line: &str, line_number: u32, tokens: &TokenSet) {
        let mut errors = Vec::new();
        if tokens.has_invalid_tokens {
            errors.push(GcodeError::InvalidTokens { line_number });
        }
        if self.options.validate_checksums {
            if let Some(Err((expected, computed))) = verify_checksum(line, tokens) {
                errors.push(GcodeError::ChecksumMismatch {
                    line_number,
                    expected,
                    computed,
                });
            }
        }
        if !errors.is_empty() {
            trace!("Line {} flagged: {:?}", line_number, errors);
            self.invalid_lines.push(InvalidLine {
                line_number,
                content: line.to_string(),
                errors,
            });
        }
    }

    fn interpret(&mut self, tokens: &TokenSet, line_number: u32) {
        let words = LineWords::collect(tokens, &mut self.state);

        if let Some(motion) = words.motion {
            self.state.motion = motion;
        }
        if let Some(feed) = words.feed {
            self.state.feed_rate = match self.state.feed_rate_mode {
                FeedRateMode::InverseTime => feed,
                FeedRateMode::UnitsPerMinute => self.state.units.to_mm(feed),
            };
        }
        if let Some(speed) = words.speed {
            self.state.spindle_speed = speed.max(0.0);
        }
        if let Some(on) = words.spindle {
            self.state.spindle_on = on;
        }

        self.update_tool(&words, line_number);

        if words.dwell {
            if let Some(seconds) = words.p {
                self.stats.add_dwell(seconds);
            }
            return;
        }
        if words.set_position {
            self.position = self.target(&words, DistanceMode::Absolute);
            return;
        }
        if words.axes_consumed {
            return;
        }

        let from = self.position;
        match self.state.motion {
            MotionMode::Rapid | MotionMode::Linear => {
                if !words.has_axis() {
                    return;
                }
                let to = self.target(&words, self.state.distance);
                self.emit_straight(from, to);
                self.position = to;
            }
            MotionMode::ArcCw | MotionMode::ArcCcw => {
                if !words.has_axis() && !words.has_offsets() {
                    return;
                }
                let to = self.target(&words, self.state.distance);
                match self.arc_center(&words, &from, &to) {
                    Some(center) => self.emit(MotionEvent::ArcCurve {
                        modal: self.state,
                        from,
                        to,
                        center,
                    }),
                    None => {
                        trace!("Line {}: arc without center, drawn as a line", line_number);
                        self.emit_straight(from, to);
                    }
                }
                self.position = to;
            }
        }
    }

    fn update_tool(&mut self, words: &LineWords, line_number: u32) {
        if let Some(tool) = words.tool {
            self.selected_tool = Some(tool);
        }
        let requested = if words.tool_change {
            self.selected_tool
        } else if self.options.atc_enabled {
            words.tool
        } else {
            None
        };
        let Some(tool) = requested else {
            return;
        };
        if tool == self.state.tool {
            return;
        }

        self.state.tool = tool;
        let record = ToolChangeRecord {
            event_index: self.event_count(),
            tool,
            line_number,
        };
        debug!(
            "Tool change to T{} at line {} (event {})",
            tool, line_number, record.event_index
        );
        self.handler.on_tool_change(&record);
        self.stats.on_tool_change(&record);
    }

    /// Destination of this line's axis words under `distance`
    fn target(&self, words: &LineWords, distance: DistanceMode) -> Position {
        let units = self.state.units;
        let incremental = distance == DistanceMode::Incremental;
        let linear = |current: f64, word: Option<f64>| match word {
            Some(v) if incremental => current + units.to_mm(v),
            Some(v) => units.to_mm(v),
            None => current,
        };
        let rotary = |current: f64, word: Option<f64>| match word {
            Some(v) if incremental => current + v,
            Some(v) => v,
            None => current,
        };
        let p = &self.position;
        Position {
            x: linear(p.x, words.x),
            y: linear(p.y, words.y),
            z: linear(p.z, words.z),
            a: rotary(p.a, words.a),
            b: rotary(p.b, words.b),
            c: rotary(p.c, words.c),
        }
    }

    /// Arc center from `IJK` offsets, else from `R`
    fn arc_center(&self, words: &LineWords, from: &Position, to: &Position) -> Option<Position> {
        let units = self.state.units;
        if words.has_offsets() {
            let offset = |word: Option<f64>| word.map_or(0.0, |v| units.to_mm(v));
            return Some(Position {
                x: from.x + offset(words.i),
                y: from.y + offset(words.j),
                z: from.z + offset(words.k),
                ..*from
            });
        }
        let radius = units.to_mm(words.r?);
        let plane = self.state.plane;
        let f = to_plane(plane, DVec3::new(from.x, from.y, from.z));
        let t = to_plane(plane, DVec3::new(to.x, to.y, to.z));
        let (cu, cv) = center_from_radius(
            f.x,
            f.y,
            t.x,
            t.y,
            radius,
            self.state.motion == MotionMode::ArcCw,
        )?;
        let c = from_plane(plane, DVec3::new(cu, cv, f.z));
        Some(Position {
            x: c.x,
            y: c.y,
            z: c.z,
            ..*from
        })
    }

    fn emit_straight(&mut self, from: Position, to: Position) {
        let modal = self.state;
        if has_rotary_motion(&from, &to) {
            self.emit(MotionEvent::Curve { modal, from, to });
        } else {
            self.emit(MotionEvent::Line { modal, from, to });
        }
    }

    fn emit(&mut self, event: MotionEvent) {
        event.dispatch(&mut self.handler);
        event.dispatch(&mut self.stats);
    }
}

/// Arc center in plane coordinates from a signed radius.
///
/// A negative radius selects the arc longer than a half turn. An
/// unreachable radius is clamped so the center sits on the chord midpoint.
fn center_from_radius(
    from_u: f64,
    from_v: f64,
    to_u: f64,
    to_v: f64,
    radius: f64,
    clockwise: bool,
) -> Option<(f64, f64)> {
    let x = to_u - from_u;
    let y = to_v - from_v;
    let chord = x.hypot(y);
    if chord == 0.0 || !radius.is_finite() {
        return None;
    }

    let mut h = -(4.0 * radius * radius - x * x - y * y).max(0.0).sqrt() / chord;
    if !clockwise {
        h = -h;
    }
    if radius < 0.0 {
        h = -h;
    }
    Some((from_u + 0.5 * (x - y * h), from_v + 0.5 * (y + x * h)))
}

impl<H: MotionHandler + Default> Default for Virtualizer<H> {
    fn default() -> Self {
        Self::new(H::default(), VirtualizerOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcodetrace_core::Plane;

    fn run(content: &str) -> Virtualizer<Vec<MotionEvent>> {
        let mut v = Virtualizer::new(Vec::new(), VirtualizerOptions::default());
        v.virtualize_all(content);
        v
    }

    #[test]
    fn test_single_linear_move() {
        let v = run("G1 X10 Y20 F500\n");
        let events = v.handler();
        assert_eq!(events.len(), 1);
        match events[0] {
            MotionEvent::Line { modal, from, to } => {
                assert_eq!(modal.motion, MotionMode::Linear);
                assert_eq!(from, Position::default());
                assert_eq!(to, Position::new(10.0, 20.0, 0.0));
                assert_eq!(modal.feed_rate, 500.0);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_modal_words_without_motion_emit_nothing() {
        let v = run("G21 G90 G17\nM3 S1000\n$H\n%\n");
        assert!(v.handler().is_empty());
        assert!(v.state().spindle_on);
        assert_eq!(v.state().spindle_speed, 1000.0);
    }

    #[test]
    fn test_motion_mode_is_modal() {
        let v = run("G1 F100\nX5\nY5\n");
        let events = v.handler();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.modal().motion == MotionMode::Linear));
        assert_eq!(events[1].to(), Position::new(5.0, 5.0, 0.0));
    }

    #[test]
    fn test_inch_input_converted() {
        let v = run("G20 G1 X1 F10\n");
        let to = v.handler()[0].to();
        assert!((to.x - 25.4).abs() < 1e-9);
        assert!((v.state().feed_rate - 254.0).abs() < 1e-9);
    }

    #[test]
    fn test_r_format_arc_center() {
        let v = run("G2 X10 Y10 R10\n");
        match v.handler()[0] {
            MotionEvent::ArcCurve { center, .. } => {
                assert!((center.x - 10.0).abs() < 1e-9);
                assert!(center.y.abs() < 1e-9);
            }
            other => panic!("unexpected event {other:?}"),
        }

        let v = run("G2 X10 Y10 R-10\n");
        match v.handler()[0] {
            MotionEvent::ArcCurve { center, .. } => {
                assert!(center.x.abs() < 1e-9);
                assert!((center.y - 10.0).abs() < 1e-9);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_arc_without_center_degrades_to_line() {
        let v = run("G2 X10\n");
        assert!(matches!(v.handler()[0], MotionEvent::Line { .. }));
    }

    #[test]
    fn test_zx_plane_offsets() {
        let v = run("G18 G2 X10 I5 K0\n");
        match v.handler()[0] {
            MotionEvent::ArcCurve { modal, center, .. } => {
                assert_eq!(modal.plane, Plane::ZX);
                assert_eq!(center, Position::new(5.0, 0.0, 0.0));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_rotary_move_is_curve() {
        let v = run("G1 A90 F100\nG1 X5\n");
        let events = v.handler();
        assert!(matches!(events[0], MotionEvent::Curve { .. }));
        assert!(matches!(events[1], MotionEvent::Line { .. }));
        assert_eq!(events[1].from().a, 90.0);
    }

    #[test]
    fn test_g92_sets_position_without_event() {
        let v = run("G1 X5 F100\nG92 X0\nG1 X1\n");
        let events = v.handler();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].from().x, 0.0);
        assert_eq!(events[1].to().x, 1.0);
    }

    #[test]
    fn test_g28_axis_words_do_not_move() {
        let v = run("G28 X0 Y0\n");
        assert!(v.handler().is_empty());
    }

    #[test]
    fn test_dwell_adds_time_only() {
        let v = run("G4 P2.5\n");
        assert!(v.handler().is_empty());
        assert_eq!(v.get_data().estimates.dwell_time, 2.5);
    }

    #[test]
    fn test_tool_selected_then_activated() {
        let v = run("T3\nG1 X1 F100\nM6\nG1 X2\n");
        let data = v.get_data();
        assert_eq!(data.tool_changes.len(), 1);
        assert_eq!(data.tool_changes[0].tool, 3);
        assert_eq!(data.tool_changes[0].event_index, 1);
        assert_eq!(data.tool_changes[0].line_number, 3);
    }

    #[test]
    fn test_atc_activates_on_t_word() {
        let mut v = Virtualizer::new(
            Vec::<MotionEvent>::new(),
            VirtualizerOptions {
                atc_enabled: true,
                ..VirtualizerOptions::default()
            },
        );
        v.virtualize_all("T2\nG1 X1 F100\n");
        assert_eq!(v.get_data().tool_changes.len(), 1);
        assert_eq!(v.state().tool, 2);
    }

    #[test]
    fn test_same_tool_is_not_a_change() {
        let v = run("T0 M6\nT1 M6\nT1 M6\n");
        assert_eq!(v.get_data().tool_changes.len(), 1);
    }

    #[test]
    fn test_invalid_lines_collected() {
        let v = run("G1 X1 F100\nG1 Q5 X2\nN1 G1 X3*0\n");
        let stats = v.generate_file_stats();
        assert_eq!(stats.total_lines, 3);
        assert_eq!(stats.invalid_lines.len(), 2);
        assert_eq!(stats.invalid_lines[0].line_number, 2);
        assert!(matches!(
            stats.invalid_lines[1].errors[0],
            GcodeError::ChecksumMismatch { line_number: 3, .. }
        ));
        // interpretation carries on past both
        assert_eq!(stats.total_segments, 3);
    }

    #[test]
    fn test_center_from_radius_unreachable_clamps() {
        let (u, v) = center_from_radius(0.0, 0.0, 10.0, 0.0, 1.0, true).unwrap();
        assert!((u - 5.0).abs() < 1e-9);
        assert!(v.abs() < 1e-9);
        assert_eq!(center_from_radius(1.0, 1.0, 1.0, 1.0, 5.0, true), None);
    }
}
