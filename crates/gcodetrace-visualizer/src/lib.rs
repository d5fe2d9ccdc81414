//! # GCodeTrace Visualizer
//!
//! Turns G-code text into motion events and the products built from them.
//! Includes the line tokenizer, modal interpreter, arc and rotary geometry,
//! event sinks (render geometry, outline, statistics) and the parse-job
//! worker contract.

pub mod gcode;
pub mod geometry;
pub mod handlers;
pub mod worker;

pub use gcode::{
    compute_checksum, parse_line, scan_line, AxisRates, Estimates, FileStats, InvalidLine,
    ModalState, ParseOptions, ParsedLine, TokenSet, Tokenizer, ToolChangeRecord, Virtualizer,
    VirtualizerData, VirtualizerOptions, Word, WordValue,
};

pub use geometry::{
    detect_stock_radius, rotate_around_axis, tessellate_arc, Bounds, RotaryAxis, RotaryTransform,
};

pub use handlers::{
    recolor_by_tool, Fanout, GeometryHandler, GeometryOptions, MotionEvent, MotionHandler,
    NoopHandler, OutlineHandler, OutlineOptions, StatsHandler,
};

pub use worker::{execute_job, run_job, spawn_job, JobRequest, JobTracker, WorkerMessage};
