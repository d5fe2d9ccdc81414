//! # GCodeTrace
//!
//! Turns G-code programs into motion events, render geometry, outlines and
//! run-time estimates.
//!
//! ## Architecture
//!
//! GCodeTrace is organized as a workspace with multiple crates:
//!
//! 1. **gcodetrace-core** - Positions, modal enumerations, palette, errors
//! 2. **gcodetrace-visualizer** - Tokenizer, interpreter, geometry, handlers, jobs
//! 3. **gcodetrace-settings** - Machine and visualizer configuration
//! 4. **gcodetrace** - Command line front end over a single parse job

pub use gcodetrace_core::{
    Error, GcodeError, JobError, MotionMode, Plane, Position, Result, ThemeColors, Units,
};

pub use gcodetrace_visualizer::{
    run_job, spawn_job, FileStats, JobRequest, JobTracker, MotionEvent, MotionHandler,
    Virtualizer, VirtualizerOptions, WorkerMessage,
};

pub use gcodetrace_settings::{Config, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Log lines go to stderr so that stdout stays free for results. The level
/// defaults to `info` and follows `RUST_LOG` when set. With `json` every
/// event is written as one JSON object per line.
pub fn init_logging(json: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        let fmt_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_current_span(false);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_line_number(true);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}
