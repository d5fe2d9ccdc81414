//! GCodeTrace Settings Crate
//!
//! Machine limits and visualizer preferences, stored as JSON or TOML in the
//! platform configuration directory.

pub mod config;
pub mod error;

pub use config::{Config, MachineSettings, VisualizerSettings};
pub use error::{ConfigError, SettingsError, SettingsResult};
