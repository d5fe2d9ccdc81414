//! Configuration for GCodeTrace
//!
//! Supports JSON and TOML file formats stored in platform-specific directories.
//!
//! Configuration is organized into two sections:
//! - Machine limits used by the run-time estimate
//! - Visualizer preferences applied to every parse job

use gcodetrace_core::constants::DEFAULT_RAPID_RATE;
use gcodetrace_core::ThemeColors;
use gcodetrace_visualizer::{AxisRates, JobRequest};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ConfigError, SettingsError, SettingsResult};

const APP_DIR: &str = "gcodetrace";
const CONFIG_FILE: &str = "config.toml";

/// Machine limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineSettings {
    /// Per-axis acceleration in mm/s² (deg/s² for A)
    pub accelerations: Option<AxisRates>,
    /// Per-axis maximum feed rate in mm/min (deg/min for A)
    pub max_feedrates: Option<AxisRates>,
    /// Rapid rate in mm/min when no feed rate table is set
    pub default_rapid_rate: f64,
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            accelerations: None,
            max_feedrates: None,
            default_rapid_rate: DEFAULT_RAPID_RATE,
        }
    }
}

/// Visualizer preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerSettings {
    /// Activate tools on the T word without waiting for M6
    pub atc_enabled: bool,
    /// Lift toolpaths by the stock radius from a `Cylinder Dia:` annotation
    pub rotary_diameter_offset_enabled: bool,
    /// Draw cutting moves with the beam off like rapids
    pub laser_mode: bool,
    /// Produce SVG outline path data
    pub include_svg: bool,
    pub theme: ThemeColors,
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub machine: MachineSettings,
    pub visualizer: VisualizerSettings,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("none").to_string()).into()),
    }
}

fn check_rates(key: &str, rates: Option<&AxisRates>) -> SettingsResult<()> {
    match rates {
        Some(rates) if !rates.is_valid() => Err(SettingsError::InvalidSetting {
            key: key.to_string(),
            reason: "rates must be finite and not negative".to_string(),
        }),
        _ => Ok(()),
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// `<config dir>/gcodetrace/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        let base = dirs::config_dir().ok_or_else(|| {
            ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string())
        })?;
        Ok(base.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path)?;
        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };
        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load the config at [`Config::default_path`], or defaults when absent
    pub fn load_or_default() -> SettingsResult<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML), creating parent directories
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                SettingsError::ConfigDirectory(format!("{}: {}", parent.display(), e))
            })?;
        }
        std::fs::write(path, content)?;
        debug!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        check_rates("machine.accelerations", self.machine.accelerations.as_ref())?;
        check_rates("machine.max_feedrates", self.machine.max_feedrates.as_ref())?;

        let rapid = self.machine.default_rapid_rate;
        if !rapid.is_finite() || rapid <= 0.0 {
            return Err(SettingsError::InvalidSetting {
                key: "machine.default_rapid_rate".to_string(),
                reason: "must be > 0".to_string(),
            });
        }

        let theme = &self.visualizer.theme;
        for (name, color) in [
            ("rapid", theme.rapid),
            ("linear", theme.linear),
            ("arc_cw", theme.arc_cw),
            ("arc_ccw", theme.arc_ccw),
            ("laser_off", theme.laser_off),
        ] {
            if !color.is_valid() {
                return Err(ConfigError::ValueOutOfRange {
                    key: format!("visualizer.theme.{}", name),
                    value: format!("{:?}", color.to_array()),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Build the worker input for `content` with these settings applied
    pub fn job_request(&self, content: impl Into<String>, job_id: u64) -> JobRequest {
        JobRequest {
            is_laser: self.visualizer.laser_mode,
            should_include_svg: self.visualizer.include_svg,
            accelerations: self.machine.accelerations,
            max_feedrates: self.machine.max_feedrates,
            default_rapid_rate: Some(self.machine.default_rapid_rate),
            atc_enabled: self.visualizer.atc_enabled,
            rotary_diameter_offset_enabled: self.visualizer.rotary_diameter_offset_enabled,
            theme: Some(self.visualizer.theme),
            ..JobRequest::new(content, job_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcodetrace_core::Rgba;

    #[test]
    fn test_defaults_validate() {
        let config = Config::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.machine.default_rapid_rate, DEFAULT_RAPID_RATE);
        assert!(config.machine.accelerations.is_none());
    }

    #[test]
    fn test_negative_rates_rejected() {
        let mut config = Config::new();
        config.machine.accelerations = Some(AxisRates::new(100.0, -1.0, 50.0, 0.0));
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, SettingsError::InvalidSetting { ref key, .. } if key == "machine.accelerations")
        );
    }

    #[test]
    fn test_zero_rapid_rate_rejected() {
        let mut config = Config::new();
        config.machine.default_rapid_rate = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_color_out_of_range_rejected() {
        let mut config = Config::new();
        config.visualizer.theme.arc_cw = Rgba::rgb(1.5, 0.0, 0.0);
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Config(ConfigError::ValueOutOfRange { ref key, .. })
                if key == "visualizer.theme.arc_cw"
        ));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [visualizer]
            laser_mode = true
            "#,
        )
        .unwrap();
        assert!(config.visualizer.laser_mode);
        assert_eq!(config.machine, MachineSettings::default());
    }

    #[test]
    fn test_job_request_carries_settings() {
        let mut config = Config::new();
        config.visualizer.atc_enabled = true;
        config.visualizer.include_svg = true;
        config.machine.max_feedrates = Some(AxisRates::new(5000.0, 5000.0, 1000.0, 0.0));

        let request = config.job_request("G1 X1", 4);
        assert_eq!(request.job_id, 4);
        assert_eq!(request.content, "G1 X1");
        assert!(request.atc_enabled);
        assert!(request.should_include_svg);
        assert!(request.needs_visualization);
        assert_eq!(request.max_feedrates, config.machine.max_feedrates);
        assert_eq!(request.theme, Some(config.visualizer.theme));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = Config::new()
            .save_to_file(Path::new("settings.yaml"))
            .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Config(ConfigError::UnsupportedFormat(ref ext)) if ext == "yaml"
        ));
    }
}
