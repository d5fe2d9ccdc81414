//! Unit formatting utilities
//!
//! Formats millimetre lengths, feed rates and durations for display in
//! either metric or imperial units.

use crate::data::Units;

/// Format length value for display
///
/// * `value_mm` - Value in millimeters
/// * `units` - Target units
pub fn format_length(value_mm: f64, units: Units) -> String {
    match units {
        Units::MM => format!("{:.3} mm", value_mm),
        Units::INCH => format!("{:.3} in", Units::convert(value_mm, Units::MM, Units::INCH)),
    }
}

/// Format feed rate value for display
///
/// * `value_mm_per_min` - Feed rate in mm/min
/// * `units` - Target units
pub fn format_feed_rate(value_mm_per_min: f64, units: Units) -> String {
    match units {
        Units::MM => format!("{:.1} mm/min", value_mm_per_min),
        Units::INCH => format!(
            "{:.2} in/min",
            Units::convert(value_mm_per_min, Units::MM, Units::INCH)
        ),
    }
}

/// Format a duration in seconds as `H:MM:SS`
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.round() as u64
    } else {
        0
    };
    format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

/// Get the unit label ("mm" or "in")
pub fn get_unit_label(units: Units) -> &'static str {
    match units {
        Units::MM => "mm",
        Units::INCH => "in",
    }
}
