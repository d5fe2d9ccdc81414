//! Shared color palette
//!
//! One immutable palette consumed both by the geometry handler's
//! per-tool color rotation and by the standalone recoloring pass.

use serde::{Deserialize, Serialize};

/// Linear RGBA color with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

impl Rgba {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Same color with a different alpha
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// True when every component lies in `0.0..=1.0`
    pub fn is_valid(&self) -> bool {
        [self.r, self.g, self.b, self.a]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }
}

/// Colors cycled through per tool segment once a program changes tools.
/// Tool segment `n` uses entry `n % 20`.
pub const TOOL_PALETTE: [Rgba; 20] = [
    Rgba::rgb(0.157, 0.533, 0.859),
    Rgba::rgb(0.902, 0.298, 0.235),
    Rgba::rgb(0.180, 0.800, 0.443),
    Rgba::rgb(0.945, 0.769, 0.059),
    Rgba::rgb(0.608, 0.349, 0.714),
    Rgba::rgb(0.102, 0.737, 0.612),
    Rgba::rgb(0.902, 0.494, 0.133),
    Rgba::rgb(0.914, 0.118, 0.388),
    Rgba::rgb(0.404, 0.227, 0.718),
    Rgba::rgb(0.000, 0.588, 0.533),
    Rgba::rgb(0.545, 0.765, 0.290),
    Rgba::rgb(1.000, 0.596, 0.000),
    Rgba::rgb(0.475, 0.333, 0.282),
    Rgba::rgb(0.376, 0.490, 0.545),
    Rgba::rgb(0.012, 0.663, 0.957),
    Rgba::rgb(0.804, 0.863, 0.224),
    Rgba::rgb(1.000, 0.341, 0.133),
    Rgba::rgb(0.612, 0.153, 0.690),
    Rgba::rgb(0.247, 0.318, 0.710),
    Rgba::rgb(0.298, 0.686, 0.314),
];

/// Palette color for the given tool segment
pub fn tool_color(segment: usize) -> Rgba {
    TOOL_PALETTE[segment % TOOL_PALETTE.len()]
}

/// Motion colors supplied by the host theme
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeColors {
    /// G0 rapid moves
    pub rapid: Rgba,
    /// G1 linear feed moves
    pub linear: Rgba,
    /// G2 clockwise arcs
    pub arc_cw: Rgba,
    /// G3 counter-clockwise arcs
    pub arc_ccw: Rgba,
    /// Laser moves with the beam off
    pub laser_off: Rgba,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            rapid: Rgba::rgb(0.353, 0.400, 0.451),
            linear: Rgba::rgb(0.157, 0.533, 0.859),
            arc_cw: Rgba::rgb(0.180, 0.800, 0.443),
            arc_ccw: Rgba::rgb(0.180, 0.600, 0.800),
            laser_off: Rgba::rgb(0.600, 0.600, 0.600),
        }
    }
}

impl ThemeColors {
    pub fn is_valid(&self) -> bool {
        [
            self.rapid,
            self.linear,
            self.arc_cw,
            self.arc_ccw,
            self.laser_off,
        ]
        .iter()
        .all(Rgba::is_valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_color_wraps_after_palette() {
        assert_eq!(tool_color(0), TOOL_PALETTE[0]);
        assert_eq!(tool_color(19), TOOL_PALETTE[19]);
        assert_eq!(tool_color(20), TOOL_PALETTE[0]);
        assert_eq!(tool_color(43), TOOL_PALETTE[3]);
    }

    #[test]
    fn test_palette_is_valid() {
        assert!(TOOL_PALETTE.iter().all(Rgba::is_valid));
        assert!(ThemeColors::default().is_valid());
    }

    #[test]
    fn test_with_alpha() {
        let c = Rgba::rgb(1.0, 0.0, 0.0).with_alpha(0.5);
        assert_eq!(c.to_array(), [1.0, 0.0, 0.0, 0.5]);
    }
}
