use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned extent accumulator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new()
    }
}

impl Bounds {
    pub fn new() -> Self {
        Self {
            min_x: f64::MAX,
            max_x: f64::MIN,
            min_y: f64::MAX,
            max_y: f64::MIN,
            min_z: f64::MAX,
            max_z: f64::MIN,
        }
    }

    pub fn update(&mut self, x: f64, y: f64, z: f64) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
        self.min_z = self.min_z.min(z);
        self.max_z = self.max_z.max(z);
    }

    pub fn update_point(&mut self, p: DVec3) {
        self.update(p.x, p.y, p.z);
    }

    pub fn is_valid(&self) -> bool {
        self.min_x.is_finite()
            && self.max_x.is_finite()
            && self.min_y.is_finite()
            && self.max_y.is_finite()
            && self.min_z.is_finite()
            && self.max_z.is_finite()
            && self.min_x <= self.max_x
            && self.min_y <= self.max_y
            // a flat program has min_z == max_z
            && self.min_z <= self.max_z
    }

    /// `Some(self)` once at least one point was added
    pub fn finished(self) -> Option<Self> {
        self.is_valid().then_some(self)
    }

    pub fn size(&self) -> DVec3 {
        if !self.is_valid() {
            return DVec3::ZERO;
        }
        DVec3::new(
            self.max_x - self.min_x,
            self.max_y - self.min_y,
            self.max_z - self.min_z,
        )
    }

    pub fn merge(&mut self, other: &Bounds) {
        if other.is_valid() {
            self.update(other.min_x, other.min_y, other.min_z);
            self.update(other.max_x, other.max_y, other.max_z);
        }
    }
}
