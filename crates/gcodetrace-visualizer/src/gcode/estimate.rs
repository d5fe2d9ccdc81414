//! Distance and run-time estimation
//!
//! Accumulates per-class distances and a time estimate for every segment.
//! With acceleration tables each move follows a trapezoidal profile that
//! starts and ends at rest; without them a move takes `length / feed`.

use gcodetrace_core::{constants::DEFAULT_RAPID_RATE, FeedRateMode};
use serde::{Deserialize, Serialize};

use super::modal::ModalState;
use super::report::SegmentKind;

const AXIS_EPSILON: f64 = 1e-12;

/// Per-axis limits. Feed rates in mm/min (deg/min for A), accelerations in
/// mm/s² (deg/s² for A). Zero means unknown and places no limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisRates {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub a: f64,
}

impl AxisRates {
    pub fn new(x: f64, y: f64, z: f64, a: f64) -> Self {
        Self { x, y, z, a }
    }

    /// Limit along a unit direction `[x, y, z, a]`: the tightest axis wins
    pub fn along(&self, direction: [f64; 4]) -> Option<f64> {
        [self.x, self.y, self.z, self.a]
            .iter()
            .zip(direction)
            .filter(|(rate, component)| **rate > 0.0 && component.abs() > AXIS_EPSILON)
            .map(|(rate, component)| rate / component.abs())
            .reduce(f64::min)
    }

    pub fn is_valid(&self) -> bool {
        [self.x, self.y, self.z, self.a]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

/// Running distance and time totals. Distances in mm, times in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimates {
    pub rapid_distance: f64,
    pub feed_distance: f64,
    /// Share of `feed_distance` cut by arcs
    pub arc_distance: f64,
    pub total_distance: f64,
    pub rapid_time: f64,
    pub feed_time: f64,
    pub dwell_time: f64,
    pub total_time: f64,
}

/// Time estimator fed once per emitted segment
#[derive(Debug, Clone)]
pub struct Estimator {
    accelerations: Option<AxisRates>,
    max_feedrates: Option<AxisRates>,
    default_rapid_rate: f64,
    estimates: Estimates,
}

impl Default for Estimator {
    fn default() -> Self {
        Self::new(None, None, DEFAULT_RAPID_RATE)
    }
}

impl Estimator {
    pub fn new(
        accelerations: Option<AxisRates>,
        max_feedrates: Option<AxisRates>,
        default_rapid_rate: f64,
    ) -> Self {
        Self {
            accelerations,
            max_feedrates,
            default_rapid_rate,
            estimates: Estimates::default(),
        }
    }

    /// Account for one segment.
    ///
    /// `delta` is the displacement `[dx, dy, dz, da]`; `length` is the path
    /// length, which exceeds the chord for arcs.
    pub fn add_segment(
        &mut self,
        modal: &ModalState,
        kind: SegmentKind,
        delta: [f64; 4],
        length: f64,
    ) {
        let time = self.segment_time(modal, kind, delta, length);
        let e = &mut self.estimates;
        e.total_distance += length;
        e.total_time += time;
        match kind {
            SegmentKind::Rapid => {
                e.rapid_distance += length;
                e.rapid_time += time;
            }
            SegmentKind::Arc => {
                e.arc_distance += length;
                e.feed_distance += length;
                e.feed_time += time;
            }
            SegmentKind::Linear | SegmentKind::Curve => {
                e.feed_distance += length;
                e.feed_time += time;
            }
        }
    }

    pub fn add_dwell(&mut self, seconds: f64) {
        if seconds.is_finite() && seconds > 0.0 {
            self.estimates.dwell_time += seconds;
            self.estimates.total_time += seconds;
        }
    }

    pub fn estimates(&self) -> Estimates {
        self.estimates
    }

    fn segment_time(
        &self,
        modal: &ModalState,
        kind: SegmentKind,
        delta: [f64; 4],
        length: f64,
    ) -> f64 {
        if length <= 0.0 || !length.is_finite() {
            return 0.0;
        }

        if kind != SegmentKind::Rapid && modal.feed_rate_mode == FeedRateMode::InverseTime {
            return if modal.feed_rate > 0.0 {
                60.0 / modal.feed_rate
            } else {
                0.0
            };
        }

        let direction = unit_direction(delta);
        let axis_limit = direction.and_then(|d| self.max_feedrates.and_then(|m| m.along(d)));

        let rate_per_min = match kind {
            SegmentKind::Rapid => axis_limit.unwrap_or(self.default_rapid_rate),
            _ => match axis_limit {
                Some(limit) => modal.feed_rate.min(limit),
                None => modal.feed_rate,
            },
        };
        if rate_per_min <= 0.0 {
            return 0.0;
        }
        let velocity = rate_per_min / 60.0;

        let acceleration = direction.and_then(|d| self.accelerations.and_then(|a| a.along(d)));
        match acceleration {
            Some(accel) => trapezoid_time(length, velocity, accel),
            None => length / velocity,
        }
    }
}

fn unit_direction(delta: [f64; 4]) -> Option<[f64; 4]> {
    let norm = delta.iter().map(|c| c * c).sum::<f64>().sqrt();
    if norm <= AXIS_EPSILON {
        return None;
    }
    Some(delta.map(|c| c / norm))
}

/// Time to cover `length` from rest to rest with cruise `velocity` and
/// constant `accel`. Short moves never reach cruise and form a triangle.
pub fn trapezoid_time(length: f64, velocity: f64, accel: f64) -> f64 {
    if length <= 0.0 || velocity <= 0.0 {
        return 0.0;
    }
    if accel <= 0.0 {
        return length / velocity;
    }
    let ramp_distance = velocity * velocity / (2.0 * accel);
    if 2.0 * ramp_distance >= length {
        2.0 * (length / accel).sqrt()
    } else {
        2.0 * velocity / accel + (length - 2.0 * ramp_distance) / velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(rate: f64) -> ModalState {
        ModalState {
            feed_rate: rate,
            ..ModalState::default()
        }
    }

    #[test]
    fn test_plain_feed_time() {
        let mut est = Estimator::default();
        est.add_segment(&feed(600.0), SegmentKind::Linear, [10.0, 0.0, 0.0, 0.0], 10.0);
        let e = est.estimates();
        assert!((e.feed_time - 1.0).abs() < 1e-9);
        assert_eq!(e.feed_distance, 10.0);
        assert_eq!(e.total_distance, 10.0);
    }

    #[test]
    fn test_zero_feed_adds_distance_only() {
        let mut est = Estimator::default();
        est.add_segment(&feed(0.0), SegmentKind::Linear, [5.0, 0.0, 0.0, 0.0], 5.0);
        assert_eq!(est.estimates().feed_time, 0.0);
        assert_eq!(est.estimates().feed_distance, 5.0);
    }

    #[test]
    fn test_rapid_uses_default_rate() {
        let mut est = Estimator::default();
        est.add_segment(&feed(0.0), SegmentKind::Rapid, [50.0, 0.0, 0.0, 0.0], 50.0);
        assert!((est.estimates().rapid_time - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_tightest_axis_limits_rapid() {
        let limits = AxisRates::new(6000.0, 6000.0, 600.0, 0.0);
        let mut est = Estimator::new(None, Some(limits), DEFAULT_RAPID_RATE);
        est.add_segment(&feed(0.0), SegmentKind::Rapid, [0.0, 0.0, 10.0, 0.0], 10.0);
        assert!((est.estimates().rapid_time - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_trapezoid_profiles() {
        // cruise reached: two 1 s ramps cover 10 mm, 90 mm at 10 mm/s
        assert!((trapezoid_time(100.0, 10.0, 10.0) - 11.0).abs() < 1e-9);
        // triangle: never reaches cruise
        assert!((trapezoid_time(1.0, 100.0, 1.0) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_inverse_time_feed() {
        let mut modal = feed(30.0);
        modal.feed_rate_mode = FeedRateMode::InverseTime;
        let mut est = Estimator::default();
        est.add_segment(&modal, SegmentKind::Linear, [3.0, 4.0, 0.0, 0.0], 5.0);
        assert!((est.estimates().feed_time - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_dwell() {
        let mut est = Estimator::default();
        est.add_dwell(1.5);
        est.add_dwell(-1.0);
        assert_eq!(est.estimates().dwell_time, 1.5);
        assert_eq!(est.estimates().total_time, 1.5);
    }

    #[test]
    fn test_axis_rates_along() {
        let rates = AxisRates::new(1000.0, 500.0, 0.0, 0.0);
        let diag = std::f64::consts::FRAC_1_SQRT_2;
        let limit = rates.along([diag, diag, 0.0, 0.0]).unwrap();
        assert!((limit - 500.0 / diag).abs() < 1e-9);
        assert_eq!(rates.along([0.0, 0.0, 1.0, 0.0]), None);
    }
}
