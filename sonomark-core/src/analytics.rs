//! Derived quantities shown alongside annotations.

use serde::{Deserialize, Serialize};

use crate::domain::DomainBounds;
use crate::geometry::DomainPoint;
use crate::transform::Transform;

/// One line of a harmonic comb.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Harmonic {
    pub number: u32,
    pub frequency: f64,
    pub drawing_x: f64,
}

/// Lazy, finite sequence of harmonics `n · spacing` for `n = 1, 2, …`.
///
/// Terms below `freq_min` are skipped. Generation stops at the first term
/// above `freq_max` or drawn right of `right_edge`: harmonics only increase,
/// so nothing after it can qualify. Clone or [`restart`](Self::restart) to
/// iterate again.
#[derive(Clone, Debug)]
pub struct HarmonicSeries {
    spacing: f64,
    bounds: DomainBounds,
    right_edge: f64,
    transform: Transform,
    next_number: u32,
    done: bool,
}

impl HarmonicSeries {
    pub fn restart(&mut self) {
        self.next_number = 1;
        self.done = !(self.spacing.is_finite() && self.spacing > 0.0);
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }
}

impl Iterator for HarmonicSeries {
    type Item = Harmonic;

    fn next(&mut self) -> Option<Harmonic> {
        if self.done {
            return None;
        }
        let mut n = self.next_number;
        let mut frequency = n as f64 * self.spacing;
        if frequency < self.bounds.freq_min {
            // Jump straight to the first harmonic at or above freq_min.
            let first = (self.bounds.freq_min / self.spacing).ceil();
            if first >= u32::MAX as f64 {
                self.done = true;
                return None;
            }
            n = (first as u32).max(n);
            frequency = n as f64 * self.spacing;
        }
        if frequency > self.bounds.freq_max {
            self.done = true;
            return None;
        }
        let drawing_x = self
            .transform
            .domain_to_drawing(DomainPoint::new(self.bounds.time_min, frequency))
            .x;
        if drawing_x > self.right_edge {
            self.done = true;
            return None;
        }
        match n.checked_add(1) {
            Some(next) => self.next_number = next,
            None => self.done = true,
        }
        Some(Harmonic { number: n, frequency, drawing_x })
    }
}

/// Harmonic comb for `spacing` Hz limited to `bounds` and to drawing X ≤
/// `right_edge`. Non-positive or non-finite spacing yields nothing.
pub fn generate_harmonic_series(
    spacing: f64,
    bounds: DomainBounds,
    right_edge: f64,
    transform: &Transform,
) -> HarmonicSeries {
    let mut series = HarmonicSeries {
        spacing,
        bounds,
        right_edge,
        transform: *transform,
        next_number: 1,
        done: false,
    };
    series.restart();
    series
}

/// Derived values of a two-point measurement; all `None` until both points
/// exist.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct TwoPointDelta {
    pub delta_time: Option<f64>,
    pub delta_frequency: Option<f64>,
    /// `|Δt · Δf · rate_factor|`.
    pub magnitude: Option<f64>,
}

pub fn compute_two_point_delta(
    start: Option<DomainPoint>,
    end: Option<DomainPoint>,
    rate_factor: f64,
) -> TwoPointDelta {
    let (Some(start), Some(end)) = (start, end) else {
        return TwoPointDelta::default();
    };
    let delta_time = end.time - start.time;
    let delta_frequency = end.freq - start.freq;
    TwoPointDelta {
        delta_time: Some(delta_time),
        delta_frequency: Some(delta_frequency),
        magnitude: Some((delta_time * delta_frequency * rate_factor).abs()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainConfig, Margins};
    use crate::viewport::ViewportState;

    fn transform(bounds: DomainBounds) -> Transform {
        let d = DomainConfig::new(bounds, 950.0, 600.0, Margins::new(60.0, 15.0, 15.0, 50.0)).unwrap();
        Transform::new(d, ViewportState::IDENTITY)
    }

    #[test]
    fn test_harmonics_stop_at_freq_max() {
        let bounds = DomainBounds::new(0.0, 60.0, 0.0, 95.0);
        let t = transform(bounds);
        let right = t.visible_rect().right();
        let freqs: Vec<f64> = generate_harmonic_series(10.0, bounds, right, &t)
            .map(|h| h.frequency)
            .collect();
        assert_eq!(freqs, vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0]);
        assert!(freqs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_harmonics_skip_below_min_and_number_correctly() {
        let bounds = DomainBounds::new(0.0, 60.0, 25.0, 95.0);
        let t = transform(bounds);
        let series: Vec<Harmonic> = generate_harmonic_series(10.0, bounds, f64::INFINITY, &t).collect();
        assert_eq!(series.first().map(|h| h.number), Some(3));
        assert_eq!(series.last().map(|h| h.number), Some(9));
    }

    #[test]
    fn test_harmonics_stop_at_right_edge() {
        let bounds = DomainBounds::new(0.0, 60.0, 0.0, 95.0);
        let t = transform(bounds);
        // 10 Hz per 100 drawing units, image starts at x=60: 40 Hz sits at x=460.
        let series: Vec<Harmonic> = generate_harmonic_series(10.0, bounds, 465.0, &t).collect();
        assert_eq!(series.len(), 4);
        assert!((series[3].drawing_x - 460.0).abs() < 1e-9);
    }

    #[test]
    fn test_harmonic_series_restarts() {
        let bounds = DomainBounds::new(0.0, 60.0, 0.0, 95.0);
        let t = transform(bounds);
        let mut series = generate_harmonic_series(30.0, bounds, f64::INFINITY, &t);
        assert_eq!(series.by_ref().count(), 3);
        assert_eq!(series.next(), None);
        series.restart();
        assert_eq!(series.count(), 3);

        assert_eq!(generate_harmonic_series(0.0, bounds, f64::INFINITY, &t).count(), 0);
        assert_eq!(generate_harmonic_series(f64::NAN, bounds, f64::INFINITY, &t).count(), 0);
    }

    #[test]
    fn test_two_point_delta() {
        let d = compute_two_point_delta(Some(DomainPoint::new(0.0, 100.0)), Some(DomainPoint::new(2.0, 120.0)), 1.0);
        assert_eq!(d.delta_time, Some(2.0));
        assert_eq!(d.delta_frequency, Some(20.0));
        assert_eq!(d.magnitude, Some(40.0));

        let reversed =
            compute_two_point_delta(Some(DomainPoint::new(2.0, 120.0)), Some(DomainPoint::new(0.0, 100.0)), 0.5);
        assert_eq!(reversed.delta_time, Some(-2.0));
        assert_eq!(reversed.magnitude, Some(20.0));

        assert_eq!(compute_two_point_delta(None, Some(DomainPoint::new(1.0, 1.0)), 1.0), TwoPointDelta::default());
    }
}
