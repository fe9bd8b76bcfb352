//! Zoom-aware hit-test tolerance.

use crate::annotation::ModeKind;
use crate::config::{ToleranceConfig, ToleranceProfile};
use crate::domain::DomainConfig;
use crate::geometry::DomainPoint;
use crate::viewport::ViewportState;

/// Per-axis hit radius in domain units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DomainTolerance {
    pub time: f64,
    pub freq: f64,
}

impl DomainTolerance {
    pub const fn new(time: f64, freq: f64) -> Self {
        Self { time, freq }
    }

    /// Box test: both axis distances within their tolerance.
    pub fn is_within(&self, target: DomainPoint, position: DomainPoint) -> bool {
        (target.time - position.time).abs() <= self.time && (target.freq - position.freq).abs() <= self.freq
    }

    /// Euclidean distance after scaling each axis by its tolerance; 1.0 is
    /// the edge of the hit ellipse.
    pub fn normalized_distance(&self, target: DomainPoint, position: DomainPoint) -> f64 {
        let nt = normalize_axis(target.time - position.time, self.time);
        let nf = normalize_axis(target.freq - position.freq, self.freq);
        (nt * nt + nf * nf).sqrt()
    }

    pub fn is_within_radius(&self, target: DomainPoint, position: DomainPoint) -> bool {
        self.normalized_distance(target, position) <= 1.0
    }
}

fn normalize_axis(delta: f64, tolerance: f64) -> f64 {
    if tolerance > 0.0 {
        delta / tolerance
    } else if delta == 0.0 {
        0.0
    } else {
        f64::INFINITY
    }
}

/// Pick the candidate with the smallest normalized distance ≤ 1.0. Ties go to
/// the earliest candidate.
pub fn find_closest_target<T, I>(candidates: I, position: DomainPoint, tolerance: &DomainTolerance) -> Option<T>
where
    I: IntoIterator<Item = (T, DomainPoint)>,
{
    let mut best: Option<(T, f64)> = None;
    for (target, at) in candidates {
        let d = tolerance.normalized_distance(at, position);
        if d > 1.0 || d.is_nan() {
            continue;
        }
        if best.as_ref().map_or(true, |(_, best_d)| d < *best_d) {
            best = Some((target, d));
        }
    }
    best.map(|(target, _)| target)
}

/// `(pixel_radius / image_pixels) × domain_range / zoom`, clamped into
/// `[min_fraction, max_fraction] × domain_range`.
fn axis_tolerance(pixel_radius: f64, image_pixels: f64, range: f64, zoom: f64, profile: &ToleranceProfile) -> f64 {
    let raw = pixel_radius / image_pixels * range / zoom;
    let lo = profile.min_fraction * range;
    let hi = profile.max_fraction * range;
    raw.max(lo).min(hi)
}

pub fn tolerance_for(profile: &ToleranceProfile, domain: &DomainConfig, viewport: &ViewportState) -> DomainTolerance {
    let b = domain.bounds();
    DomainTolerance {
        time: axis_tolerance(
            profile.pixel_radius,
            domain.image_height(),
            b.time_range(),
            viewport.scale_y(),
            profile,
        ),
        freq: axis_tolerance(
            profile.pixel_radius,
            domain.image_width(),
            b.freq_range(),
            viewport.scale_x(),
            profile,
        ),
    }
}

/// Resolves the configured per-mode pixel radius into domain units for the
/// current zoom.
#[derive(Clone, Debug, Default)]
pub struct ToleranceCalculator {
    config: ToleranceConfig,
}

impl ToleranceCalculator {
    pub fn new(config: ToleranceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ToleranceConfig {
        &self.config
    }

    pub fn get_tolerance(&self, mode: ModeKind, domain: &DomainConfig, viewport: &ViewportState) -> DomainTolerance {
        tolerance_for(self.config.profile(mode), domain, viewport)
    }
}
