//! Declarative surface settings. Parsing lives in the host crate; this module
//! only defines the shape, the defaults and validation.

use serde::{Deserialize, Serialize};

use crate::annotation::ModeKind;
use crate::domain::{DomainBounds, DomainConfig, Margins};
use crate::error::ConfigError;

/// Allowed zoom scale range and the per-notch wheel factor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomLimits {
    pub min: f64,
    pub max: f64,
    pub wheel_step: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: 1.0,
            max: 10.0,
            wheel_step: 1.1,
        }
    }
}

impl ZoomLimits {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ok = self.min.is_finite()
            && self.max.is_finite()
            && self.wheel_step.is_finite()
            && self.min >= 1.0
            && self.min <= self.max
            && self.wheel_step > 1.0;
        if ok {
            Ok(())
        } else {
            Err(ConfigError::InvalidZoomLimits { min: self.min, max: self.max, step: self.wheel_step })
        }
    }

    pub fn clamp(&self, scale: f64) -> f64 {
        scale.max(self.min).min(self.max)
    }
}

/// Hit-test radius for one mode.
///
/// The domain-space tolerance derived from `pixel_radius` is clamped per axis
/// into `[min_fraction, max_fraction] × axis range`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToleranceProfile {
    pub pixel_radius: f64,
    pub min_fraction: f64,
    pub max_fraction: f64,
}

impl Default for ToleranceProfile {
    fn default() -> Self {
        Self {
            pixel_radius: 12.0,
            min_fraction: 0.002,
            max_fraction: 0.05,
        }
    }
}

impl ToleranceProfile {
    pub const fn new(pixel_radius: f64, min_fraction: f64, max_fraction: f64) -> Self {
        Self { pixel_radius, min_fraction, max_fraction }
    }

    pub fn validate(&self, mode: ModeKind) -> Result<(), ConfigError> {
        let mode = mode.name();
        if !(self.pixel_radius.is_finite() && self.pixel_radius > 0.0) {
            return Err(ConfigError::InvalidTolerance { mode, reason: "pixel_radius must be positive" });
        }
        if !(self.min_fraction.is_finite() && self.max_fraction.is_finite()) {
            return Err(ConfigError::InvalidTolerance { mode, reason: "fractions must be finite" });
        }
        if !(self.min_fraction >= 0.0 && self.min_fraction <= self.max_fraction) {
            return Err(ConfigError::InvalidTolerance { mode, reason: "need 0 <= min_fraction <= max_fraction" });
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToleranceConfig {
    pub markers: ToleranceProfile,
    pub harmonics: ToleranceProfile,
    pub two_point: ToleranceProfile,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            markers: ToleranceProfile::new(12.0, 0.002, 0.05),
            // Comb lines are thin; give them a wider grab radius.
            harmonics: ToleranceProfile::new(16.0, 0.002, 0.08),
            two_point: ToleranceProfile::new(10.0, 0.002, 0.05),
        }
    }
}

impl ToleranceConfig {
    pub fn profile(&self, mode: ModeKind) -> &ToleranceProfile {
        match mode {
            ModeKind::Markers => &self.markers,
            ModeKind::Harmonics => &self.harmonics,
            ModeKind::TwoPoint => &self.two_point,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for mode in [ModeKind::Markers, ModeKind::Harmonics, ModeKind::TwoPoint] {
            self.profile(mode).validate(mode)?;
        }
        Ok(())
    }
}

fn default_rate_factor() -> f64 {
    1.0
}

fn default_keyboard_step_px() -> f64 {
    1.0
}

fn default_history_limit() -> usize {
    100
}

fn default_max_harmonics() -> u32 {
    200
}

/// Everything an analysis surface needs apart from the image itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    pub domain: DomainBounds,
    #[serde(default)]
    pub margins: Margins,
    #[serde(default)]
    pub zoom: ZoomLimits,
    #[serde(default)]
    pub tolerance: ToleranceConfig,
    /// Multiplier applied to `Δt · Δf` for the two-point magnitude.
    #[serde(default = "default_rate_factor")]
    pub rate_factor: f64,
    /// Image pixels moved per arrow-key press.
    #[serde(default = "default_keyboard_step_px")]
    pub keyboard_step_px: f64,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Most comb lines a harmonic set may place inside the frequency range;
    /// bounds the spacing from below.
    #[serde(default = "default_max_harmonics")]
    pub max_harmonics: u32,
}

impl SurfaceConfig {
    pub fn new(domain: DomainBounds, margins: Margins) -> Self {
        Self {
            domain,
            margins,
            zoom: ZoomLimits::default(),
            tolerance: ToleranceConfig::default(),
            rate_factor: default_rate_factor(),
            keyboard_step_px: default_keyboard_step_px(),
            history_limit: default_history_limit(),
            max_harmonics: default_max_harmonics(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.domain.validate()?;
        self.margins.validate()?;
        self.zoom.validate()?;
        self.tolerance.validate()?;
        if !self.rate_factor.is_finite() {
            return Err(ConfigError::InvalidSetting { field: "rate_factor", value: self.rate_factor });
        }
        if !(self.keyboard_step_px.is_finite() && self.keyboard_step_px > 0.0) {
            return Err(ConfigError::InvalidSetting { field: "keyboard_step_px", value: self.keyboard_step_px });
        }
        if self.history_limit == 0 {
            return Err(ConfigError::InvalidSetting { field: "history_limit", value: 0.0 });
        }
        if self.max_harmonics == 0 {
            return Err(ConfigError::InvalidSetting { field: "max_harmonics", value: 0.0 });
        }
        Ok(())
    }

    /// Smallest harmonic spacing in Hz: `max_harmonics` lines fill the
    /// frequency range.
    pub fn min_harmonic_spacing(&self) -> f64 {
        self.domain.freq_range() / self.max_harmonics.max(1) as f64
    }

    /// Bind these settings to an image of the given natural size.
    pub fn domain_for_image(&self, image_width: f64, image_height: f64) -> Result<DomainConfig, ConfigError> {
        DomainConfig::new(self.domain, image_width, image_height, self.margins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_validate() {
        let cfg = SurfaceConfig::new(DomainBounds::new(0.0, 60.0, 0.0, 100.0), Margins::default());
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn test_zoom_limits_reject_sub_unity_min() {
        let limits = ZoomLimits { min: 0.5, max: 10.0, wheel_step: 1.1 };
        assert!(matches!(limits.validate(), Err(ConfigError::InvalidZoomLimits { .. })));
        assert_eq!(ZoomLimits::default().clamp(25.0), 10.0);
        assert_eq!(ZoomLimits::default().clamp(0.2), 1.0);
    }

    #[test]
    fn test_tolerance_profile_rejects_inverted_fractions() {
        let mut cfg = ToleranceConfig::default();
        cfg.harmonics.min_fraction = 0.5;
        cfg.harmonics.max_fraction = 0.1;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::InvalidTolerance {
                mode: "harmonics",
                reason: "need 0 <= min_fraction <= max_fraction",
            })
        );
    }

    #[test]
    fn test_harmonic_spacing_floor_follows_range() {
        let mut cfg = SurfaceConfig::new(DomainBounds::new(0.0, 60.0, 20.0, 120.0), Margins::default());
        assert_eq!(cfg.min_harmonic_spacing(), 0.5);
        cfg.max_harmonics = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidSetting { field: "max_harmonics", .. })));
    }
}
