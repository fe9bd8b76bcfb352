use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::{DomainPoint, DrawingRect, LogicalSize};

/// Drawing-surface space reserved around the image for axes and labels.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Margins {
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self { left, top, right, bottom }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (side, value) in [
            ("left", self.left),
            ("top", self.top),
            ("right", self.right),
            ("bottom", self.bottom),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidMargin { side, value });
            }
        }
        Ok(())
    }
}

/// Time/frequency extent of the analysis domain.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DomainBounds {
    pub time_min: f64,
    pub time_max: f64,
    pub freq_min: f64,
    pub freq_max: f64,
}

impl DomainBounds {
    pub const fn new(time_min: f64, time_max: f64, freq_min: f64, freq_max: f64) -> Self {
        Self { time_min, time_max, freq_min, freq_max }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !valid_range(self.time_min, self.time_max) {
            return Err(ConfigError::InvalidTimeRange { min: self.time_min, max: self.time_max });
        }
        if !valid_range(self.freq_min, self.freq_max) {
            return Err(ConfigError::InvalidFrequencyRange { min: self.freq_min, max: self.freq_max });
        }
        Ok(())
    }

    pub fn time_range(&self) -> f64 {
        self.time_max - self.time_min
    }

    pub fn freq_range(&self) -> f64 {
        self.freq_max - self.freq_min
    }

    pub fn contains(&self, p: DomainPoint) -> bool {
        p.time >= self.time_min
            && p.time <= self.time_max
            && p.freq >= self.freq_min
            && p.freq <= self.freq_max
    }

    pub fn clamp(&self, p: DomainPoint) -> DomainPoint {
        DomainPoint::new(
            p.time.max(self.time_min).min(self.time_max),
            p.freq.max(self.freq_min).min(self.freq_max),
        )
    }
}

fn valid_range(min: f64, max: f64) -> bool {
    min.is_finite() && max.is_finite() && min < max
}

/// Immutable description of one loaded image and the domain it depicts.
///
/// Frequency runs left to right along the image X axis; time runs bottom to
/// top, so image row 0 is `time_max`. A new image load builds a new value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DomainConfig {
    bounds: DomainBounds,
    image_width: f64,
    image_height: f64,
    margins: Margins,
}

impl DomainConfig {
    pub fn new(
        bounds: DomainBounds,
        image_width: f64,
        image_height: f64,
        margins: Margins,
    ) -> Result<Self, ConfigError> {
        bounds.validate()?;
        if !(image_width.is_finite() && image_height.is_finite() && image_width > 0.0 && image_height > 0.0) {
            return Err(ConfigError::InvalidImageSize { width: image_width, height: image_height });
        }
        margins.validate()?;
        Ok(Self { bounds, image_width, image_height, margins })
    }

    pub fn bounds(&self) -> &DomainBounds {
        &self.bounds
    }

    pub fn image_width(&self) -> f64 {
        self.image_width
    }

    pub fn image_height(&self) -> f64 {
        self.image_height
    }

    pub fn margins(&self) -> &Margins {
        &self.margins
    }

    /// Logical size of the whole drawing surface, margins included.
    pub fn logical_size(&self) -> LogicalSize {
        LogicalSize::new(
            self.margins.left + self.image_width + self.margins.right,
            self.margins.top + self.image_height + self.margins.bottom,
        )
    }

    /// The image's native (unzoomed) rectangle on the drawing surface. This
    /// is also the viewport: zoomed content is clipped to it.
    pub fn image_rect(&self) -> DrawingRect {
        DrawingRect::new(self.margins.left, self.margins.top, self.image_width, self.image_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> DomainBounds {
        DomainBounds::new(0.0, 60.0, 0.0, 100.0)
    }

    #[test]
    fn test_rejects_inverted_and_empty_ranges() {
        let err = DomainConfig::new(DomainBounds::new(5.0, 5.0, 0.0, 1.0), 10.0, 10.0, Margins::default());
        assert_eq!(err, Err(ConfigError::InvalidTimeRange { min: 5.0, max: 5.0 }));

        let err = DomainConfig::new(DomainBounds::new(0.0, 1.0, 9.0, 3.0), 10.0, 10.0, Margins::default());
        assert_eq!(err, Err(ConfigError::InvalidFrequencyRange { min: 9.0, max: 3.0 }));

        let err = DomainConfig::new(DomainBounds::new(f64::NAN, 1.0, 0.0, 1.0), 10.0, 10.0, Margins::default());
        assert!(matches!(err, Err(ConfigError::InvalidTimeRange { .. })));
    }

    #[test]
    fn test_rejects_bad_image_size_and_margins() {
        let err = DomainConfig::new(bounds(), 0.0, 600.0, Margins::default());
        assert!(matches!(err, Err(ConfigError::InvalidImageSize { .. })));

        let err = DomainConfig::new(bounds(), 1000.0, 600.0, Margins::new(0.0, -1.0, 0.0, 0.0));
        assert_eq!(err, Err(ConfigError::InvalidMargin { side: "top", value: -1.0 }));
    }

    #[test]
    fn test_logical_size_includes_margins() {
        let d = DomainConfig::new(bounds(), 1000.0, 600.0, Margins::new(60.0, 15.0, 15.0, 50.0)).unwrap();
        assert_eq!(d.logical_size(), LogicalSize::new(1075.0, 665.0));
        assert_eq!(d.image_rect(), DrawingRect::new(60.0, 15.0, 1000.0, 600.0));
    }
}
