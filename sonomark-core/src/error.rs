/// Rejected analysis-surface configuration.
///
/// Raised only while building a [`DomainConfig`](crate::domain::DomainConfig)
/// or validating a [`SurfaceConfig`](crate::config::SurfaceConfig). Runtime
/// input (pointer outside the image, zoom requests past the limits) is never
/// an error; it is clamped or ignored.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("time range must be finite with min < max, got [{min}, {max}]")]
    InvalidTimeRange { min: f64, max: f64 },

    #[error("frequency range must be finite with min < max, got [{min}, {max}]")]
    InvalidFrequencyRange { min: f64, max: f64 },

    #[error("image size must be positive, got {width}x{height}")]
    InvalidImageSize { width: f64, height: f64 },

    #[error("margin `{side}` must be finite and non-negative, got {value}")]
    InvalidMargin { side: &'static str, value: f64 },

    #[error("zoom limits must satisfy 1 <= min <= max with step > 1, got [{min}, {max}] step {step}")]
    InvalidZoomLimits { min: f64, max: f64, step: f64 },

    #[error("tolerance profile `{mode}` is invalid: {reason}")]
    InvalidTolerance { mode: &'static str, reason: &'static str },

    #[error("`{field}` must be finite and positive, got {value}")]
    InvalidSetting { field: &'static str, value: f64 },
}
