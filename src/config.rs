//! Loading [`SurfaceConfig`] from YAML or JSON text.
//!
//! ```yaml
//! domain: { time_min: 0, time_max: 60, freq_min: 0, freq_max: 100 }
//! margins: { left: 60, top: 15, right: 15, bottom: 50 }
//! zoom: { max: 8 }
//! tolerance:
//!   harmonics: { pixel_radius: 20 }
//! rate_factor: 0.5
//! ```

use std::path::Path;

use sonomark_core::{ConfigError, SurfaceConfig};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] yaml_serde::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// Pick the format from a file extension. Unknown extensions read as YAML,
    /// which also accepts plain JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

/// Parse and validate.
pub fn load(text: &str, format: Format) -> Result<SurfaceConfig, LoadError> {
    let parsed = match format {
        Format::Yaml => yaml_serde::from_str::<SurfaceConfig>(text).map_err(LoadError::from),
        Format::Json => serde_json::from_str::<SurfaceConfig>(text).map_err(LoadError::from),
    };
    let result = parsed.and_then(|config| {
        config.validate()?;
        Ok(config)
    });
    if let Err(e) = &result {
        log::warn!("surface config rejected: {e}");
    }
    result
}

pub fn load_yaml(text: &str) -> Result<SurfaceConfig, LoadError> {
    load(text, Format::Yaml)
}

pub fn load_json(text: &str) -> Result<SurfaceConfig, LoadError> {
    load(text, Format::Json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_with_defaults() {
        let config = load_yaml(
            "domain: { time_min: 0, time_max: 60, freq_min: 0, freq_max: 100 }\n\
             margins: { left: 60, top: 15, right: 15, bottom: 50 }\n\
             zoom: { max: 8 }\n\
             tolerance:\n  harmonics: { pixel_radius: 20 }\n",
        )
        .unwrap();
        assert_eq!(config.domain.time_max, 60.0);
        assert_eq!(config.margins.left, 60.0);
        assert_eq!(config.zoom.max, 8.0);
        assert_eq!(config.zoom.min, 1.0);
        assert_eq!(config.tolerance.harmonics.pixel_radius, 20.0);
        assert_eq!(config.rate_factor, 1.0);
        assert_eq!(config.history_limit, 100);
    }

    #[test]
    fn test_json_is_accepted() {
        let config = load_json(
            r#"{"domain": {"time_min": 1, "time_max": 2, "freq_min": 10, "freq_max": 20}, "rate_factor": 0.5}"#,
        )
        .unwrap();
        assert_eq!(config.domain.freq_min, 10.0);
        assert_eq!(config.rate_factor, 0.5);
    }

    #[test]
    fn test_degenerate_domain_is_rejected() {
        let err = load_yaml("domain: { time_min: 5, time_max: 5, freq_min: 0, freq_max: 100 }").unwrap_err();
        assert!(matches!(err, LoadError::Invalid(ConfigError::InvalidTimeRange { .. })), "{err}");
    }

    #[test]
    fn test_parse_errors_are_reported() {
        assert!(matches!(load_json("{"), Err(LoadError::Json(_))));
        assert!(matches!(load_yaml("domain: [1, 2"), Err(LoadError::Yaml(_))));
        assert!(matches!(load_yaml("margins: { left: 1 }"), Err(LoadError::Yaml(_))));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_path("surface.json"), Format::Json);
        assert_eq!(Format::from_path("surface.JSON"), Format::Json);
        assert_eq!(Format::from_path("surface.yaml"), Format::Yaml);
        assert_eq!(Format::from_path("surface"), Format::Yaml);
    }
}
