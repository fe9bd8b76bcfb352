//! Coordinate transforms, viewport, hit-testing and drag interaction for
//! annotating time/frequency images.
//!
//! Four spaces are involved: screen (pointer events), the drawing surface
//! (logical units, image plus margins), image pixels, and the domain
//! (seconds × Hz). Frequency runs along X; time runs along Y with the top row
//! at `time_max`. No browser types appear here; the `sonomark` crate
//! translates DOM events into [`input`] values.

pub mod analytics;
pub mod annotation;
pub mod config;
pub mod domain;
pub mod drag;
pub mod error;
pub mod geometry;
pub mod hooks;
pub mod input;
pub mod modes;
pub mod surface;
pub mod tolerance;
pub mod transform;
pub mod viewport;

pub use analytics::{compute_two_point_delta, generate_harmonic_series, Harmonic, HarmonicSeries, TwoPointDelta};
pub use annotation::{
    AnnotationId, Endpoint, HarmonicSet, Marker, ModeKind, Selection, TargetKind, TwoPointMeasurement,
};
pub use config::{SurfaceConfig, ToleranceConfig, ToleranceProfile, ZoomLimits};
pub use domain::{DomainBounds, DomainConfig, Margins};
pub use drag::{DragController, DragState, DragTarget, DragTargets, TargetPayload};
pub use error::ConfigError;
pub use geometry::{
    DomainPoint, DrawingPoint, DrawingRect, ImagePoint, LogicalSize, ScreenPoint, SurfaceGeometry, SurfaceRect,
};
pub use hooks::{CursorHint, HookLog, HostHooks, NoopHooks, SurfaceEvent};
pub use input::{Key, KeyInput, PointerInput, PointerKind, WheelInput};
pub use modes::{AnnotationLayer, OverlayItem};
pub use surface::AnalysisSurface;
pub use tolerance::{DomainTolerance, ToleranceCalculator};
pub use transform::Transform;
pub use viewport::{ViewportController, ViewportState, ZoomCenter, ZoomMode};
