//! Conversions between screen, drawing-surface, image and domain space.
//!
//! Everything here is a pure function of its arguments. Callers pass the
//! current [`DomainConfig`], [`ViewportState`] and [`SurfaceGeometry`] on every
//! call; nothing is cached, so a resize or zoom can never leave a stale
//! transform behind.

use crate::domain::DomainConfig;
use crate::geometry::{
    axis_ratio, DomainPoint, DrawingPoint, DrawingRect, ImagePoint, LogicalSize, ScreenPoint, SurfaceGeometry,
    SurfaceRect,
};
use crate::viewport::ViewportState;

// ── Screen ↔ drawing surface ────────────────────────────────────────────────

/// Map a screen point onto the drawing surface, scaling by
/// `logical / on-screen` per axis. Falls back to 1:1 (offset only) on an
/// axis whose logical or on-screen size is degenerate.
pub fn screen_to_drawing(point: ScreenPoint, rect: SurfaceRect, logical: LogicalSize) -> DrawingPoint {
    DrawingPoint::new(
        (point.x - rect.left) * axis_ratio(logical.width, rect.width),
        (point.y - rect.top) * axis_ratio(logical.height, rect.height),
    )
}

pub fn drawing_to_screen(point: DrawingPoint, rect: SurfaceRect, logical: LogicalSize) -> ScreenPoint {
    ScreenPoint::new(
        rect.left + point.x / axis_ratio(logical.width, rect.width),
        rect.top + point.y / axis_ratio(logical.height, rect.height),
    )
}

// ── Drawing surface ↔ image ─────────────────────────────────────────────────

/// Where the (possibly zoomed) image is currently drawn. Equal to
/// [`DomainConfig::image_rect`] when unzoomed.
pub fn drawn_image_rect(domain: &DomainConfig, viewport: &ViewportState) -> DrawingRect {
    let m = domain.margins();
    DrawingRect::new(
        m.left + viewport.pan_x(),
        m.top + viewport.pan_y(),
        domain.image_width() * viewport.scale_x(),
        domain.image_height() * viewport.scale_y(),
    )
}

pub fn drawing_to_image_unclamped(point: DrawingPoint, domain: &DomainConfig, viewport: &ViewportState) -> ImagePoint {
    let drawn = drawn_image_rect(domain, viewport);
    ImagePoint::new(
        (point.x - drawn.x) / viewport.scale_x(),
        (point.y - drawn.y) / viewport.scale_y(),
    )
}

/// Drawing point to natural image pixels, clamped into
/// `[0, width] × [0, height]`.
pub fn drawing_to_image(point: DrawingPoint, domain: &DomainConfig, viewport: &ViewportState) -> ImagePoint {
    let ip = drawing_to_image_unclamped(point, domain, viewport);
    ImagePoint::new(
        ip.x.max(0.0).min(domain.image_width()),
        ip.y.max(0.0).min(domain.image_height()),
    )
}

pub fn image_to_drawing(point: ImagePoint, domain: &DomainConfig, viewport: &ViewportState) -> DrawingPoint {
    let drawn = drawn_image_rect(domain, viewport);
    DrawingPoint::new(
        drawn.x + point.x * viewport.scale_x(),
        drawn.y + point.y * viewport.scale_y(),
    )
}

// ── Image ↔ domain ──────────────────────────────────────────────────────────

/// Linear map with the time axis inverted: image row 0 is `time_max`.
pub fn image_to_domain(point: ImagePoint, domain: &DomainConfig) -> DomainPoint {
    let b = domain.bounds();
    DomainPoint::new(
        b.time_max - point.y / domain.image_height() * b.time_range(),
        b.freq_min + point.x / domain.image_width() * b.freq_range(),
    )
}

pub fn domain_to_image(point: DomainPoint, domain: &DomainConfig) -> ImagePoint {
    let b = domain.bounds();
    ImagePoint::new(
        (point.freq - b.freq_min) / b.freq_range() * domain.image_width(),
        (b.time_max - point.time) / b.time_range() * domain.image_height(),
    )
}

// ── Composites ──────────────────────────────────────────────────────────────

/// Drawing point to domain. Points off the image clamp to its nearest edge;
/// use [`drawing_to_domain_checked`] to tell them apart.
pub fn drawing_to_domain(point: DrawingPoint, domain: &DomainConfig, viewport: &ViewportState) -> DomainPoint {
    image_to_domain(drawing_to_image(point, domain, viewport), domain)
}

/// Exact inverse of [`drawing_to_domain`] for points inside the visible
/// image; used to place every overlay.
pub fn domain_to_drawing(point: DomainPoint, domain: &DomainConfig, viewport: &ViewportState) -> DrawingPoint {
    image_to_drawing(domain_to_image(point, domain), domain, viewport)
}

/// `None` when the point lies outside the visible image area.
pub fn drawing_to_domain_checked(
    point: DrawingPoint,
    domain: &DomainConfig,
    viewport: &ViewportState,
) -> Option<DomainPoint> {
    if !domain.image_rect().contains(point) {
        return None;
    }
    Some(drawing_to_domain(point, domain, viewport))
}

pub fn screen_to_domain(
    point: ScreenPoint,
    geometry: &SurfaceGeometry,
    domain: &DomainConfig,
    viewport: &ViewportState,
) -> DomainPoint {
    drawing_to_domain(screen_to_drawing(point, geometry.rect, geometry.logical), domain, viewport)
}

pub fn screen_to_domain_checked(
    point: ScreenPoint,
    geometry: &SurfaceGeometry,
    domain: &DomainConfig,
    viewport: &ViewportState,
) -> Option<DomainPoint> {
    drawing_to_domain_checked(screen_to_drawing(point, geometry.rect, geometry.logical), domain, viewport)
}

pub fn domain_to_screen(
    point: DomainPoint,
    geometry: &SurfaceGeometry,
    domain: &DomainConfig,
    viewport: &ViewportState,
) -> ScreenPoint {
    drawing_to_screen(domain_to_drawing(point, domain, viewport), geometry.rect, geometry.logical)
}

/// The domain config and viewport captured together for one event.
///
/// Cheap to copy; build a fresh one from the owning controllers whenever the
/// view may have changed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    domain: DomainConfig,
    viewport: ViewportState,
}

impl Transform {
    pub fn new(domain: DomainConfig, viewport: ViewportState) -> Self {
        Self { domain, viewport }
    }

    pub fn domain(&self) -> &DomainConfig {
        &self.domain
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn visible_rect(&self) -> DrawingRect {
        self.domain.image_rect()
    }

    pub fn drawn_image_rect(&self) -> DrawingRect {
        drawn_image_rect(&self.domain, &self.viewport)
    }

    pub fn drawing_to_domain(&self, point: DrawingPoint) -> DomainPoint {
        drawing_to_domain(point, &self.domain, &self.viewport)
    }

    pub fn drawing_to_domain_checked(&self, point: DrawingPoint) -> Option<DomainPoint> {
        drawing_to_domain_checked(point, &self.domain, &self.viewport)
    }

    pub fn domain_to_drawing(&self, point: DomainPoint) -> DrawingPoint {
        domain_to_drawing(point, &self.domain, &self.viewport)
    }

    pub fn screen_to_domain(&self, point: ScreenPoint, geometry: &SurfaceGeometry) -> DomainPoint {
        screen_to_domain(point, geometry, &self.domain, &self.viewport)
    }

    pub fn screen_to_domain_checked(&self, point: ScreenPoint, geometry: &SurfaceGeometry) -> Option<DomainPoint> {
        screen_to_domain_checked(point, geometry, &self.domain, &self.viewport)
    }

    pub fn domain_to_screen(&self, point: DomainPoint, geometry: &SurfaceGeometry) -> ScreenPoint {
        domain_to_screen(point, geometry, &self.domain, &self.viewport)
    }

    /// Domain size of one natural image pixel on each axis at the current
    /// zoom, as `(time, freq)`.
    pub fn domain_per_pixel(&self) -> (f64, f64) {
        let b = self.domain.bounds();
        (
            b.time_range() / (self.domain.image_height() * self.viewport.scale_y()),
            b.freq_range() / (self.domain.image_width() * self.viewport.scale_x()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainBounds, Margins};

    fn scenario() -> DomainConfig {
        DomainConfig::new(
            DomainBounds::new(0.0, 60.0, 0.0, 100.0),
            1000.0,
            600.0,
            Margins::new(60.0, 15.0, 15.0, 50.0),
        )
        .unwrap()
    }

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_screen_center_maps_to_domain_center() {
        let d = scenario();
        let vp = ViewportState::IDENTITY;
        // Surface shown at 1.5x its logical size, offset on the page.
        let rect = SurfaceRect::new(100.0, 40.0, 1075.0 * 1.5, 665.0 * 1.5);
        let geometry = SurfaceGeometry::new(rect, d.logical_size());
        let image_center = d.image_rect().center();
        let screen = drawing_to_screen(image_center, rect, d.logical_size());

        let p = screen_to_domain(screen, &geometry, &d, &vp);
        assert!(approx(p.freq, 50.0, 1e-9), "freq {}", p.freq);
        assert!(approx(p.time, 30.0, 1e-9), "time {}", p.time);
    }

    #[test]
    fn test_time_axis_is_inverted() {
        let d = scenario();
        let vp = ViewportState::IDENTITY;
        let top_left = drawing_to_domain(DrawingPoint::new(60.0, 15.0), &d, &vp);
        assert_eq!(top_left, DomainPoint::new(60.0, 0.0));
        let bottom_right = drawing_to_domain(DrawingPoint::new(1060.0, 615.0), &d, &vp);
        assert_eq!(bottom_right, DomainPoint::new(0.0, 100.0));
    }

    #[test]
    fn test_round_trip_across_zoom_levels() {
        let d = scenario();
        let points = [
            DomainPoint::new(30.0, 50.0),
            DomainPoint::new(0.5, 99.0),
            DomainPoint::new(59.9, 0.1),
            DomainPoint::new(12.34, 56.78),
        ];
        for zoom in [1.0, 1.7, 2.0, 4.5, 10.0] {
            let vp = ViewportState::new(zoom, zoom, 0.0, 0.0, &d);
            // Centre each point in the view so it is visible.
            for p in points {
                let ip = domain_to_image(p, &d);
                let vp = ViewportState::new(zoom, zoom, 500.0 - ip.x * zoom, 300.0 - ip.y * zoom, &d);
                let drawing = domain_to_drawing(p, &d, &vp);
                if !d.image_rect().contains(drawing) {
                    continue;
                }
                let back = drawing_to_domain(drawing, &d, &vp);
                assert!(approx(back.time, p.time, 1e-6), "zoom {zoom}: time {} != {}", back.time, p.time);
                assert!(approx(back.freq, p.freq, 1e-6), "zoom {zoom}: freq {} != {}", back.freq, p.freq);
            }
            assert!(vp.scale_x() >= 1.0);
        }
    }

    #[test]
    fn test_drawing_round_trip_inside_visible_rect() {
        let d = scenario();
        let vp = ViewportState::new(3.0, 3.0, -1200.0, -500.0, &d);
        for (x, y) in [(60.0, 15.0), (300.5, 200.25), (1060.0, 615.0), (777.0, 444.0)] {
            let p = DrawingPoint::new(x, y);
            let back = domain_to_drawing(drawing_to_domain(p, &d, &vp), &d, &vp);
            assert!(approx(back.x, x, 1e-6) && approx(back.y, y, 1e-6), "{back:?} != {p:?}");
        }
    }

    #[test]
    fn test_outside_image_clamps_or_reports_none() {
        let d = scenario();
        let vp = ViewportState::IDENTITY;
        let margin_point = DrawingPoint::new(20.0, 700.0);
        assert_eq!(drawing_to_domain_checked(margin_point, &d, &vp), None);
        assert_eq!(drawing_to_domain(margin_point, &d, &vp), DomainPoint::new(0.0, 0.0));
    }

    #[test]
    fn test_zoomed_uses_drawn_rect() {
        let d = scenario();
        let vp = ViewportState::new(2.0, 2.0, -1000.0, -600.0, &d);
        // Showing the bottom-right quarter: the viewport's top-left is the image center.
        let p = drawing_to_domain(DrawingPoint::new(60.0, 15.0), &d, &vp);
        assert!(approx(p.freq, 50.0, 1e-9));
        assert!(approx(p.time, 30.0, 1e-9));
        assert_eq!(drawn_image_rect(&d, &vp), DrawingRect::new(-940.0, -585.0, 2000.0, 1200.0));
    }

    #[test]
    fn test_degenerate_logical_size_maps_one_to_one() {
        let rect = SurfaceRect::new(10.0, 20.0, 300.0, 200.0);
        let p = screen_to_drawing(ScreenPoint::new(110.0, 70.0), rect, LogicalSize::new(0.0, -5.0));
        assert_eq!(p, DrawingPoint::new(100.0, 50.0));
    }

    #[test]
    fn test_domain_per_pixel_shrinks_with_zoom() {
        let d = scenario();
        let t1 = Transform::new(d, ViewportState::IDENTITY);
        let t4 = Transform::new(d, ViewportState::new(4.0, 2.0, 0.0, 0.0, &d));
        assert_eq!(t1.domain_per_pixel(), (0.1, 0.1));
        assert_eq!(t4.domain_per_pixel(), (0.05, 0.025));
    }
}
