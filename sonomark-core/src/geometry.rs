//! Point and rectangle types for the four coordinate spaces.
//!
//! - Screen: raw pointer coordinates (client pixels).
//! - Drawing: the logical drawing surface (viewBox units), independent of
//!   on-screen size.
//! - Image: natural image pixels, `[0, width] × [0, height]`, row 0 at the top.
//! - Domain: time (seconds) and frequency (Hz).
//!
//! Each space gets its own type so a screen point can never be passed where a
//! drawing point is expected.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct DrawingPoint {
    pub x: f64,
    pub y: f64,
}

impl DrawingPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ImagePoint {
    pub x: f64,
    pub y: f64,
}

impl ImagePoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A position in analysis space.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct DomainPoint {
    /// Seconds.
    pub time: f64,
    /// Hz.
    pub freq: f64,
}

impl DomainPoint {
    pub const fn new(time: f64, freq: f64) -> Self {
        Self { time, freq }
    }
}

/// On-screen box of the drawing surface (e.g. from `getBoundingClientRect`).
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct SurfaceRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl SurfaceRect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }
}

/// Logical (viewBox) size of the drawing surface.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct LogicalSize {
    pub width: f64,
    pub height: f64,
}

impl LogicalSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Where the drawing surface currently sits on screen and how large it is
/// logically. Hosts refresh this on every resize; nothing caches it.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct SurfaceGeometry {
    pub rect: SurfaceRect,
    pub logical: LogicalSize,
}

impl SurfaceGeometry {
    pub const fn new(rect: SurfaceRect, logical: LogicalSize) -> Self {
        Self { rect, logical }
    }

    /// Drawing units per screen pixel on each axis, 1.0 when either size is
    /// degenerate.
    pub fn drawing_per_screen(&self) -> (f64, f64) {
        (
            axis_ratio(self.logical.width, self.rect.width),
            axis_ratio(self.logical.height, self.rect.height),
        )
    }

    /// Convert a pointer movement in screen pixels into drawing units.
    pub fn screen_delta_to_drawing(&self, dx: f64, dy: f64) -> (f64, f64) {
        let (rx, ry) = self.drawing_per_screen();
        (dx * rx, dy * ry)
    }
}

pub(crate) fn axis_ratio(logical: f64, on_screen: f64) -> f64 {
    if logical > 0.0 && on_screen > 0.0 && logical.is_finite() && on_screen.is_finite() {
        logical / on_screen
    } else {
        1.0
    }
}

/// Axis-aligned rectangle in drawing-surface units.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct DrawingRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DrawingRect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> DrawingPoint {
        DrawingPoint::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive on all four edges.
    pub fn contains(&self, p: DrawingPoint) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    pub fn clamp(&self, p: DrawingPoint) -> DrawingPoint {
        DrawingPoint::new(
            p.x.max(self.x).min(self.right()),
            p.y.max(self.y).min(self.bottom()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drawing_per_screen_falls_back_on_degenerate_sizes() {
        let g = SurfaceGeometry::new(
            SurfaceRect::new(0.0, 0.0, 500.0, 0.0),
            LogicalSize::new(1000.0, 600.0),
        );
        assert_eq!(g.drawing_per_screen(), (2.0, 1.0));

        let g = SurfaceGeometry::new(SurfaceRect::new(0.0, 0.0, 500.0, 300.0), LogicalSize::default());
        assert_eq!(g.drawing_per_screen(), (1.0, 1.0));
    }

    #[test]
    fn test_rect_contains_edges_and_clamps() {
        let r = DrawingRect::new(10.0, 20.0, 100.0, 50.0);
        assert!(r.contains(DrawingPoint::new(10.0, 20.0)));
        assert!(r.contains(DrawingPoint::new(110.0, 70.0)));
        assert!(!r.contains(DrawingPoint::new(110.1, 70.0)));
        assert_eq!(r.clamp(DrawingPoint::new(-5.0, 200.0)), DrawingPoint::new(10.0, 70.0));
        assert_eq!(r.center(), DrawingPoint::new(60.0, 45.0));
    }
}
