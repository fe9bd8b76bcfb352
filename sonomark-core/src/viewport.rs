//! Zoom/pan state layered over a [`DomainConfig`].
//!
//! The viewport is the image's native rectangle on the drawing surface. When
//! zoomed, the image is drawn `scale` times larger starting at
//! `image_rect.origin + pan` and clipped to that rectangle. Pan is always
//! non-positive and clamped so the scaled image covers the whole viewport.

use crate::config::ZoomLimits;
use crate::domain::{DomainBounds, DomainConfig};
use crate::geometry::{DrawingPoint, ImagePoint, SurfaceGeometry};
use crate::transform;

/// Scales within this distance of 1.0 snap to exactly unzoomed.
const UNZOOMED_EPSILON: f64 = 1e-9;

/// Decided once per mutation so call sites never compare floats against 1.0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ZoomMode {
    Unzoomed,
    Zoomed { scale_x: f64, scale_y: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanLimits {
    pub min_pan_x: f64,
    pub max_pan_x: f64,
    pub min_pan_y: f64,
    pub max_pan_y: f64,
}

impl PanLimits {
    pub fn clamp(&self, pan_x: f64, pan_y: f64) -> (f64, f64) {
        (
            pan_x.max(self.min_pan_x).min(self.max_pan_x),
            pan_y.max(self.min_pan_y).min(self.max_pan_y),
        )
    }
}

/// Pan range that keeps an image scaled by `(scale_x, scale_y)` covering the
/// viewport: `max = 0`, `min = min(0, viewport − scaled)`.
pub fn calculate_pan_limits(domain: &DomainConfig, scale_x: f64, scale_y: f64) -> PanLimits {
    let view_w = domain.image_width();
    let view_h = domain.image_height();
    PanLimits {
        min_pan_x: (view_w - view_w * scale_x).min(0.0),
        max_pan_x: 0.0,
        min_pan_y: (view_h - view_h * scale_y).min(0.0),
        max_pan_y: 0.0,
    }
}

/// Center form of a viewport: zoom level per axis plus the image-pixel
/// position shown at the middle of the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomCenter {
    pub level_x: f64,
    pub level_y: f64,
    pub center_x: f64,
    pub center_y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
    scale_x: f64,
    scale_y: f64,
    pan_x: f64,
    pan_y: f64,
    mode: ZoomMode,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewportState {
    pub const IDENTITY: Self = Self {
        scale_x: 1.0,
        scale_y: 1.0,
        pan_x: 0.0,
        pan_y: 0.0,
        mode: ZoomMode::Unzoomed,
    };

    /// Build a state for `domain`. Scales are floored at 1.0 and pan is
    /// clamped into [`calculate_pan_limits`], so every constructed state
    /// satisfies the coverage invariant.
    pub fn new(scale_x: f64, scale_y: f64, pan_x: f64, pan_y: f64, domain: &DomainConfig) -> Self {
        let sx = sanitize_scale(scale_x);
        let sy = sanitize_scale(scale_y);
        let limits = calculate_pan_limits(domain, sx, sy);
        let (px, py) = limits.clamp(finite_or_zero(pan_x), finite_or_zero(pan_y));

        if (sx - 1.0).abs() <= UNZOOMED_EPSILON && (sy - 1.0).abs() <= UNZOOMED_EPSILON {
            return Self::IDENTITY;
        }
        Self {
            scale_x: sx,
            scale_y: sy,
            pan_x: px,
            pan_y: py,
            mode: ZoomMode::Zoomed { scale_x: sx, scale_y: sy },
        }
    }

    pub fn from_center(center: ZoomCenter, domain: &DomainConfig) -> Self {
        let sx = sanitize_scale(center.level_x);
        let sy = sanitize_scale(center.level_y);
        let pan_x = domain.image_width() / 2.0 - center.center_x * sx;
        let pan_y = domain.image_height() / 2.0 - center.center_y * sy;
        Self::new(sx, sy, pan_x, pan_y, domain)
    }

    pub fn to_center(&self, domain: &DomainConfig) -> ZoomCenter {
        ZoomCenter {
            level_x: self.scale_x,
            level_y: self.scale_y,
            center_x: (domain.image_width() / 2.0 - self.pan_x) / self.scale_x,
            center_y: (domain.image_height() / 2.0 - self.pan_y) / self.scale_y,
        }
    }

    pub fn scale_x(&self) -> f64 {
        self.scale_x
    }

    pub fn scale_y(&self) -> f64 {
        self.scale_y
    }

    pub fn pan_x(&self) -> f64 {
        self.pan_x
    }

    pub fn pan_y(&self) -> f64 {
        self.pan_y
    }

    pub fn mode(&self) -> ZoomMode {
        self.mode
    }

    pub fn is_zoomed(&self) -> bool {
        matches!(self.mode, ZoomMode::Zoomed { .. })
    }

    fn approx_eq(&self, other: &Self) -> bool {
        (self.scale_x - other.scale_x).abs() < 1e-6
            && (self.scale_y - other.scale_y).abs() < 1e-6
            && (self.pan_x - other.pan_x).abs() < 0.5
            && (self.pan_y - other.pan_y).abs() < 0.5
    }
}

fn sanitize_scale(scale: f64) -> f64 {
    if scale.is_finite() {
        scale.max(1.0)
    } else {
        1.0
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

// ── Navigation history ──────────────────────────────────────────────────────

/// Back/forward list of discrete zoom steps. `index` points at the entry that
/// matches the current view.
#[derive(Clone, Debug)]
pub struct ViewHistory {
    entries: Vec<ViewportState>,
    index: usize,
    limit: usize,
}

impl ViewHistory {
    pub fn new(limit: usize) -> Self {
        Self { entries: Vec::new(), index: 0, limit: limit.max(1) }
    }

    pub fn push(&mut self, entry: ViewportState) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.index + 1);
        }
        if self.entries.last().is_some_and(|last| last.approx_eq(&entry)) {
            // Don't push nearly identical entries
            self.index = self.entries.len() - 1;
            return;
        }
        self.entries.push(entry);
        if self.entries.len() > self.limit {
            self.entries.remove(0);
        }
        self.index = self.entries.len() - 1;
    }

    pub fn back(&mut self) -> Option<ViewportState> {
        if self.index == 0 || self.entries.is_empty() {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index).copied()
    }

    pub fn forward(&mut self) -> Option<ViewportState> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index).copied()
    }

    pub fn can_back(&self) -> bool {
        self.index > 0
    }

    /// Entry the view was last navigated to.
    pub fn current(&self) -> Option<&ViewportState> {
        self.entries.get(self.index)
    }

    pub fn can_forward(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = 0;
    }
}

// ── Controller ──────────────────────────────────────────────────────────────

/// Sole owner and mutator of a [`ViewportState`].
#[derive(Clone, Debug)]
pub struct ViewportController {
    domain: DomainConfig,
    limits: ZoomLimits,
    state: ViewportState,
    history: ViewHistory,
}

impl ViewportController {
    pub fn new(domain: DomainConfig, limits: ZoomLimits) -> Self {
        let mut history = ViewHistory::new(100);
        history.push(ViewportState::IDENTITY);
        Self { domain, limits, state: ViewportState::IDENTITY, history }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history = ViewHistory::new(limit);
        self.history.push(self.state);
        self
    }

    pub fn domain(&self) -> &DomainConfig {
        &self.domain
    }

    pub fn limits(&self) -> &ZoomLimits {
        &self.limits
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn history(&self) -> &ViewHistory {
        &self.history
    }

    pub fn calculate_pan_limits(&self) -> PanLimits {
        calculate_pan_limits(&self.domain, self.state.scale_x, self.state.scale_y)
    }

    fn apply(&mut self, scale_x: f64, scale_y: f64, pan_x: f64, pan_y: f64) -> bool {
        let next = ViewportState::new(scale_x, scale_y, pan_x, pan_y, &self.domain);
        let changed = next != self.state;
        self.state = next;
        changed
    }

    /// Zoom about the viewport center. Returns whether the view changed.
    pub fn zoom_by_factor(&mut self, factor: f64) -> bool {
        self.record_departure();
        let center = self.domain.image_rect().center();
        let changed = self.zoom_at(factor, center);
        if changed {
            self.push_history();
        }
        changed
    }

    /// Zoom about `anchor` (drawing-surface point, clamped into the
    /// viewport): the image content under the anchor stays under it unless
    /// pan clamping has to move it. The resulting scale is clamped into the
    /// configured limits.
    pub fn zoom_at(&mut self, factor: f64, anchor: DrawingPoint) -> bool {
        if !(factor.is_finite() && factor > 0.0) {
            log::debug!("ignoring zoom factor {factor}");
            return false;
        }
        let rect = self.domain.image_rect();
        let a = rect.clamp(anchor);
        let ax = a.x - rect.x;
        let ay = a.y - rect.y;
        let ix = (ax - self.state.pan_x) / self.state.scale_x;
        let iy = (ay - self.state.pan_y) / self.state.scale_y;

        let sx = self.limits.clamp(self.state.scale_x * factor);
        let sy = self.limits.clamp(self.state.scale_y * factor);
        self.apply(sx, sy, ax - ix * sx, ay - iy * sy)
    }

    pub fn zoom_in(&mut self) -> bool {
        self.zoom_by_factor(self.limits.wheel_step)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom_by_factor(1.0 / self.limits.wheel_step)
    }

    /// Make the drawing-surface rectangle `(x, y, w, h)`, as currently
    /// displayed, fill the viewport. Degenerate rectangles are ignored.
    pub fn zoom_to_rect(&mut self, x: f64, y: f64, w: f64, h: f64) -> bool {
        if !(x.is_finite() && y.is_finite() && w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
            log::debug!("ignoring degenerate zoom rect {w}x{h}");
            return false;
        }
        self.record_departure();
        let rect = self.domain.image_rect();
        let s = self.state;
        let ix0 = (x - rect.x - s.pan_x) / s.scale_x;
        let iy0 = (y - rect.y - s.pan_y) / s.scale_y;
        let iw = w / s.scale_x;
        let ih = h / s.scale_y;

        let sx = self.limits.clamp(rect.width / iw);
        let sy = self.limits.clamp(rect.height / ih);
        let cx = ix0 + iw / 2.0;
        let cy = iy0 + ih / 2.0;
        let changed = self.apply(sx, sy, rect.width / 2.0 - cx * sx, rect.height / 2.0 - cy * sy);
        if changed {
            self.push_history();
        }
        changed
    }

    /// Pan by a pointer movement measured in screen pixels.
    pub fn pan(&mut self, delta_screen_x: f64, delta_screen_y: f64, geometry: &SurfaceGeometry) -> bool {
        let (dx, dy) = geometry.screen_delta_to_drawing(delta_screen_x, delta_screen_y);
        self.pan_drawing(dx, dy)
    }

    /// Pan by a delta already in drawing-surface units.
    pub fn pan_drawing(&mut self, dx: f64, dy: f64) -> bool {
        if !(dx.is_finite() && dy.is_finite()) {
            return false;
        }
        let s = self.state;
        self.apply(s.scale_x, s.scale_y, s.pan_x + dx, s.pan_y + dy)
    }

    pub fn set_center(&mut self, center: ZoomCenter) -> bool {
        self.record_departure();
        let clamped = ZoomCenter {
            level_x: self.limits.clamp(center.level_x),
            level_y: self.limits.clamp(center.level_y),
            ..center
        };
        let next = ViewportState::from_center(clamped, &self.domain);
        let changed = next != self.state;
        self.state = next;
        if changed {
            self.push_history();
        }
        changed
    }

    pub fn reset(&mut self) -> bool {
        self.record_departure();
        let changed = self.state != ViewportState::IDENTITY;
        self.state = ViewportState::IDENTITY;
        if changed {
            self.push_history();
        }
        changed
    }

    /// Swap in a new image: the viewport and its history start over.
    pub fn load_image(&mut self, domain: DomainConfig) {
        log::info!(
            "viewport reset for {}x{} image",
            domain.image_width(),
            domain.image_height()
        );
        self.domain = domain;
        self.state = ViewportState::IDENTITY;
        self.history.clear();
        self.history.push(self.state);
    }

    pub fn push_history(&mut self) {
        self.history.push(self.state);
    }

    /// Wheel, pinch and pan move the view without touching the history. A
    /// discrete navigation first records such a view so it can be returned to.
    fn record_departure(&mut self) {
        if self.history.current().is_some_and(|entry| !entry.approx_eq(&self.state)) {
            self.history.push(self.state);
        }
    }

    /// The view can step back either through history or from an unrecorded
    /// wheel/pan position to the last entry.
    pub fn can_back(&self) -> bool {
        self.history.can_back() || self.history.current().is_some_and(|entry| !entry.approx_eq(&self.state))
    }

    pub fn can_forward(&self) -> bool {
        self.history.can_forward()
    }

    pub fn back(&mut self) -> bool {
        self.record_departure();
        match self.history.back() {
            Some(state) => {
                self.state = state;
                true
            }
            None => false,
        }
    }

    pub fn forward(&mut self) -> bool {
        match self.history.forward() {
            Some(state) => {
                self.state = state;
                true
            }
            None => false,
        }
    }

    /// Domain bounds currently visible in the viewport.
    pub fn visible_domain(&self) -> DomainBounds {
        let s = self.state;
        let w = self.domain.image_width();
        let h = self.domain.image_height();
        let top_left = ImagePoint::new(-s.pan_x / s.scale_x, -s.pan_y / s.scale_y);
        let bottom_right = ImagePoint::new((w - s.pan_x) / s.scale_x, (h - s.pan_y) / s.scale_y);
        let a = transform::image_to_domain(top_left, &self.domain);
        let b = transform::image_to_domain(bottom_right, &self.domain);
        DomainBounds::new(b.time, a.time, a.freq, b.freq)
    }
}
