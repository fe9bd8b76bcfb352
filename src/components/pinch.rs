//! Two-finger pinch zoom and pan on the analysis canvas.

use sonomark_core::ScreenPoint;

/// Finger spreads below this many pixels are too noisy to zoom by.
const MIN_PINCH_DIST: f64 = 10.0;

/// Geometry of the previous touch-move, so each step is incremental.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchState {
    pub last_dist: f64,
    pub last_mid: ScreenPoint,
}

/// One incremental pinch step: zoom by `factor` about `anchor`, then pan by
/// the midpoint movement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchStep {
    pub factor: f64,
    pub anchor: ScreenPoint,
    pub pan_dx: f64,
    pub pan_dy: f64,
}

/// Returns (midpoint, distance) in client coordinates for exactly 2 touches.
pub fn two_finger_geometry(touches: &web_sys::TouchList) -> Option<(ScreenPoint, f64)> {
    if touches.length() != 2 {
        return None;
    }
    let t0 = touches.get(0)?;
    let t1 = touches.get(1)?;
    let (x0, y0) = (t0.client_x() as f64, t0.client_y() as f64);
    let (x1, y1) = (t1.client_x() as f64, t1.client_y() as f64);
    let mid = ScreenPoint::new((x0 + x1) / 2.0, (y0 + y1) / 2.0);
    let dist = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
    Some((mid, dist))
}

impl PinchState {
    pub fn begin(mid: ScreenPoint, dist: f64) -> Self {
        Self { last_dist: dist, last_mid: mid }
    }

    /// Advance to the current finger geometry. `None` while the spread is too
    /// small to measure; the state still follows the fingers.
    pub fn step(&mut self, mid: ScreenPoint, dist: f64) -> Option<PinchStep> {
        let prev = *self;
        *self = Self::begin(mid, dist);
        if prev.last_dist < MIN_PINCH_DIST || dist < MIN_PINCH_DIST {
            return None;
        }
        Some(PinchStep {
            factor: dist / prev.last_dist,
            anchor: mid,
            pan_dx: mid.x - prev.last_mid.x,
            pan_dy: mid.y - prev.last_mid.y,
        })
    }
}
