use sonomark_core::{DomainBounds, DomainPoint, DrawingRect, Transform};
use web_sys::CanvasRenderingContext2d;

/// Nice 1-2-5 progression of tick steps, as multiples of a power of ten.
const STEP_MANTISSAS: [f64; 3] = [1.0, 2.0, 5.0];

/// Labels closer than this on the drawing surface would overlap.
const MIN_LABEL_SPACING: f64 = 60.0;

/// Smallest 1-2-5 step that keeps ticks at least `min_spacing` drawing units
/// apart when `range` spans `span` units.
pub fn tick_step(range: f64, span: f64, min_spacing: f64) -> Option<f64> {
    if !(range > 0.0 && span > 0.0 && min_spacing > 0.0) || !range.is_finite() {
        return None;
    }
    let min_step = range * min_spacing / span;
    let mut magnitude = 10f64.powf(min_step.log10().floor());
    loop {
        for m in STEP_MANTISSAS {
            let step = m * magnitude;
            if step >= min_step {
                return Some(step);
            }
        }
        magnitude *= 10.0;
    }
}

/// Tick values in `[min, max]` on multiples of `step`.
pub fn ticks(min: f64, max: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) || max < min {
        return Vec::new();
    }
    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

/// Label with as many decimals as the step needs.
pub fn format_tick(value: f64, step: f64) -> String {
    let decimals = (-step.log10().floor()).max(0.0) as usize;
    format!("{value:.decimals$}")
}

/// Frequency ticks along the bottom margin, time ticks along the left one,
/// both for the part of the domain currently visible.
pub fn draw_axes(ctx: &CanvasRenderingContext2d, transform: &Transform, visible: &DomainBounds) {
    let rect: DrawingRect = transform.visible_rect();
    ctx.set_stroke_style_str("rgba(255,255,255,0.5)");
    ctx.set_fill_style_str("#ccc");
    ctx.set_line_width(1.0);
    ctx.set_font("11px system-ui");

    // ── Frequency (X) ──
    ctx.set_text_align("center");
    ctx.set_text_baseline("top");
    if let Some(step) = tick_step(visible.freq_max - visible.freq_min, rect.width, MIN_LABEL_SPACING) {
        for f in ticks(visible.freq_min, visible.freq_max, step) {
            let x = transform.domain_to_drawing(DomainPoint::new(visible.time_min, f)).x;
            ctx.begin_path();
            ctx.move_to(x, rect.bottom());
            ctx.line_to(x, rect.bottom() + 5.0);
            ctx.stroke();
            let _ = ctx.fill_text(&format_tick(f, step), x, rect.bottom() + 7.0);
        }
    }

    // ── Time (Y) ──
    ctx.set_text_align("right");
    ctx.set_text_baseline("middle");
    if let Some(step) = tick_step(visible.time_max - visible.time_min, rect.height, MIN_LABEL_SPACING / 2.0) {
        for t in ticks(visible.time_min, visible.time_max, step) {
            let y = transform.domain_to_drawing(DomainPoint::new(t, visible.freq_min)).y;
            ctx.begin_path();
            ctx.move_to(rect.x - 5.0, y);
            ctx.line_to(rect.x, y);
            ctx.stroke();
            let _ = ctx.fill_text(&format_tick(t, step), rect.x - 7.0, y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_step_follows_1_2_5() {
        // 100 Hz over 1000 units, labels ≥60 apart: 6 Hz minimum → 10 Hz.
        assert_eq!(tick_step(100.0, 1000.0, 60.0), Some(10.0));
        // 60 s over 600 units, ≥30 apart: 3 s minimum → 5 s.
        assert_eq!(tick_step(60.0, 600.0, 30.0), Some(5.0));
        assert_eq!(tick_step(0.0, 600.0, 30.0), None);
    }

    #[test]
    fn test_ticks_cover_range_on_step_multiples() {
        assert_eq!(ticks(12.0, 48.0, 10.0), vec![20.0, 30.0, 40.0]);
        assert!(ticks(5.0, 1.0, 1.0).is_empty());
    }

    #[test]
    fn test_tick_labels() {
        assert_eq!(format_tick(20.0, 10.0), "20");
        assert_eq!(format_tick(0.25, 0.05), "0.25");
        assert_eq!(format_tick(1.5, 0.5), "1.5");
    }
}
