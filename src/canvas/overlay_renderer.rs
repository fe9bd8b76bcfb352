use std::f64::consts::TAU;

use sonomark_core::{AnalysisSurface, AnnotationId, DrawingPoint, DrawingRect, Endpoint, OverlayItem, Selection, TargetKind};
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::canvas::axis_ticks;

const MARKER_RADIUS: f64 = 5.0;
const ENDPOINT_HALF: f64 = 4.0;

pub fn rgb_css(c: [u8; 3]) -> String {
    format!("rgb({},{},{})", c[0], c[1], c[2])
}

/// Full redraw: background, the zoomed image clipped to its native
/// rectangle, axes in the margins, then annotation overlays.
pub fn draw_surface(ctx: &CanvasRenderingContext2d, surface: &AnalysisSurface, image: Option<&HtmlImageElement>) {
    let logical = surface.domain().logical_size();
    let transform = surface.transform();
    let visible = transform.visible_rect();

    ctx.set_fill_style_str("#111");
    ctx.fill_rect(0.0, 0.0, logical.width, logical.height);

    ctx.save();
    clip_to(ctx, &visible);
    if let Some(img) = image {
        let drawn = transform.drawn_image_rect();
        let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(img, drawn.x, drawn.y, drawn.width, drawn.height);
    }
    draw_overlay(ctx, &surface.overlay(), surface.selection());
    ctx.restore();

    axis_ticks::draw_axes(ctx, &transform, &surface.viewport().visible_domain());
}

fn clip_to(ctx: &CanvasRenderingContext2d, rect: &DrawingRect) {
    ctx.begin_path();
    ctx.rect(rect.x, rect.y, rect.width, rect.height);
    ctx.clip();
}

fn is_selected(selection: Option<Selection>, id: AnnotationId, matches_kind: impl Fn(TargetKind) -> bool) -> bool {
    selection.is_some_and(|s| s.id == id && matches_kind(s.kind))
}

pub fn draw_overlay(ctx: &CanvasRenderingContext2d, items: &[OverlayItem], selection: Option<Selection>) {
    for item in items {
        match *item {
            OverlayItem::Marker { id, color, at } => {
                let selected = is_selected(selection, id, |k| k == TargetKind::Marker);
                draw_marker(ctx, at, &rgb_css(color), selected);
            }
            OverlayItem::HarmonicLine { id, color, number, x, y_top, y_bottom, .. } => {
                let selected = is_selected(selection, id, |k| matches!(k, TargetKind::HarmonicSet { .. }));
                ctx.set_stroke_style_str(&rgb_css(color));
                ctx.set_line_width(if selected { 2.0 } else { 1.0 });
                ctx.begin_path();
                ctx.move_to(x, y_top);
                ctx.line_to(x, y_bottom);
                ctx.stroke();
                ctx.set_fill_style_str(&rgb_css(color));
                ctx.set_font("10px system-ui");
                ctx.set_text_align("left");
                ctx.set_text_baseline("top");
                let _ = ctx.fill_text(&number.to_string(), x + 3.0, y_top + 2.0);
            }
            OverlayItem::MeasurementLine { from, to } => {
                ctx.set_stroke_style_str("rgba(255,255,255,0.7)");
                ctx.set_line_width(1.0);
                ctx.begin_path();
                ctx.move_to(from.x, from.y);
                ctx.line_to(to.x, to.y);
                ctx.stroke();
            }
            OverlayItem::MeasurementPoint { endpoint, at } => {
                let fill = match endpoint {
                    Endpoint::Start => "#4fc3f7",
                    Endpoint::End => "#ff8a65",
                };
                ctx.set_fill_style_str(fill);
                ctx.fill_rect(at.x - ENDPOINT_HALF, at.y - ENDPOINT_HALF, ENDPOINT_HALF * 2.0, ENDPOINT_HALF * 2.0);
                let selected = selection.is_some_and(|s| s.kind == TargetKind::TwoPointMarker(endpoint));
                if selected {
                    ctx.set_stroke_style_str("#fff");
                    ctx.set_line_width(1.5);
                    ctx.stroke_rect(
                        at.x - ENDPOINT_HALF - 2.0,
                        at.y - ENDPOINT_HALF - 2.0,
                        ENDPOINT_HALF * 2.0 + 4.0,
                        ENDPOINT_HALF * 2.0 + 4.0,
                    );
                }
            }
        }
    }
}

fn draw_marker(ctx: &CanvasRenderingContext2d, at: DrawingPoint, color: &str, selected: bool) {
    ctx.set_fill_style_str(color);
    ctx.begin_path();
    let _ = ctx.arc(at.x, at.y, MARKER_RADIUS, 0.0, TAU);
    ctx.fill();
    ctx.set_stroke_style_str(if selected { "#fff" } else { "#000" });
    ctx.set_line_width(if selected { 2.0 } else { 1.0 });
    ctx.stroke();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_css() {
        assert_eq!(rgb_css([255, 200, 50]), "rgb(255,200,50)");
    }
}
