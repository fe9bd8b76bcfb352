use leptos::prelude::*;
use sonomark_core::transform::screen_to_drawing;
use sonomark_core::{KeyInput, PointerKind, SurfaceConfig};
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent, PointerEvent, TouchEvent,
    WheelEvent,
};

use crate::canvas::overlay_renderer;
use crate::components::mode_toolbar::ModeToolbar;
use crate::components::pinch::{two_finger_geometry, PinchState};
use crate::host;
use crate::state::SurfaceState;

fn get_canvas_ctx(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .ok()?
        .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
}

/// Image with an annotation overlay. The canvas' internal resolution is the
/// logical drawing surface (image plus margins); CSS scales it to fit.
#[component]
pub fn AnalysisCanvas(config: SurfaceConfig, #[prop(into)] image_src: String) -> impl IntoView {
    let state = SurfaceState::new(config);
    provide_context(state);
    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
    let image_ref = NodeRef::<leptos::html::Img>::new();
    let pinch: RwSignal<Option<PinchState>> = RwSignal::new(None);

    let on_image_load = move |_: web_sys::Event| {
        let Some(img) = image_ref.get_untracked() else { return };
        state.load_image(img.natural_width() as f64, img.natural_height() as f64);
    };

    // Redraw whenever the surface asks for it
    Effect::new(move || {
        state.revision.track();
        let Some(canvas) = canvas_ref.get() else { return };
        let image = image_ref.get_untracked();

        state.with_surface(|surface| {
            let logical = surface.domain().logical_size();
            let (w, h) = (logical.width.round() as u32, logical.height.round() as u32);
            if canvas.width() != w { canvas.set_width(w); }
            if canvas.height() != h { canvas.set_height(h); }
            let Some(ctx) = get_canvas_ctx(&canvas) else { return };
            overlay_renderer::draw_surface(&ctx, surface, image.as_ref());
        });
    });

    // ── Pointer, wheel and keyboard ──────────────────────────────────────────

    let on_pointer = move |ev: PointerEvent| {
        let Some(input) = host::pointer_input(&ev) else { return };
        let Some(element) = host::event_element(&ev) else { return };
        if input.kind == PointerKind::Down {
            ev.prevent_default();
        }
        state.dispatch(|surface, hooks| {
            let geometry = host::surface_geometry(&element, surface.domain().logical_size());
            surface.handle_pointer(input, &geometry, hooks);
        });
    };

    let on_wheel = move |ev: WheelEvent| {
        ev.prevent_default();
        let Some(element) = host::event_element(&ev) else { return };
        let input = host::wheel_input(&ev);
        state.dispatch(|surface, hooks| {
            let geometry = host::surface_geometry(&element, surface.domain().logical_size());
            surface.handle_wheel(input, &geometry, hooks)
        });
    };

    let on_keydown = move |ev: KeyboardEvent| {
        let Some(input): Option<KeyInput> = host::key_input(&ev) else { return };
        if state.dispatch(|surface, hooks| surface.handle_key(input, hooks)) == Some(true) {
            ev.prevent_default();
        }
    };

    // ── Touch: two-finger pinch ──────────────────────────────────────────────

    let on_touchstart = move |ev: TouchEvent| {
        if let Some((mid, dist)) = two_finger_geometry(&ev.touches()) {
            ev.prevent_default();
            state.dispatch(|surface, hooks| surface.cancel_drag(hooks));
            pinch.set(Some(PinchState::begin(mid, dist)));
        }
    };

    let on_touchmove = move |ev: TouchEvent| {
        let Some(mut current) = pinch.get_untracked() else { return };
        let Some((mid, dist)) = two_finger_geometry(&ev.touches()) else { return };
        ev.prevent_default();
        let step = current.step(mid, dist);
        pinch.set(Some(current));
        let Some(step) = step else { return };
        let Some(element) = host::event_element(&ev) else { return };
        state.dispatch(|surface, hooks| {
            let geometry = host::surface_geometry(&element, surface.domain().logical_size());
            let anchor = screen_to_drawing(step.anchor, geometry.rect, geometry.logical);
            surface.with_viewport(hooks, |vp| {
                let zoomed = vp.zoom_at(step.factor, anchor);
                let panned = vp.pan(step.pan_dx, step.pan_dy, &geometry);
                zoomed || panned
            })
        });
    };

    let on_touchend = move |ev: TouchEvent| {
        if ev.touches().length() < 2 {
            pinch.set(None);
        }
    };

    view! {
        <div class="analysis-surface" tabindex="0" on:keydown=on_keydown>
            <img
                node_ref=image_ref
                src=image_src
                on:load=on_image_load
                style="display: none;"
            />
            <canvas
                node_ref=canvas_ref
                on:pointerdown=on_pointer
                on:pointermove=on_pointer
                on:pointerup=on_pointer
                on:pointerleave=on_pointer
                on:pointercancel=on_pointer
                on:wheel=on_wheel
                on:touchstart=on_touchstart
                on:touchmove=on_touchmove
                on:touchend=on_touchend
                on:contextmenu=|ev: MouseEvent| ev.prevent_default()
                style=move || format!("width: 100%; touch-action: none; cursor: {};", state.cursor.get().css())
            />
            {move || state.error.get().map(|e| view! { <div class="surface-error">{e}</div> })}
            <ModeToolbar />
        </div>
    }
}
