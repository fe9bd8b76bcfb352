use leptos::prelude::*;
use sonomark_core::{ModeKind, TwoPointDelta};

use crate::state::SurfaceState;

fn mode_btn_class(active: bool) -> &'static str {
    if active { "mode-btn sel" } else { "mode-btn" }
}

fn measurement_label(d: TwoPointDelta) -> String {
    match (d.delta_time, d.delta_frequency, d.magnitude) {
        (Some(dt), Some(df), Some(rate)) => format!("Δt {dt:.3} s · Δf {df:.1} Hz · rate {rate:.2}"),
        _ => "Δt – · Δf –".to_string(),
    }
}

#[component]
pub fn ModeToolbar() -> impl IntoView {
    let state = expect_context::<SurfaceState>();

    let mode_button = move |mode: ModeKind, label: &'static str| {
        view! {
            <button
                class=move || mode_btn_class(state.mode.get() == mode)
                on:click=move |_| {
                    state.dispatch(|s, hooks| s.set_mode(mode, hooks));
                }
            >{label}</button>
        }
    };

    let can_back = move || {
        state.revision.track();
        state.with_surface(|s| s.viewport().can_back()).unwrap_or(false)
    };
    let can_forward = move || {
        state.revision.track();
        state.with_surface(|s| s.viewport().can_forward()).unwrap_or(false)
    };

    view! {
        <div class="surface-toolbar" on:click=|ev: web_sys::MouseEvent| ev.stop_propagation()>
            {mode_button(ModeKind::Markers, "Markers")}
            {mode_button(ModeKind::Harmonics, "Harmonics")}
            {mode_button(ModeKind::TwoPoint, "Measure")}
            <span class="toolbar-sep" />
            <button
                class="nav-btn"
                title="Zoom in"
                on:click=move |_| {
                    state.dispatch(|s, hooks| s.with_viewport(hooks, |vp| vp.zoom_in()));
                }
            >"+"</button>
            <button
                class="nav-btn"
                title="Zoom out"
                on:click=move |_| {
                    state.dispatch(|s, hooks| s.with_viewport(hooks, |vp| vp.zoom_out()));
                }
            >"−"</button>
            <button
                class="nav-btn"
                title="Reset zoom"
                on:click=move |_| {
                    state.dispatch(|s, hooks| s.with_viewport(hooks, |vp| vp.reset()));
                }
            >"1:1"</button>
            <button
                class="nav-btn"
                title="Back"
                disabled=move || !can_back()
                on:click=move |_| {
                    state.dispatch(|s, hooks| s.with_viewport(hooks, |vp| vp.back()));
                }
            >"←"</button>
            <button
                class="nav-btn"
                title="Forward"
                disabled=move || !can_forward()
                on:click=move |_| {
                    state.dispatch(|s, hooks| s.with_viewport(hooks, |vp| vp.forward()));
                }
            >"→"</button>
            <span class="measurement-readout">{move || measurement_label(state.measurement.get())}</span>
        </div>
    }
}
