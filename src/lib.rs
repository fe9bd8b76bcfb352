//! Browser host for the annotation surface: DOM event translation, canvas
//! drawing and the leptos components around [`sonomark_core::AnalysisSurface`].

pub mod canvas;
pub mod components;
pub mod config;
pub mod host;
mod logging;
pub mod state;

pub use components::analysis_canvas::AnalysisCanvas;
pub use logging::init_logging;
pub use state::SurfaceState;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

/// Mount an annotation surface for `image_src` on the document body.
/// `config_yaml` must at least name the domain bounds of the image.
#[wasm_bindgen]
pub fn mount(config_yaml: &str, image_src: String) -> Result<(), JsValue> {
    init_logging(log::Level::Info);
    let config = config::load_yaml(config_yaml).map_err(|e| JsValue::from_str(&e.to_string()))?;
    log::info!("mounting surface for {image_src}");
    leptos::mount::mount_to_body(move || view! { <AnalysisCanvas config=config image_src=image_src /> });
    Ok(())
}
