pub mod axis_ticks;
pub mod overlay_renderer;
