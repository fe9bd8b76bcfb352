pub mod analysis_canvas;
pub mod mode_toolbar;
pub mod pinch;
