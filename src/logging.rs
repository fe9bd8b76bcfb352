/// Route `log` output to the browser console and turn panics into readable
/// console errors. Safe to call more than once; does nothing off wasm.
pub fn init_logging(level: log::Level) {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        // A second init only fails because a logger is already installed.
        let _ = console_log::init_with_level(level);
    }
    #[cfg(not(target_arch = "wasm32"))]
    let _ = level;
}
