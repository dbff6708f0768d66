pub mod runner;

pub use runner::{FrameSurface, SceneRunner};

#[doc(hidden)]
pub use {console_error_panic_hook, console_log, js_sys, log};

/// Generate all `#[wasm_bindgen]` exports for a director.
///
/// Generates:
/// - `thread_local!` storage for the SceneRunner
/// - `with_runner()` helper, which yields `None` before `scene_init()`
/// - wasm-bindgen exports for init, frames, resize, input and debug toggles
///
/// # Usage
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
///
/// mod garden;
/// use garden::Garden;
///
/// tumble_web::export_scene!(Garden, "block-garden");
/// ```
///
/// # Arguments
///
/// - `$director_type`: a type implementing `tumble_engine::Director` and `Default`
/// - `$scene_name`: a string literal used in log messages
#[macro_export]
macro_rules! export_scene {
    ($director_type:ty, $scene_name:literal) => {
        use std::cell::RefCell;

        thread_local! {
            static RUNNER: RefCell<Option<$crate::SceneRunner<$director_type>>> = RefCell::new(None);
        }

        fn with_runner<R>(f: impl FnOnce(&mut $crate::SceneRunner<$director_type>) -> R) -> Option<R> {
            RUNNER.with(|cell| cell.borrow_mut().as_mut().map(f))
        }

        #[wasm_bindgen]
        pub fn scene_init(width: f32, height: f32) {
            $crate::console_error_panic_hook::set_once();
            let _ = $crate::console_log::init_with_level($crate::log::Level::Info);

            let seed = ($crate::js_sys::Math::random() * u64::MAX as f64) as u64;
            let mut runner = $crate::SceneRunner::new(<$director_type>::default());
            match runner.init(width, height, seed) {
                Ok(()) => $crate::log::info!("{}: initialized", $scene_name),
                Err(err) => $crate::log::error!("{}: init failed: {}", $scene_name, err),
            }

            RUNNER.with(|cell| {
                *cell.borrow_mut() = Some(runner);
            });
        }

        #[wasm_bindgen]
        pub fn scene_frame(timestamp_ms: f64) {
            with_runner(|r| r.frame(timestamp_ms));
        }

        #[wasm_bindgen]
        pub fn scene_resize(width: f32, height: f32) {
            with_runner(|r| r.resize(width, height));
        }

        #[wasm_bindgen]
        pub fn scene_key_down(key: &str) {
            with_runner(|r| r.key_down(key));
        }

        #[wasm_bindgen]
        pub fn scene_key_up(key: &str) {
            with_runner(|r| r.key_up(key));
        }

        #[wasm_bindgen]
        pub fn scene_mouse_down(button: u32) {
            with_runner(|r| r.mouse_down(button));
        }

        #[wasm_bindgen]
        pub fn scene_mouse_up(button: u32) {
            with_runner(|r| r.mouse_up(button));
        }

        #[wasm_bindgen]
        pub fn scene_mouse_move(x: f32, y: f32) {
            with_runner(|r| r.mouse_move(x, y));
        }

        #[wasm_bindgen]
        pub fn scene_wheel(delta: f64) {
            with_runner(|r| r.wheel(delta));
        }

        #[wasm_bindgen]
        pub fn scene_set_debug(enabled: bool) {
            with_runner(|r| r.set_debug(enabled));
        }

        #[wasm_bindgen]
        pub fn get_frame_count() -> u32 {
            with_runner(|r| r.frame_count()).unwrap_or(0)
        }
    };

    // Variant with vectors feature
    ($director_type:ty, $scene_name:literal, vectors) => {
        $crate::export_scene!($director_type, $scene_name);

        // ---- Vector accessors (only when vectors feature is enabled) ----

        #[wasm_bindgen]
        pub fn get_vertices_ptr() -> *const f32 {
            with_runner(|r| r.vertices_ptr()).unwrap_or(std::ptr::null())
        }

        #[wasm_bindgen]
        pub fn get_vertex_count() -> u32 {
            with_runner(|r| r.vertex_count()).unwrap_or(0)
        }

        #[wasm_bindgen]
        pub fn get_batches_ptr() -> *const u32 {
            with_runner(|r| r.batches_ptr()).unwrap_or(std::ptr::null())
        }

        #[wasm_bindgen]
        pub fn get_batch_count() -> u32 {
            with_runner(|r| r.batch_count()).unwrap_or(0)
        }
    };
}
