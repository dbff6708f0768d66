use wasm_bindgen::prelude::*;

pub mod blocks;
pub mod garden;
pub mod levels;

pub use garden::Garden;

#[cfg(feature = "vectors")]
tumble_web::export_scene!(Garden, "block-garden", vectors);
#[cfg(not(feature = "vectors"))]
tumble_web::export_scene!(Garden, "block-garden");
