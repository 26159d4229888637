#[cfg(not(target_arch = "wasm32"))]
pub mod info_panel;
pub mod picker;
pub mod selection;
