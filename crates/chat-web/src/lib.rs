//! crypto-chat Web Front End
//!
//! Leptos-based WASM front end for the crypto chat assistant. History lives
//! in `localStorage`; replies and price series come from the `/api` routes
//! served next to the bundle.

mod api;
mod app;
mod components;
mod pages;
mod storage;

pub use app::App;

use wasm_bindgen::prelude::*;

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(App);
}
