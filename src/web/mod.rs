//! Browser glue: the content script, the popup and the options page. Each
//! page's JS loader imports this module and calls its `run_*` export.

mod chrome;
mod content;
mod dom;
mod options;
mod popup;

use wasm_bindgen::prelude::*;

pub use content::run_content_script;
pub use options::run_options;
pub use popup::run_popup;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
}
