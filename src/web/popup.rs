use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Document;

use super::chrome;
use crate::{
    popup::{addiction_time_text, block_count_text, ADDICTION_TIME_ELEMENT_ID, BLOCK_COUNT_ELEMENT_ID},
    timer::BlockQuery,
};

/// Fill the popup with the active tab's counters.
#[wasm_bindgen]
pub fn run_popup() {
    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        return;
    };

    spawn_local(async move {
        let time = chrome::query_active_tab(BlockQuery::GetAddictionTime).await;
        set_text(&document, ADDICTION_TIME_ELEMENT_ID, &addiction_time_text(time.as_ref()));

        let count = chrome::query_active_tab(BlockQuery::GetBlockCount).await;
        set_text(&document, BLOCK_COUNT_ELEMENT_ID, &block_count_text(count.as_ref()));
    });
}

fn set_text(document: &Document, id: &str, text: &str) {
    if let Some(element) = document.get_element_by_id(id) {
        element.set_text_content(Some(text));
    }
}
