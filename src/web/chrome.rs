//! Extension API bindings: synced storage, runtime messaging and tabs.
//!
//! Every call goes through `catch`, so a page without the `chrome` global (or
//! a tab without our content script) surfaces as an `Err` instead of a trap.

use anyhow::{anyhow, Result};
use serde::Serialize;
use wasm_bindgen::{prelude::*, JsCast};

use crate::{
    settings::BlockSettings,
    timer::{BlockQuery, BlockQueryResponse},
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

// ─────────────────────────────────────────────────────────────────────────────
// Raw bindings
// ─────────────────────────────────────────────────────────────────────────────

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "sync"], js_name = "get")]
    async fn storage_sync_get(defaults: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "sync"], js_name = "set")]
    async fn storage_sync_set(items: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "runtime", "onMessage"], js_name = "addListener")]
    fn runtime_on_message(
        listener: &Closure<dyn FnMut(JsValue, JsValue, js_sys::Function)>,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = "query")]
    async fn tabs_query(query_info: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = "sendMessage")]
    async fn tabs_send_message(tab_id: i32, message: JsValue) -> Result<JsValue, JsValue>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) fn js_error(err: JsValue) -> anyhow::Error {
    anyhow!(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

/// Serialize to a plain JS object (no `Map`s), which is what the extension
/// APIs expect.
pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|err| anyhow!("failed to convert to JS value: {err}"))
}

pub(crate) fn from_js(value: JsValue) -> Result<serde_json::Value> {
    serde_wasm_bindgen::from_value(value).map_err(|err| anyhow!("failed to read JS value: {err}"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Stored settings merged over the defaults. Never fails: any storage error
/// is logged and the defaults are used.
pub async fn load_settings() -> BlockSettings {
    match fetch_settings().await {
        Ok(settings) => {
            log_debug!("settings loaded: {settings:?}");
            settings
        }
        Err(err) => {
            log_warn!("could not read settings, using defaults: {err:#}");
            BlockSettings::default()
        }
    }
}

async fn fetch_settings() -> Result<BlockSettings> {
    let defaults = to_js(&BlockSettings::default().to_stored())?;
    let items = storage_sync_get(defaults).await.map_err(js_error)?;
    Ok(BlockSettings::from_stored(&from_js(items)?))
}

pub async fn save_settings(settings: &BlockSettings) -> Result<()> {
    let items = to_js(&settings.to_stored())?;
    storage_sync_set(items).await.map_err(js_error)?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Messaging
// ─────────────────────────────────────────────────────────────────────────────

pub fn add_message_listener(
    listener: &Closure<dyn FnMut(JsValue, JsValue, js_sys::Function)>,
) -> Result<()> {
    runtime_on_message(listener).map_err(js_error)
}

/// Ask the active tab's content script. `None` when the tab has no script to
/// answer (wrong host, restricted page) or the reply is malformed.
pub async fn query_active_tab(query: BlockQuery) -> Option<BlockQueryResponse> {
    match try_query_active_tab(query).await {
        Ok(reply) => reply,
        Err(err) => {
            log_debug!("{query:?} unanswered: {err:#}");
            None
        }
    }
}

async fn try_query_active_tab(query: BlockQuery) -> Result<Option<BlockQueryResponse>> {
    let query_info = to_js(&serde_json::json!({ "active": true, "currentWindow": true }))?;
    let tabs = tabs_query(query_info).await.map_err(js_error)?;
    let tabs: js_sys::Array = tabs.dyn_into().map_err(|_| anyhow!("tabs.query did not return an array"))?;

    let tab = tabs.get(0);
    if tab.is_undefined() {
        return Ok(None);
    }
    let tab_id = js_sys::Reflect::get(&tab, &JsValue::from_str("id"))
        .map_err(js_error)?
        .as_f64()
        .ok_or_else(|| anyhow!("active tab has no id"))? as i32;

    let reply = tabs_send_message(tab_id, to_js(&query)?).await.map_err(js_error)?;
    if reply.is_undefined() || reply.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(from_js(reply)?).ok())
}
