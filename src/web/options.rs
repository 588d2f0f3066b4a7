use gloo_timers::callback::Timeout;
use wasm_bindgen::{prelude::*, JsCast};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, HtmlInputElement};

use super::chrome;
use crate::settings::{
    BlockSettings, SettingsForm, FIRST_BLOCK_DURATION, FIRST_BLOCK_WAIT_TIME,
    FOLLOWUP_BLOCK_DURATION, FOLLOWUP_BLOCK_WAIT_TIME,
};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

const SAVE_BUTTON_ID: &str = "saveBtn";
const STATUS_ELEMENT_ID: &str = "status";
const SAVED_TEXT: &str = "✓ 设置已保存";
const SUCCESS_CLASS: &str = "success";
const STATUS_CLEAR_MS: u32 = 3_000;

/// Options page: fill the inputs from storage and save on click. Input ids
/// are the storage keys.
#[wasm_bindgen]
pub fn run_options() {
    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        return;
    };

    let form_document = document.clone();
    spawn_local(async move {
        let settings = chrome::load_settings().await;
        write_form(&form_document, &SettingsForm::from(&settings));
    });

    let Some(button) = document.get_element_by_id(SAVE_BUTTON_ID) else {
        log_error!("options page has no #{SAVE_BUTTON_ID}");
        return;
    };
    let click_document = document.clone();
    let on_click = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
        spawn_local(save(click_document.clone()));
    });
    if let Err(err) = button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref()) {
        log_error!("save button not wired: {err:?}");
    }
    // The page lives as long as the listener.
    on_click.forget();
}

async fn save(document: Document) {
    let status = document.get_element_by_id(STATUS_ELEMENT_ID);
    let settings = match BlockSettings::try_from(&read_form(&document)) {
        Ok(settings) => settings,
        Err(err) => {
            show_error(status.as_ref(), &format!("{err:#}"));
            return;
        }
    };

    match chrome::save_settings(&settings).await {
        Ok(()) => {
            log_info!("settings saved: {settings:?}");
            show_saved(status);
        }
        Err(err) => {
            log_error!("failed to save settings: {err:#}");
            show_error(status.as_ref(), &format!("{err:#}"));
        }
    }
}

fn input(document: &Document, id: &str) -> Option<HtmlInputElement> {
    document.get_element_by_id(id)?.dyn_into::<HtmlInputElement>().ok()
}

fn read_form(document: &Document) -> SettingsForm {
    let value = |id| input(document, id).map(|el| el.value()).unwrap_or_default();
    SettingsForm {
        first_block_wait_time: value(FIRST_BLOCK_WAIT_TIME),
        first_block_duration: value(FIRST_BLOCK_DURATION),
        followup_block_wait_time: value(FOLLOWUP_BLOCK_WAIT_TIME),
        followup_block_duration: value(FOLLOWUP_BLOCK_DURATION),
    }
}

fn write_form(document: &Document, form: &SettingsForm) {
    let fields = [
        (FIRST_BLOCK_WAIT_TIME, &form.first_block_wait_time),
        (FIRST_BLOCK_DURATION, &form.first_block_duration),
        (FOLLOWUP_BLOCK_WAIT_TIME, &form.followup_block_wait_time),
        (FOLLOWUP_BLOCK_DURATION, &form.followup_block_duration),
    ];
    for (id, value) in fields {
        if let Some(el) = input(document, id) {
            el.set_value(value);
        }
    }
}

fn show_saved(status: Option<Element>) {
    let Some(status) = status else {
        return;
    };
    status.set_text_content(Some(SAVED_TEXT));
    let _ = status.class_list().add_1(SUCCESS_CLASS);
    Timeout::new(STATUS_CLEAR_MS, move || {
        status.set_text_content(Some(""));
        let _ = status.class_list().remove_1(SUCCESS_CLASS);
    })
    .forget();
}

fn show_error(status: Option<&Element>, message: &str) {
    if let Some(status) = status {
        let _ = status.class_list().remove_1(SUCCESS_CLASS);
        status.set_text_content(Some(&format!("✗ {message}")));
    }
}
