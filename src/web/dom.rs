//! DOM rendering of the block overlay, the elapsed-time badge and the
//! body-ready wait.

use std::{cell::RefCell, rc::Rc};

use wasm_bindgen::{prelude::*, JsCast};
use web_sys::{
    Document, Element, Event, HtmlElement, MutationObserver, MutationObserverInit, Performance,
    Window,
};

use crate::{
    badge::{BADGE_ELEMENT_ID, BADGE_STYLES},
    clock::Clock,
    overlay::{
        view::{COUNTDOWN_ELEMENT_ID, OVERLAY_ELEMENT_ID},
        Band, ElementProbe, OverlaySurface, OverlayView, Rect, Viewport,
    },
    ready::Deferred,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

const SHADE: &str = "rgba(0, 0, 0, 0.95)";
const TOP_LAYER: &str = "2147483647";

// ─────────────────────────────────────────────────────────────────────────────
// Clock
// ─────────────────────────────────────────────────────────────────────────────

/// Milliseconds since the content script started, from `performance.now()`.
/// Falls back to `Date.now()` only where no `Performance` object exists; wrap
/// it in [`Monotonic`](crate::clock::Monotonic) to keep readings ordered.
pub struct WebClock {
    performance: Option<Performance>,
    origin_ms: f64,
}

impl WebClock {
    pub fn new(window: &Window) -> Self {
        let performance = window.performance();
        let origin_ms = read_ms(performance.as_ref());
        Self {
            performance,
            origin_ms,
        }
    }
}

fn read_ms(performance: Option<&Performance>) -> f64 {
    match performance {
        Some(performance) => performance.now(),
        None => js_sys::Date::now(),
    }
}

impl Clock for WebClock {
    fn now_ms(&self) -> u64 {
        (read_ms(self.performance.as_ref()) - self.origin_ms).max(0.0) as u64
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Small helpers
// ─────────────────────────────────────────────────────────────────────────────

fn create_div(document: &Document) -> Option<HtmlElement> {
    document
        .create_element("div")
        .ok()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

fn set_styles(element: &HtmlElement, styles: &[(&str, &str)]) {
    let style = element.style();
    for (name, value) in styles {
        if let Err(err) = style.set_property(name, value) {
            log_warn!("style {name} rejected: {err:?}");
        }
    }
}

fn px(value: f64) -> String {
    format!("{value}px")
}

fn mount_point(document: &Document) -> Option<Element> {
    document
        .body()
        .map(Element::from)
        .or_else(|| document.document_element())
}

// ─────────────────────────────────────────────────────────────────────────────
// Relayout listeners
// ─────────────────────────────────────────────────────────────────────────────

/// Window `resize` and capture-phase `scroll` listeners. Removed on drop.
struct RelayoutListeners {
    window: Window,
    callback: Closure<dyn FnMut(Event)>,
}

impl RelayoutListeners {
    fn attach(window: &Window, hook: Rc<dyn Fn()>) -> Self {
        let callback = Closure::<dyn FnMut(Event)>::new(move |_event: Event| hook());
        let listeners = Self {
            window: window.clone(),
            callback,
        };
        let function = listeners.callback.as_ref().unchecked_ref();
        if let Err(err) = window.add_event_listener_with_callback("resize", function) {
            log_warn!("resize listener not attached: {err:?}");
        }
        if let Err(err) = window.add_event_listener_with_callback_and_bool("scroll", function, true) {
            log_warn!("scroll listener not attached: {err:?}");
        }
        listeners
    }
}

impl Drop for RelayoutListeners {
    fn drop(&mut self) {
        let function = self.callback.as_ref().unchecked_ref();
        let _ = self
            .window
            .remove_event_listener_with_callback("resize", function);
        let _ = self
            .window
            .remove_event_listener_with_callback_and_bool("scroll", function, true);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Overlay surface
// ─────────────────────────────────────────────────────────────────────────────

pub struct DomSurface {
    window: Window,
    document: Document,
    root: Option<HtmlElement>,
    band_layer: Option<HtmlElement>,
    countdown: Option<HtmlElement>,
    /// Inline `overflow` of `<html>` before a full block froze it.
    saved_overflow: Option<String>,
    relayout_hook: Option<Rc<dyn Fn()>>,
    listeners: Option<RelayoutListeners>,
}

impl DomSurface {
    pub fn new(window: Window, document: Document) -> Self {
        Self {
            window,
            document,
            root: None,
            band_layer: None,
            countdown: None,
            saved_overflow: None,
            relayout_hook: None,
            listeners: None,
        }
    }

    /// Callback the relayout listeners invoke. Without one, attaching the
    /// listeners is a no-op.
    pub fn with_relayout_hook(mut self, hook: Rc<dyn Fn()>) -> Self {
        self.relayout_hook = Some(hook);
        self
    }

    fn root_element(&self) -> Option<HtmlElement> {
        self.document.document_element()?.dyn_into::<HtmlElement>().ok()
    }

    fn freeze_scroll(&mut self) {
        let Some(html) = self.root_element() else {
            return;
        };
        let style = html.style();
        let previous = style.get_property_value("overflow").unwrap_or_default();
        if style.set_property("overflow", "hidden").is_ok() {
            self.saved_overflow = Some(previous);
        }
    }

    fn restore_scroll(&mut self) {
        let Some(previous) = self.saved_overflow.take() else {
            return;
        };
        if let Some(html) = self.root_element() {
            let _ = html.style().set_property("overflow", &previous);
        }
    }

    fn render_bands(&self, layer: &HtmlElement, bands: &[Band]) {
        layer.set_inner_html("");
        for band in bands {
            let Some(div) = create_div(&self.document) else {
                continue;
            };
            set_styles(
                &div,
                &[
                    ("position", "fixed"),
                    ("left", &px(band.rect.left)),
                    ("top", &px(band.rect.top)),
                    ("width", &px(band.rect.width)),
                    ("height", &px(band.rect.height)),
                    ("background", SHADE),
                    ("pointer-events", "auto"),
                ],
            );
            let _ = layer.append_child(&div);
        }
    }

    fn build_message(&self, view: &OverlayView) -> Option<(HtmlElement, HtmlElement)> {
        let box_ = create_div(&self.document)?;
        let pointer = if view.message_intercepts_pointer { "auto" } else { "none" };
        set_styles(
            &box_,
            &[
                ("position", "fixed"),
                ("left", "50%"),
                ("top", "50%"),
                ("transform", "translate(-50%, -50%)"),
                ("color", "#fff"),
                ("text-align", "center"),
                ("font-family", "system-ui, sans-serif"),
                ("pointer-events", pointer),
            ],
        );

        let title = create_div(&self.document)?;
        title.set_text_content(Some(view.message.title()));
        set_styles(&title, &[("font-size", "28px"), ("font-weight", "bold"), ("margin-bottom", "16px")]);

        let (before, after) = view.message.tip_parts();
        let tip = create_div(&self.document)?;
        set_styles(&tip, &[("font-size", "18px")]);
        let countdown = self
            .document
            .create_element("span")
            .ok()?
            .dyn_into::<HtmlElement>()
            .ok()?;
        countdown.set_id(COUNTDOWN_ELEMENT_ID);
        countdown.set_text_content(Some(&view.message.countdown_secs.to_string()));
        tip.append_with_str_1(before).ok()?;
        tip.append_child(&countdown).ok()?;
        tip.append_with_str_1(after).ok()?;

        let note = create_div(&self.document)?;
        note.set_text_content(Some(&view.message.note_text()));
        set_styles(&note, &[("font-size", "14px"), ("opacity", "0.7"), ("margin-top", "12px")]);

        box_.append_child(&title).ok()?;
        box_.append_child(&tip).ok()?;
        box_.append_child(&note).ok()?;
        Some((box_, countdown))
    }
}

impl ElementProbe for DomSurface {
    type Element = Element;

    fn query_all(&self, selector: &str) -> Vec<Element> {
        let Ok(nodes) = self.document.query_selector_all(selector) else {
            log_debug!("selector {selector} rejected by this page");
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn bounding_rect(&self, element: &Element) -> Rect {
        let rect = element.get_bounding_client_rect();
        Rect::new(rect.x(), rect.y(), rect.width(), rect.height())
    }
}

impl OverlaySurface for DomSurface {
    fn viewport(&self) -> Viewport {
        let dimension = |value: Result<JsValue, JsValue>| {
            value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
        };
        Viewport::new(
            dimension(self.window.inner_width()),
            dimension(self.window.inner_height()),
        )
    }

    fn mount(&mut self, view: &OverlayView) {
        if self.root.is_some() {
            self.unmount();
        }
        let Some(parent) = mount_point(&self.document) else {
            log_warn!("no element to mount the overlay on");
            return;
        };
        let (Some(root), Some(layer)) = (create_div(&self.document), create_div(&self.document))
        else {
            return;
        };

        root.set_id(OVERLAY_ELEMENT_ID);
        let (background, pointer) = if view.message_intercepts_pointer {
            (SHADE, "all")
        } else {
            ("transparent", "none")
        };
        set_styles(
            &root,
            &[
                ("position", "fixed"),
                ("inset", "0"),
                ("z-index", TOP_LAYER),
                ("background", background),
                ("pointer-events", pointer),
                ("user-select", "none"),
            ],
        );

        self.render_bands(&layer, &view.bands);
        let _ = root.append_child(&layer);
        match self.build_message(view) {
            Some((message, countdown)) => {
                let _ = root.append_child(&message);
                self.countdown = Some(countdown);
            }
            None => log_warn!("overlay message could not be built"),
        }

        if let Err(err) = parent.append_child(&root) {
            log_warn!("overlay not attached: {err:?}");
            return;
        }
        if view.freeze_scroll {
            self.freeze_scroll();
        }
        self.root = Some(root);
        self.band_layer = Some(layer);
    }

    fn update_countdown(&mut self, remaining_secs: u64) {
        if let Some(countdown) = &self.countdown {
            countdown.set_text_content(Some(&remaining_secs.to_string()));
        }
    }

    fn update_bands(&mut self, bands: &[Band]) {
        if let Some(layer) = &self.band_layer {
            self.render_bands(layer, bands);
        }
    }

    fn attach_relayout_listeners(&mut self) {
        if self.listeners.is_some() {
            return;
        }
        match &self.relayout_hook {
            Some(hook) => {
                self.listeners = Some(RelayoutListeners::attach(&self.window, Rc::clone(hook)))
            }
            None => log_warn!("no relayout hook; bands will not follow the page"),
        }
    }

    fn detach_relayout_listeners(&mut self) {
        self.listeners = None;
    }

    fn unmount(&mut self) {
        self.listeners = None;
        if let Some(root) = self.root.take() {
            root.remove();
        }
        self.band_layer = None;
        self.countdown = None;
        self.restore_scroll();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Badge
// ─────────────────────────────────────────────────────────────────────────────

/// The fixed corner label showing how long the page has been open.
pub struct StatusBadge {
    element: HtmlElement,
}

impl StatusBadge {
    pub fn mount(document: &Document, body: &HtmlElement) -> Option<Self> {
        let element = create_div(document)?;
        element.set_id(BADGE_ELEMENT_ID);
        set_styles(&element, &BADGE_STYLES);
        body.append_child(&element).ok()?;
        Some(Self { element })
    }

    pub fn set_text(&self, text: &str) {
        self.element.set_text_content(Some(text));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Body ready
// ─────────────────────────────────────────────────────────────────────────────

/// Run `on_ready` with the document body, now or once it is inserted. The
/// observer disconnects after the first successful poll.
pub fn when_body_ready<F>(document: &Document, on_ready: F)
where
    F: FnOnce(HtmlElement) + 'static,
{
    let probe_document = document.clone();
    let mut wait = Deferred::new(move || probe_document.body());
    if let Some(body) = wait.poll() {
        on_ready(body);
        return;
    }

    let Some(root) = document.document_element() else {
        log_warn!("document has no root element; giving up on the body");
        return;
    };

    let wait = RefCell::new(wait);
    let on_ready = RefCell::new(Some(on_ready));
    let observer_slot: Rc<RefCell<Option<MutationObserver>>> = Rc::new(RefCell::new(None));
    let slot = Rc::clone(&observer_slot);

    let callback = Closure::<dyn FnMut(JsValue, JsValue)>::new(move |_records: JsValue, _observer: JsValue| {
        let Some(body) = wait.borrow_mut().poll() else {
            return;
        };
        if let Some(observer) = slot.borrow_mut().take() {
            observer.disconnect();
        }
        if let Some(on_ready) = on_ready.borrow_mut().take() {
            on_ready(body);
        }
    });

    let observer = match MutationObserver::new(callback.as_ref().unchecked_ref()) {
        Ok(observer) => observer,
        Err(err) => {
            log_warn!("mutation observer unavailable: {err:?}");
            return;
        }
    };
    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);
    if let Err(err) = observer.observe_with_options(&root, &init) {
        log_warn!("could not observe the document: {err:?}");
        return;
    }
    *observer_slot.borrow_mut() = Some(observer);
    callback.forget();
}
