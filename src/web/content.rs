use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use gloo_timers::callback::{Interval, Timeout};
use wasm_bindgen::{prelude::*, JsCast};
use wasm_bindgen_futures::spawn_local;
use web_sys::{AddEventListenerOptions, Document, Event, HtmlElement, Window};

use super::{
    chrome,
    dom::{self, DomSurface, StatusBadge, WebClock},
};
use crate::{
    activity::ActivityKind,
    badge::{badge_text, BADGE_REFRESH_MS},
    clock::{timer_delay_ms, Clock, Monotonic, TimerSlot},
    host::is_target_host,
    overlay::OverlayStrategy,
    settings::BlockSettings,
    timer::{BlockController, BlockQuery},
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// The page build always cuts out the search box.
const STRATEGY: OverlayStrategy = OverlayStrategy::Cutout;

type PageController = BlockController<Monotonic<WebClock>, DomSurface>;

thread_local! {
    static INSTALLED: RefCell<Option<Rc<ContentScript>>> = const { RefCell::new(None) };
}

/// Entry point for the content script. Does nothing on non-target hosts.
#[wasm_bindgen]
pub fn run_content_script() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let host = window.location().hostname().unwrap_or_default();
    if !is_target_host(&host) {
        log_debug!("{host} is not a target host");
        return;
    }
    let Some(document) = window.document() else {
        return;
    };
    log_info!("content script loaded on {host}");

    spawn_local(async move {
        let settings = chrome::load_settings().await;
        let ready_document = document.clone();
        dom::when_body_ready(&document, move |body| {
            ContentScript::install(window, ready_document, body, settings);
        });
    });
}

/// Everything the page session owns. Lives until the page unloads.
struct ContentScript {
    controller: RefCell<PageController>,
    /// The single pending host timer for the controller's next deadline.
    wake: RefCell<TimerSlot<Timeout>>,
    badge_interval: RefCell<Option<Interval>>,
    activity_listeners: RefCell<Vec<Closure<dyn FnMut(Event)>>>,
    message_listener: RefCell<Option<Closure<dyn FnMut(JsValue, JsValue, js_sys::Function)>>>,
}

impl ContentScript {
    fn install(window: Window, document: Document, body: HtmlElement, settings: BlockSettings) {
        if INSTALLED.with(|slot| slot.borrow().is_some()) {
            log_warn!("content script already running on this page");
            return;
        }

        let script = Rc::new_cyclic(|weak: &Weak<ContentScript>| {
            let surface = DomSurface::new(window.clone(), document.clone())
                .with_relayout_hook(relayout_hook(weak.clone()));
            ContentScript {
                controller: RefCell::new(BlockController::new(
                    settings,
                    STRATEGY,
                    Monotonic::new(WebClock::new(&window)),
                    surface,
                )),
                wake: RefCell::new(TimerSlot::new()),
                badge_interval: RefCell::new(None),
                activity_listeners: RefCell::new(Vec::new()),
                message_listener: RefCell::new(None),
            }
        });

        script.controller.borrow_mut().start();
        script.rearm();
        script.listen_for_activity(&window);
        script.show_badge(&document, &body);
        script.answer_queries();

        INSTALLED.with(|slot| *slot.borrow_mut() = Some(script));
    }

    /// Replace the pending timer with one for the controller's next deadline.
    fn rearm(self: &Rc<Self>) {
        let (deadline, now) = match self.controller.try_borrow() {
            Ok(controller) => (controller.next_deadline_ms(), controller.clock().now_ms()),
            Err(_) => {
                log_warn!("controller busy; retrying on the next turn");
                self.arm(0);
                return;
            }
        };
        match deadline {
            Some(deadline) => self.arm(timer_delay_ms(deadline, now)),
            None => self.wake.borrow_mut().clear(),
        }
    }

    fn arm(self: &Rc<Self>, delay_ms: u32) {
        let weak = Rc::downgrade(self);
        let timeout = Timeout::new(delay_ms, move || {
            if let Some(script) = weak.upgrade() {
                script.on_wake();
            }
        });
        self.wake.borrow_mut().arm(timeout);
    }

    fn on_wake(self: &Rc<Self>) {
        self.wake.borrow_mut().fired();

        if let Ok(mut controller) = self.controller.try_borrow_mut() {
            controller.advance();
        }
        self.rearm();
    }

    fn listen_for_activity(self: &Rc<Self>, window: &Window) {
        let mut listeners = self.activity_listeners.borrow_mut();
        for kind in ActivityKind::ALL {
            let weak = Rc::downgrade(self);
            let callback = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
                let Some(script) = weak.upgrade() else {
                    return;
                };
                let rearmed = match script.controller.try_borrow_mut() {
                    Ok(mut controller) => controller.on_activity(kind),
                    Err(_) => false,
                };
                if rearmed {
                    script.rearm();
                }
            });

            let options = AddEventListenerOptions::new();
            options.set_passive(kind.is_passive());
            if let Err(err) = window.add_event_listener_with_callback_and_add_event_listener_options(
                kind.event_name(),
                callback.as_ref().unchecked_ref(),
                &options,
            ) {
                log_warn!("{} listener not attached: {err:?}", kind.event_name());
                continue;
            }
            listeners.push(callback);
        }
    }

    fn show_badge(self: &Rc<Self>, document: &Document, body: &HtmlElement) {
        let Some(badge) = StatusBadge::mount(document, body) else {
            log_warn!("badge could not be mounted");
            return;
        };
        let weak = Rc::downgrade(self);
        let refresh = move || {
            let Some(script) = weak.upgrade() else {
                return;
            };
            if let Ok(controller) = script.controller.try_borrow() {
                badge.set_text(&badge_text(controller.elapsed_secs()));
            }
        };
        refresh();
        *self.badge_interval.borrow_mut() = Some(Interval::new(BADGE_REFRESH_MS, refresh));
    }

    fn answer_queries(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        let listener = Closure::<dyn FnMut(JsValue, JsValue, js_sys::Function)>::new(
            move |message: JsValue, _sender: JsValue, send_response: js_sys::Function| {
                let message = chrome::from_js(message).unwrap_or_default();
                let Some(query) = BlockQuery::from_message(&message) else {
                    return;
                };
                let Some(script) = weak.upgrade() else {
                    return;
                };
                let reply = match script.controller.try_borrow() {
                    Ok(controller) => controller.answer(query),
                    Err(_) => return,
                };
                match chrome::to_js(&reply) {
                    Ok(reply) => {
                        let _ = send_response.call1(&JsValue::NULL, &reply);
                    }
                    Err(err) => log_warn!("reply to {query:?} not sent: {err:#}"),
                }
            },
        );

        if let Err(err) = chrome::add_message_listener(&listener) {
            log_warn!("popup queries will go unanswered: {err:#}");
            return;
        }
        *self.message_listener.borrow_mut() = Some(listener);
    }
}

fn relayout_hook(script: Weak<ContentScript>) -> Rc<dyn Fn()> {
    Rc::new(move || {
        let Some(script) = script.upgrade() else {
            return;
        };
        if let Ok(mut controller) = script.controller.try_borrow_mut() {
            controller.relayout();
        }
    })
}
