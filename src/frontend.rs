use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions, EventListenerPhase};
use gloo_timers::callback::Timeout;
use js_sys::Reflect;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    console, window, Document, Element, HtmlButtonElement, HtmlElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, KeyboardEvent, MouseEvent, NodeList,
    PerformanceNavigationTiming, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition,
    Window,
};

use crate::behavior::{self, NavbarMode, SectionSpan, SubmitPhase};
use crate::timing::{Debounce, Throttle};

const NAV_LINK_SELECTOR: &str = ".nav-link";
const SECTION_SELECTOR: &str = "section, header";
const FADE_IN_SELECTOR: &str = ".fade-in";
const SHAPE_SELECTOR: &str = ".shape";
const CONTACT_FORM_SELECTOR: &str = ".contact-form";
const SUBMIT_BUTTON_SELECTOR: &str = ".submit-button";
const INTERACTIVE_SELECTOR: &str = "a, button, .glass-card, .skill-card, .project-card";

const ACTIVE_CLASS: &str = "active";
const VISIBLE_CLASS: &str = "visible";
const KEYBOARD_NAV_CLASS: &str = "keyboard-navigation";

const SCROLL_THROTTLE_WINDOW_MS: f64 = 16.0;
const RESIZE_DEBOUNCE_WAIT_MS: u32 = 150;

const NAVBAR_TOP_BACKGROUND: &str = "rgba(255, 255, 255, 0.1)";
const NAVBAR_SCROLLED_BACKGROUND: &str = "rgba(15, 15, 35, 0.95)";
const NAVBAR_SCROLLED_SHADOW: &str = "0 10px 30px rgba(0, 0, 0, 0.3)";
const SENT_BUTTON_BACKGROUND: &str = "#10b981";

const OBSERVER_ROOT_MARGIN: &str = "0px 0px -100px 0px";
const OBSERVER_THRESHOLD: f64 = 0.1;

const CURSOR_SIZE_PX: f64 = 20.0;
const CURSOR_BASE_STYLE: &str = "position: fixed; width: 20px; height: 20px; \
    background: linear-gradient(45deg, #6366f1, #ec4899); border-radius: 50%; \
    pointer-events: none; z-index: 9999; mix-blend-mode: difference; \
    transition: all 0.1s ease; opacity: 0;";

pub fn run() {
    let Some(window) = window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    let enhancements = PageEnhancements::attach(&window, &document);
    // Subscriptions live for the whole page lifetime.
    std::mem::forget(enhancements);
}

/// Every behavior is an independent observer of the shared document; each
/// one owns its own subscriptions, and a missing element disables only the
/// component that needed it.
struct PageEnhancements {
    _smooth_scroll: Option<SmoothScroll>,
    _active_nav: Option<ActiveNav>,
    _reveal: Option<RevealAnimator>,
    _navbar: Option<NavbarBackground>,
    _form: Option<FormSimulator>,
    _parallax: Option<Parallax>,
    _cursor: Option<CursorFollower>,
    _keyboard: KeyboardFocus,
    _load_timing: LoadTiming,
}

impl PageEnhancements {
    fn attach(window: &Window, document: &Document) -> Self {
        Self {
            _smooth_scroll: SmoothScroll::attach(document),
            _active_nav: ActiveNav::attach(window, document),
            _reveal: RevealAnimator::attach(window, document),
            _navbar: NavbarBackground::attach(window, document),
            _form: FormSimulator::attach(document),
            _parallax: Parallax::attach(window, document),
            _cursor: CursorFollower::attach(window, document),
            _keyboard: KeyboardFocus::attach(document),
            _load_timing: LoadTiming::attach(window),
        }
    }
}

fn now_ms() -> f64 {
    js_sys::Date::now()
}

fn warn_missing(what: &str) {
    console::warn_1(&JsValue::from_str(&format!(
        "expected element missing: {what}"
    )));
}

fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    document
        .query_selector_all(selector)
        .map(|list| node_list_elements(&list))
        .unwrap_or_default()
}

fn node_list_elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|index| list.get(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn scroll_offset(window: &Window) -> f64 {
    window.scroll_y().unwrap_or(0.0)
}

fn viewport_width(window: &Window) -> f64 {
    window
        .inner_width()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0)
}

fn viewport_height(window: &Window) -> f64 {
    window
        .inner_height()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0)
}

struct SmoothScroll {
    _clicks: Vec<EventListener>,
}

impl SmoothScroll {
    fn attach(document: &Document) -> Option<Self> {
        let links = query_all(document, NAV_LINK_SELECTOR);
        if links.is_empty() {
            warn_missing(NAV_LINK_SELECTOR);
            return None;
        }

        let clicks = links
            .into_iter()
            .map(|link| {
                let fragment = link.get_attribute("href").unwrap_or_default();
                let handler_document = document.clone();
                EventListener::new_with_options(
                    &link,
                    "click",
                    EventListenerOptions {
                        phase: EventListenerPhase::Bubble,
                        passive: false,
                    },
                    move |event| {
                        event.prevent_default();
                        let Ok(Some(target)) = handler_document.query_selector(&fragment) else {
                            return;
                        };
                        let options = ScrollIntoViewOptions::new();
                        options.set_behavior(ScrollBehavior::Smooth);
                        options.set_block(ScrollLogicalPosition::Start);
                        target.scroll_into_view_with_scroll_into_view_options(&options);
                    },
                )
            })
            .collect();

        Some(Self { _clicks: clicks })
    }
}

struct ActiveNav {
    _scroll: EventListener,
    _resize: EventListener,
}

impl ActiveNav {
    fn attach(window: &Window, document: &Document) -> Option<Self> {
        if query_all(document, NAV_LINK_SELECTOR).is_empty() {
            warn_missing(NAV_LINK_SELECTOR);
            return None;
        }

        // Eager pass so the landing section is highlighted before the
        // first scroll event arrives.
        update_active_nav(window, document);

        let scroll = {
            let handler_window = window.clone();
            let handler_document = document.clone();
            let gate = Rc::new(RefCell::new(Throttle::new(SCROLL_THROTTLE_WINDOW_MS)));
            EventListener::new(window, "scroll", move |_event| {
                if gate.borrow_mut().admit(now_ms()) {
                    update_active_nav(&handler_window, &handler_document);
                }
            })
        };

        // Section offsets move when layout reflows, so a resize re-runs
        // the pass once the burst settles.
        let resize = {
            let handler_window = window.clone();
            let handler_document = document.clone();
            let gate = Rc::new(RefCell::new(Debounce::new(
                f64::from(RESIZE_DEBOUNCE_WAIT_MS),
                false,
            )));
            let pending: Rc<RefCell<Option<Timeout>>> = Rc::new(RefCell::new(None));
            EventListener::new(window, "resize", move |_event| {
                if gate.borrow_mut().on_call(now_ms()) {
                    update_active_nav(&handler_window, &handler_document);
                }
                let timeout = {
                    let gate = Rc::clone(&gate);
                    let deadline_window = handler_window.clone();
                    let deadline_document = handler_document.clone();
                    Timeout::new(RESIZE_DEBOUNCE_WAIT_MS, move || {
                        if gate.borrow_mut().on_deadline(now_ms()) {
                            update_active_nav(&deadline_window, &deadline_document);
                        }
                    })
                };
                // Arming replaces, and thereby cancels, the previous one.
                *pending.borrow_mut() = Some(timeout);
            })
        };

        Some(Self {
            _scroll: scroll,
            _resize: resize,
        })
    }
}

fn update_active_nav(window: &Window, document: &Document) {
    let sections = measure_sections(document);
    let selected = behavior::active_section(scroll_offset(window), &sections);
    let target = selected.map(|id| format!("#{id}"));

    for link in query_all(document, NAV_LINK_SELECTOR) {
        let class_list = link.class_list();
        let _ = class_list.remove_1(ACTIVE_CLASS);
        if link.get_attribute("href").as_deref() == target.as_deref() {
            let _ = class_list.add_1(ACTIVE_CLASS);
        }
    }
}

fn measure_sections(document: &Document) -> Vec<SectionSpan> {
    query_all(document, SECTION_SELECTOR)
        .into_iter()
        .filter_map(|element| {
            let element = element.dyn_into::<HtmlElement>().ok()?;
            Some(SectionSpan {
                id: element.id(),
                top: f64::from(element.offset_top()),
                height: f64::from(element.offset_height()),
            })
        })
        .collect()
}

struct RevealAnimator {
    _scroll: EventListener,
    _load: EventListener,
    _observer: Option<RevealObserver>,
}

impl RevealAnimator {
    fn attach(window: &Window, document: &Document) -> Option<Self> {
        if query_all(document, FADE_IN_SELECTOR).is_empty() {
            warn_missing(FADE_IN_SELECTOR);
            return None;
        }

        reveal_due_elements(window, document);

        let scroll = {
            let handler_window = window.clone();
            let handler_document = document.clone();
            EventListener::new(window, "scroll", move |_event| {
                reveal_due_elements(&handler_window, &handler_document);
            })
        };

        let load = {
            let handler_window = window.clone();
            let handler_document = document.clone();
            EventListener::new(window, "load", move |_event| {
                reveal_due_elements(&handler_window, &handler_document);
            })
        };

        Some(Self {
            _scroll: scroll,
            _load: load,
            _observer: RevealObserver::attach(window, document),
        })
    }
}

fn reveal_due_elements(window: &Window, document: &Document) {
    let viewport = viewport_height(window);

    for element in query_all(document, FADE_IN_SELECTOR) {
        let top = element.get_bounding_client_rect().top();
        if behavior::reveal_due(top, viewport) {
            let _ = element.class_list().add_1(VISIBLE_CLASS);
        }
    }
}

/// One-shot reveal subscriptions: each element is unobserved on its first
/// intersection. Runs alongside the polling strategy; marking is
/// idempotent either way.
struct RevealObserver {
    _observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>,
}

impl RevealObserver {
    fn attach(window: &Window, document: &Document) -> Option<Self> {
        let supported = Reflect::has(window.as_ref(), &JsValue::from_str("IntersectionObserver"))
            .unwrap_or(false);
        if !supported {
            return None;
        }

        let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
            move |entries: js_sys::Array, observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                        continue;
                    };
                    if entry.is_intersecting() {
                        let target = entry.target();
                        let _ = target.class_list().add_1(VISIBLE_CLASS);
                        observer.unobserve(&target);
                    }
                }
            },
        );

        let options = IntersectionObserverInit::new();
        options.set_root_margin(OBSERVER_ROOT_MARGIN);
        options.set_threshold(&JsValue::from_f64(OBSERVER_THRESHOLD));

        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
                .ok()?;

        for element in query_all(document, FADE_IN_SELECTOR) {
            observer.observe(&element);
        }

        Some(Self {
            _observer: observer,
            _callback: callback,
        })
    }
}

struct NavbarBackground {
    _scroll: EventListener,
}

impl NavbarBackground {
    fn attach(window: &Window, document: &Document) -> Option<Self> {
        let navbar = document
            .get_element_by_id("navbar")
            .and_then(|element| element.dyn_into::<HtmlElement>().ok());
        let Some(navbar) = navbar else {
            warn_missing("#navbar");
            return None;
        };

        apply_navbar_mode(&navbar, NavbarMode::for_offset(scroll_offset(window)));

        let scroll = {
            let handler_window = window.clone();
            EventListener::new(window, "scroll", move |_event| {
                let mode = NavbarMode::for_offset(scroll_offset(&handler_window));
                apply_navbar_mode(&navbar, mode);
            })
        };

        Some(Self { _scroll: scroll })
    }
}

fn apply_navbar_mode(navbar: &HtmlElement, mode: NavbarMode) {
    let (background, shadow) = match mode {
        NavbarMode::Scrolled => (NAVBAR_SCROLLED_BACKGROUND, NAVBAR_SCROLLED_SHADOW),
        NavbarMode::Top => (NAVBAR_TOP_BACKGROUND, "none"),
    };

    let style = navbar.style();
    let _ = style.set_property("background", background);
    let _ = style.set_property("box-shadow", shadow);
}

struct FormSimulator {
    _submit: EventListener,
}

impl FormSimulator {
    fn attach(document: &Document) -> Option<Self> {
        let Ok(Some(form)) = document.query_selector(CONTACT_FORM_SELECTOR) else {
            warn_missing(CONTACT_FORM_SELECTOR);
            return None;
        };
        let button = document
            .query_selector(SUBMIT_BUTTON_SELECTOR)
            .ok()
            .flatten()
            .and_then(|element| element.dyn_into::<HtmlButtonElement>().ok());
        let Some(button) = button else {
            warn_missing(SUBMIT_BUTTON_SELECTOR);
            return None;
        };

        let phase = Rc::new(RefCell::new(SubmitPhase::Idle));
        let submit = {
            let phase = Rc::clone(&phase);
            // The submit default is deliberately not prevented; the phase
            // machine is a visual overlay on whatever the browser does.
            EventListener::new(&form, "submit", move |_event| {
                let Some(next) = phase.borrow().on_submit() else {
                    return;
                };
                *phase.borrow_mut() = next;

                let original_text = button.text_content().unwrap_or_default();
                apply_submit_phase(&button, next, &original_text);
                schedule_submit_phase(Rc::clone(&phase), button.clone(), original_text);
            })
        };

        Some(Self { _submit: submit })
    }
}

fn apply_submit_phase(button: &HtmlButtonElement, phase: SubmitPhase, original_text: &str) {
    match phase.label() {
        Some(label) => button.set_text_content(Some(label)),
        None => button.set_text_content(Some(original_text)),
    }

    let style = button.style();
    match phase {
        SubmitPhase::Idle => {
            let _ = style.set_property("opacity", "1");
            let _ = style.remove_property("background-color");
        }
        SubmitPhase::Sending => {
            let _ = style.set_property("opacity", "0.7");
        }
        SubmitPhase::Sent => {
            let _ = style.set_property("background-color", SENT_BUTTON_BACKGROUND);
        }
    }

    button.set_disabled(phase.disables_button());
}

fn schedule_submit_phase(
    phase: Rc<RefCell<SubmitPhase>>,
    button: HtmlButtonElement,
    original_text: String,
) {
    let Some((dwell_ms, next)) = phase.borrow().scheduled_next() else {
        return;
    };

    Timeout::new(dwell_ms, move || {
        // The form may have been replaced while the timer was armed.
        if !button.is_connected() {
            return;
        }
        *phase.borrow_mut() = next;
        apply_submit_phase(&button, next, &original_text);
        schedule_submit_phase(phase, button, original_text);
    })
    .forget();
}

struct Parallax {
    _scroll: EventListener,
}

impl Parallax {
    fn attach(window: &Window, document: &Document) -> Option<Self> {
        if query_all(document, SHAPE_SELECTOR).is_empty() {
            warn_missing(SHAPE_SELECTOR);
            return None;
        }

        let scroll = {
            let handler_window = window.clone();
            let handler_document = document.clone();
            EventListener::new(window, "scroll", move |_event| {
                let offset = scroll_offset(&handler_window);
                let shapes = query_all(&handler_document, SHAPE_SELECTOR);

                for (index, shape) in shapes.into_iter().enumerate() {
                    let Ok(shape) = shape.dyn_into::<HtmlElement>() else {
                        continue;
                    };
                    let transform = behavior::parallax_transform(offset, index);
                    let _ = shape.style().set_property("transform", &transform);
                }
            })
        };

        Some(Self { _scroll: scroll })
    }
}

struct CursorFollower {
    _mousemove: EventListener,
    _mouseleave: EventListener,
    _hovers: Vec<EventListener>,
}

impl CursorFollower {
    fn attach(window: &Window, document: &Document) -> Option<Self> {
        // Narrow viewports skip the follower entirely; this is the one
        // absence that is expected rather than diagnostic.
        if !behavior::cursor_enabled(viewport_width(window)) {
            return None;
        }

        let cursor = document
            .create_element("div")
            .ok()?
            .dyn_into::<HtmlElement>()
            .ok()?;
        cursor.set_class_name("custom-cursor");
        cursor.style().set_css_text(CURSOR_BASE_STYLE);

        let body = document.body()?;
        body.append_child(&cursor).ok()?;

        let mousemove = {
            let cursor = cursor.clone();
            EventListener::new(document, "mousemove", move |event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let half = CURSOR_SIZE_PX / 2.0;
                let style = cursor.style();
                let left = f64::from(event.client_x()) - half;
                let top = f64::from(event.client_y()) - half;
                let _ = style.set_property("left", &format!("{left}px"));
                let _ = style.set_property("top", &format!("{top}px"));
                let _ = style.set_property("opacity", "1");
            })
        };

        let mouseleave = {
            let cursor = cursor.clone();
            EventListener::new(document, "mouseleave", move |_event| {
                let _ = cursor.style().set_property("opacity", "0");
            })
        };

        let mut hovers = Vec::new();
        for interactive in query_all(document, INTERACTIVE_SELECTOR) {
            let enter = {
                let cursor = cursor.clone();
                EventListener::new(&interactive, "mouseenter", move |_event| {
                    let style = cursor.style();
                    let _ = style.set_property("transform", "scale(2)");
                    let _ = style.set_property("opacity", "0.8");
                })
            };
            let leave = {
                let cursor = cursor.clone();
                EventListener::new(&interactive, "mouseleave", move |_event| {
                    let style = cursor.style();
                    let _ = style.set_property("transform", "scale(1)");
                    let _ = style.set_property("opacity", "1");
                })
            };
            hovers.push(enter);
            hovers.push(leave);
        }

        Some(Self {
            _mousemove: mousemove,
            _mouseleave: mouseleave,
            _hovers: hovers,
        })
    }
}

struct KeyboardFocus {
    _keydown: EventListener,
    _mousedown: EventListener,
}

impl KeyboardFocus {
    fn attach(document: &Document) -> Self {
        let keydown = {
            let handler_document = document.clone();
            EventListener::new(document, "keydown", move |event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                if event.key() != "Tab" {
                    return;
                }
                if let Some(body) = handler_document.body() {
                    let _ = body.class_list().add_1(KEYBOARD_NAV_CLASS);
                }
            })
        };

        let mousedown = {
            let handler_document = document.clone();
            EventListener::new(document, "mousedown", move |_event| {
                if let Some(body) = handler_document.body() {
                    let _ = body.class_list().remove_1(KEYBOARD_NAV_CLASS);
                }
            })
        };

        Self {
            _keydown: keydown,
            _mousedown: mousedown,
        }
    }
}

struct LoadTiming {
    _load: EventListener,
}

impl LoadTiming {
    fn attach(window: &Window) -> Self {
        let load = {
            let handler_window = window.clone();
            EventListener::once(window, "load", move |_event| {
                // loadEventEnd is only populated once the load handlers
                // have returned; read the entry on the next tick.
                Timeout::new(0, move || log_page_load_timing(&handler_window)).forget();
            })
        };

        Self { _load: load }
    }
}

fn log_page_load_timing(window: &Window) {
    let Some(performance) = window.performance() else {
        return;
    };
    let entries = performance.get_entries_by_type("navigation");
    let Ok(entry) = entries.get(0).dyn_into::<PerformanceNavigationTiming>() else {
        return;
    };

    let elapsed = entry.load_event_end() - entry.load_event_start();
    console::log_1(&JsValue::from_str(&format!("page load time: {elapsed}ms")));
}
