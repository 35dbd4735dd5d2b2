use crate::dom::{scroll_limit, EventListener};
use recueil_core::ScrollWorld;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use web_sys as web;

const LINE_HEIGHT_PX: f64 = 16.0;

/// Listeners feeding wheel, touch and resize into the scroll world.
/// Dropping the wiring removes every listener.
pub struct ScrollWiring {
    _listeners: Vec<EventListener>,
}

pub fn wire_scroll_input(window: &web::Window, scroll: &Rc<RefCell<ScrollWorld>>) -> ScrollWiring {
    let mut listeners = Vec::new();
    listeners.extend(wire_wheel(window, Rc::downgrade(scroll)));
    listeners.extend(wire_touch(window, Rc::downgrade(scroll)));
    listeners.extend(wire_resize(window, Rc::downgrade(scroll)));
    sync_limit(&scroll.borrow());
    ScrollWiring {
        _listeners: listeners,
    }
}

/// Normalise `WheelEvent.deltaMode` to pixels.
#[inline]
fn wheel_delta_px(delta: f64, mode: u32, viewport: f64) -> f64 {
    match mode {
        web::WheelEvent::DOM_DELTA_LINE => delta * LINE_HEIGHT_PX,
        web::WheelEvent::DOM_DELTA_PAGE => delta * viewport,
        _ => delta,
    }
}

fn viewport_height() -> f64 {
    web::window()
        .and_then(|w| w.inner_height().ok())
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0)
}

fn wire_wheel(window: &web::Window, scroll: Weak<RefCell<ScrollWorld>>) -> Option<EventListener> {
    EventListener::with_passive(window, "wheel", false, move |ev| {
        let Some(ev) = ev.dyn_ref::<web::WheelEvent>() else {
            return;
        };
        // pinch-zoom arrives as ctrl+wheel
        if ev.ctrl_key() {
            return;
        }
        let Some(scroll) = scroll.upgrade() else {
            return;
        };
        ev.prevent_default();
        let viewport = viewport_height();
        let mode = ev.delta_mode();
        scroll.borrow().on_wheel(
            wheel_delta_px(ev.delta_x(), mode, viewport),
            wheel_delta_px(ev.delta_y(), mode, viewport),
        );
    })
}

fn wire_touch(window: &web::Window, scroll: Weak<RefCell<ScrollWorld>>) -> Vec<EventListener> {
    let last: Rc<Cell<Option<(f64, f64)>>> = Rc::new(Cell::new(None));
    let mut listeners = Vec::new();

    let start = last.clone();
    listeners.extend(EventListener::new(window, "touchstart", move |ev| {
        start.set(ev.dyn_ref::<web::TouchEvent>().and_then(first_touch));
    }));

    let moved = last.clone();
    listeners.extend(EventListener::with_passive(window, "touchmove", false, move |ev| {
        let Some(ev) = ev.dyn_ref::<web::TouchEvent>() else {
            return;
        };
        let (Some(now), Some(prev)) = (first_touch(ev), moved.get()) else {
            return;
        };
        moved.set(Some(now));
        let Some(scroll) = scroll.upgrade() else {
            return;
        };
        ev.prevent_default();
        // finger moving up scrolls down
        scroll.borrow().on_touch(prev.0 - now.0, prev.1 - now.1);
    }));

    let ended = last;
    listeners.extend(EventListener::new(window, "touchend", move |_| ended.set(None)));
    listeners
}

fn first_touch(ev: &web::TouchEvent) -> Option<(f64, f64)> {
    ev.touches()
        .get(0)
        .map(|t| (t.client_x() as f64, t.client_y() as f64))
}

fn wire_resize(window: &web::Window, scroll: Weak<RefCell<ScrollWorld>>) -> Option<EventListener> {
    EventListener::new(window, "resize", move |_| {
        if let Some(scroll) = scroll.upgrade() {
            sync_limit(&scroll.borrow());
        }
    })
}

fn sync_limit(scroll: &ScrollWorld) {
    scroll.set_limit(scroll_limit(scroll.options().orientation));
}
