use instant::Instant;
use recueil_core::FrameTicker;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

struct LoopState {
    ticker: FrameTicker,
    started: Instant,
    running: Cell<bool>,
    request_id: Cell<Option<i32>>,
    tick: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl LoopState {
    fn request_next(&self) {
        if !self.running.get() {
            return;
        }
        let Some(w) = web::window() else {
            return;
        };
        if let Some(tick) = self.tick.borrow().as_ref() {
            match w.request_animation_frame(tick.as_ref().unchecked_ref()) {
                Ok(id) => self.request_id.set(Some(id)),
                Err(e) => log::error!("[ticker] requestAnimationFrame failed: {:?}", e),
            }
        }
    }

    fn frame(&self) {
        self.request_id.set(None);
        if !self.running.get() {
            return;
        }
        let now_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        self.ticker.tick(now_ms);
        self.request_next();
    }
}

/// The requestAnimationFrame loop feeding the frame ticker.
///
/// Stops (and cancels the pending frame) on `stop` or drop.
pub struct AnimationLoop {
    state: Rc<LoopState>,
}

pub fn start_loop(ticker: FrameTicker) -> AnimationLoop {
    let state = Rc::new(LoopState {
        ticker,
        started: Instant::now(),
        running: Cell::new(true),
        request_id: Cell::new(None),
        tick: RefCell::new(None),
    });
    let weak: Weak<LoopState> = Rc::downgrade(&state);
    *state.tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        if let Some(state) = weak.upgrade() {
            state.frame();
        }
    }) as Box<dyn FnMut()>));
    state.request_next();
    AnimationLoop { state }
}

impl AnimationLoop {
    pub fn is_running(&self) -> bool {
        self.state.running.get()
    }

    pub fn stop(&self) {
        if !self.state.running.replace(false) {
            return;
        }
        if let (Some(id), Some(w)) = (self.state.request_id.take(), web::window()) {
            _ = w.cancel_animation_frame(id);
        }
        self.state.tick.borrow_mut().take();
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
