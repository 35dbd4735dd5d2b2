//! Inertial scroll: turns raw wheel/touch deltas into a smoothed scroll value.
//!
//! Each frame tick the smoothed value covers a fixed fraction (`lerp`) of the
//! remaining distance to the target, so it coasts instead of tracking input
//! 1:1. Explicit `scroll_to` calls may instead run a timed, eased tween.
//! Listeners receive a [`ScrollFrame`] whenever the value moves; they drive
//! scroll-linked visuals only, never the narrative step.

use crate::constants::{
    SCROLL_DURATION_MS, SCROLL_LERP, SCROLL_SETTLE_EPSILON, SCROLL_TOUCH_MULTIPLIER,
    SCROLL_WHEEL_MULTIPLIER,
};
use crate::registration::{Registration, Registry};
use crate::ticker::{FrameTicker, Tick};
use crate::tween::{Easing, Tween};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
    /// Gestures only: take whichever axis moved more.
    Both,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollOptions {
    pub lerp: f64,
    pub duration_ms: f64,
    pub easing: Easing,
    /// Axis the page scrolls along. `Both` scrolls vertically.
    pub orientation: Orientation,
    pub gesture_orientation: Orientation,
    pub smooth_wheel: bool,
    pub wheel_multiplier: f64,
    pub smooth_touch: bool,
    pub touch_multiplier: f64,
    pub infinite: bool,
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self {
            lerp: SCROLL_LERP,
            duration_ms: SCROLL_DURATION_MS,
            easing: Easing::ExpoOut,
            orientation: Orientation::Vertical,
            gesture_orientation: Orientation::Vertical,
            smooth_wheel: true,
            wheel_multiplier: SCROLL_WHEEL_MULTIPLIER,
            smooth_touch: false,
            touch_multiplier: SCROLL_TOUCH_MULTIPLIER,
            infinite: false,
        }
    }
}

impl ScrollOptions {
    /// Window offset `(x, y)` for a smoothed scroll value. `None` when the
    /// scroll is infinite: it then only drives visuals.
    pub fn window_offset(&self, scroll: f64) -> Option<(f64, f64)> {
        if self.infinite {
            return None;
        }
        match self.orientation {
            Orientation::Horizontal => Some((scroll, 0.0)),
            Orientation::Vertical | Orientation::Both => Some((0.0, scroll)),
        }
    }
}

/// Per-call overrides for [`ScrollWorld::scroll_to`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScrollTo {
    pub immediate: bool,
    pub duration_ms: Option<f64>,
    pub easing: Option<Easing>,
    /// Use lerp smoothing instead of a timed tween.
    pub lerp: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollFrame {
    pub scroll: f64,
    pub limit: f64,
    /// `scroll / limit` (0 when there is nothing to scroll).
    pub progress: f64,
    pub velocity: f64,
    /// -1, 0 or 1.
    pub direction: i8,
    pub is_scrolling: bool,
}

#[derive(Clone, Debug)]
enum Motion {
    Idle,
    Lerp { factor: f64 },
    Timed(Tween),
}

type ScrollCallback = dyn FnMut(&ScrollFrame);

struct ScrollInner {
    options: ScrollOptions,
    target: f64,
    animated: f64,
    limit: f64,
    velocity: f64,
    direction: i8,
    motion: Motion,
    last_time_ms: Option<f64>,
    listeners: Registry<ScrollCallback>,
    released: bool,
}

impl ScrollInner {
    fn clamp(&self, value: f64) -> f64 {
        if self.options.infinite {
            value
        } else {
            value.clamp(0.0, self.limit.max(0.0))
        }
    }

    fn progress(&self) -> f64 {
        if self.limit <= 0.0 {
            return 0.0;
        }
        if self.options.infinite {
            self.animated.rem_euclid(self.limit) / self.limit
        } else {
            self.animated / self.limit
        }
    }

    fn frame(&self) -> ScrollFrame {
        ScrollFrame {
            scroll: self.animated,
            limit: self.limit,
            progress: self.progress(),
            velocity: self.velocity,
            direction: self.direction,
            is_scrolling: !matches!(self.motion, Motion::Idle),
        }
    }

    fn set_direction(&mut self, delta: f64) {
        self.direction = if delta > 0.0 {
            1
        } else if delta < 0.0 {
            -1
        } else {
            0
        };
    }

    /// Jump straight to `value`. Returns whether anything moved.
    fn jump(&mut self, value: f64) -> bool {
        let value = self.clamp(value);
        let moved = value != self.animated;
        self.velocity = value - self.animated;
        self.set_direction(self.velocity);
        self.target = value;
        self.animated = value;
        self.motion = Motion::Idle;
        moved
    }

    /// One animation step. Returns whether the smoothed value moved.
    ///
    /// Lerp motion follows `|s_n - T| = |s_0 - T| * (1 - lerp)^n` until the
    /// remaining distance drops below `SCROLL_SETTLE_EPSILON`; that step
    /// lands exactly on the target and the motion goes idle.
    fn step(&mut self, delta_ms: f64) -> bool {
        let before = self.animated;
        match &mut self.motion {
            Motion::Idle => return false,
            Motion::Lerp { factor } => {
                let factor = *factor;
                self.animated += (self.target - self.animated) * factor;
                if (self.target - self.animated).abs() < SCROLL_SETTLE_EPSILON {
                    self.animated = self.target;
                    self.motion = Motion::Idle;
                }
            }
            Motion::Timed(tween) => {
                self.animated = tween.advance(delta_ms);
                if tween.is_finished() {
                    self.animated = self.target;
                    self.motion = Motion::Idle;
                }
            }
        }
        self.velocity = self.animated - before;
        self.set_direction(self.velocity);
        self.animated != before
    }
}

/// Scroll physics bound to a frame ticker for as long as it is mounted.
///
/// Dropping the world (or calling [`ScrollWorld::release`]) unregisters the
/// per-frame callback and forgets all listeners.
pub struct ScrollWorld {
    inner: Rc<RefCell<ScrollInner>>,
    ticker_registration: Registration,
}

impl ScrollWorld {
    pub fn mount(ticker: &FrameTicker, options: ScrollOptions) -> Self {
        let inner = Rc::new(RefCell::new(ScrollInner {
            options,
            target: 0.0,
            animated: 0.0,
            limit: 0.0,
            velocity: 0.0,
            direction: 0,
            motion: Motion::Idle,
            last_time_ms: None,
            listeners: Registry::default(),
            released: false,
        }));
        let weak = Rc::downgrade(&inner);
        let ticker_registration = ticker.register(move |tick: &Tick| {
            if let Some(inner) = weak.upgrade() {
                raf(&inner, tick.time_ms);
            }
        });
        Self {
            inner,
            ticker_registration,
        }
    }

    pub fn options(&self) -> ScrollOptions {
        self.inner.borrow().options.clone()
    }

    pub fn scroll(&self) -> f64 {
        self.inner.borrow().animated
    }

    pub fn target(&self) -> f64 {
        self.inner.borrow().target
    }

    pub fn limit(&self) -> f64 {
        self.inner.borrow().limit
    }

    pub fn progress(&self) -> f64 {
        self.inner.borrow().progress()
    }

    pub fn is_scrolling(&self) -> bool {
        !matches!(self.inner.borrow().motion, Motion::Idle)
    }

    pub fn is_released(&self) -> bool {
        self.inner.borrow().released
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Maximum scroll extent (e.g. document height minus viewport height).
    pub fn set_limit(&self, limit: f64) {
        let moved = {
            let mut inner = self.inner.borrow_mut();
            if inner.released {
                return;
            }
            inner.limit = limit.max(0.0);
            let target = inner.clamp(inner.target);
            inner.target = target;
            let animated = inner.clamp(inner.animated);
            let moved = animated != inner.animated;
            inner.animated = animated;
            moved
        };
        if moved {
            notify(&self.inner);
        }
    }

    /// Register a listener for scroll frames.
    pub fn on_scroll(&self, callback: impl FnMut(&ScrollFrame) + 'static) -> Registration {
        let entry: Rc<RefCell<ScrollCallback>> = Rc::new(RefCell::new(callback));
        let id = self.inner.borrow_mut().listeners.insert(entry);
        let weak = Rc::downgrade(&self.inner);
        Registration::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().listeners.remove(id);
            }
        })
    }

    pub fn on_wheel(&self, delta_x: f64, delta_y: f64) {
        let (delta, smooth, multiplier) = {
            let inner = self.inner.borrow();
            (
                gesture_delta(inner.options.gesture_orientation, delta_x, delta_y),
                inner.options.smooth_wheel,
                inner.options.wheel_multiplier,
            )
        };
        self.push_delta(delta * multiplier, smooth);
    }

    pub fn on_touch(&self, delta_x: f64, delta_y: f64) {
        let (delta, smooth, multiplier) = {
            let inner = self.inner.borrow();
            (
                gesture_delta(inner.options.gesture_orientation, delta_x, delta_y),
                inner.options.smooth_touch,
                inner.options.touch_multiplier,
            )
        };
        self.push_delta(delta * multiplier, smooth);
    }

    fn push_delta(&self, delta: f64, smooth: bool) {
        if delta == 0.0 {
            return;
        }
        let (base, lerp) = {
            let inner = self.inner.borrow();
            if inner.released {
                return;
            }
            (inner.target, inner.options.lerp)
        };
        self.scroll_to(
            base + delta,
            ScrollTo {
                immediate: !smooth,
                lerp: Some(lerp),
                ..ScrollTo::default()
            },
        );
    }

    /// Move towards `target`: immediately, lerp-smoothed, or as a timed
    /// tween using the configured easing (the default).
    pub fn scroll_to(&self, target: f64, how: ScrollTo) {
        let moved = {
            let mut inner = self.inner.borrow_mut();
            if inner.released {
                return;
            }
            let target = inner.clamp(target);
            if how.immediate {
                inner.jump(target)
            } else {
                inner.target = target;
                inner.motion = match how.lerp {
                    Some(factor) => Motion::Lerp { factor },
                    None => Motion::Timed(Tween::new(
                        inner.animated,
                        target,
                        how.duration_ms.unwrap_or(inner.options.duration_ms),
                        how.easing.unwrap_or(inner.options.easing),
                    )),
                };
                false
            }
        };
        if moved {
            notify(&self.inner);
        }
    }

    /// Stop any running motion where it is.
    pub fn stop(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.target = inner.animated;
        inner.velocity = 0.0;
        inner.motion = Motion::Idle;
    }

    /// Advance by one animation frame. Normally called by the ticker.
    pub fn raf(&self, time_ms: f64) {
        raf(&self.inner, time_ms);
    }

    pub fn release(&mut self) {
        self.ticker_registration.release();
        let mut inner = self.inner.borrow_mut();
        if !inner.released {
            inner.released = true;
            inner.motion = Motion::Idle;
            inner.listeners.clear();
        }
    }
}

impl Drop for ScrollWorld {
    fn drop(&mut self) {
        self.release();
    }
}

fn gesture_delta(orientation: Orientation, delta_x: f64, delta_y: f64) -> f64 {
    match orientation {
        Orientation::Vertical => delta_y,
        Orientation::Horizontal => delta_x,
        Orientation::Both => {
            if delta_x.abs() > delta_y.abs() {
                delta_x
            } else {
                delta_y
            }
        }
    }
}

fn raf(inner: &Rc<RefCell<ScrollInner>>, time_ms: f64) {
    let moved = {
        let mut state = inner.borrow_mut();
        if state.released {
            return;
        }
        let delta_ms = match state.last_time_ms {
            Some(last) => (time_ms - last).max(0.0),
            None => 0.0,
        };
        state.last_time_ms = Some(time_ms);
        state.step(delta_ms)
    };
    if moved {
        notify(inner);
    }
}

fn notify(inner: &Rc<RefCell<ScrollInner>>) {
    let (frame, listeners) = {
        let state = inner.borrow();
        (state.frame(), state.listeners.snapshot())
    };
    for (id, listener) in listeners {
        if !inner.borrow().listeners.contains(id) {
            continue;
        }
        (listener.borrow_mut())(&frame);
    }
}
