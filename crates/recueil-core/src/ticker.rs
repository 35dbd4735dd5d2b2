//! Frame ticker: the per-animation-frame clock shared by every time-based subsystem.
//!
//! The platform (a `requestAnimationFrame` loop on the web, a plain loop in
//! tests) calls [`FrameTicker::tick`] with a wall-clock timestamp. Registered
//! callbacks receive the ticker's own monotonic time plus the elapsed delta.

use crate::constants::{TICKER_ADJUSTED_LAG_MS, TICKER_LAG_THRESHOLD_MS};
use crate::registration::{Registration, Registry};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum LagSmoothing {
    /// Raw elapsed time is always reported.
    #[default]
    Disabled,
    /// A frame gap longer than `threshold_ms` is reported as `adjusted_lag_ms`.
    Enabled {
        threshold_ms: f64,
        adjusted_lag_ms: f64,
    },
}

impl LagSmoothing {
    pub fn standard() -> Self {
        LagSmoothing::Enabled {
            threshold_ms: TICKER_LAG_THRESHOLD_MS,
            adjusted_lag_ms: TICKER_ADJUSTED_LAG_MS,
        }
    }

    fn smooth(self, elapsed_ms: f64) -> f64 {
        match self {
            LagSmoothing::Disabled => elapsed_ms,
            LagSmoothing::Enabled {
                threshold_ms,
                adjusted_lag_ms,
            } if elapsed_ms > threshold_ms => adjusted_lag_ms,
            LagSmoothing::Enabled { .. } => elapsed_ms,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickerOptions {
    pub lag_smoothing: LagSmoothing,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tick {
    /// Ticker time in milliseconds; 0 on the first tick.
    pub time_ms: f64,
    pub delta_ms: f64,
    pub frame: u64,
}

type TickCallback = dyn FnMut(&Tick);

struct TickerInner {
    callbacks: Registry<TickCallback>,
    lag_smoothing: LagSmoothing,
    last_now_ms: Option<f64>,
    time_ms: f64,
    frame: u64,
}

/// Cloneable handle; all clones drive the same clock.
#[derive(Clone)]
pub struct FrameTicker {
    inner: Rc<RefCell<TickerInner>>,
}

impl Default for FrameTicker {
    fn default() -> Self {
        Self::new(TickerOptions::default())
    }
}

impl FrameTicker {
    pub fn new(options: TickerOptions) -> Self {
        Self {
            inner: Rc::new(RefCell::new(TickerInner {
                callbacks: Registry::default(),
                lag_smoothing: options.lag_smoothing,
                last_now_ms: None,
                time_ms: 0.0,
                frame: 0,
            })),
        }
    }

    pub fn set_lag_smoothing(&self, lag_smoothing: LagSmoothing) {
        self.inner.borrow_mut().lag_smoothing = lag_smoothing;
    }

    pub fn lag_smoothing(&self) -> LagSmoothing {
        self.inner.borrow().lag_smoothing
    }

    pub fn time_ms(&self) -> f64 {
        self.inner.borrow().time_ms
    }

    pub fn registered_count(&self) -> usize {
        self.inner.borrow().callbacks.len()
    }

    /// Register a per-frame callback. Takes effect from the next tick.
    pub fn register(&self, callback: impl FnMut(&Tick) + 'static) -> Registration {
        let entry: Rc<RefCell<TickCallback>> = Rc::new(RefCell::new(callback));
        let id = self.inner.borrow_mut().callbacks.insert(entry);
        let weak = Rc::downgrade(&self.inner);
        Registration::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().callbacks.remove(id);
            }
        })
    }

    /// Advance the clock to `now_ms` and run every registered callback once.
    pub fn tick(&self, now_ms: f64) {
        let (tick, callbacks) = {
            let mut inner = self.inner.borrow_mut();
            let raw = match inner.last_now_ms {
                Some(last) => (now_ms - last).max(0.0),
                None => 0.0,
            };
            inner.last_now_ms = Some(now_ms);
            let delta_ms = inner.lag_smoothing.smooth(raw);
            inner.time_ms += delta_ms;
            inner.frame += 1;
            let tick = Tick {
                time_ms: inner.time_ms,
                delta_ms,
                frame: inner.frame,
            };
            (tick, inner.callbacks.snapshot())
        };
        for (id, callback) in callbacks {
            // A callback released by an earlier one in this same tick is skipped.
            if !self.inner.borrow().callbacks.contains(id) {
                continue;
            }
            (callback.borrow_mut())(&tick);
        }
    }
}
