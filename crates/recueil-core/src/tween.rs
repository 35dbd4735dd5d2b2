//! Per-parameter interpolation advanced once per frame tick.
//!
//! A tween never cancels another: a caller that wants to retarget simply
//! builds a new one starting from the value it currently reads.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    /// `min(1, 1.001 - 2^(-10t))`: reaches 1.0 slightly before `t = 1`.
    #[default]
    ExpoOut,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::ExpoOut => expo_out(t),
        }
    }
}

#[inline]
pub fn expo_out(t: f64) -> f64 {
    (1.001 - 2f64.powf(-10.0 * t)).min(1.0)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tween {
    pub from: f64,
    pub to: f64,
    pub duration_ms: f64,
    pub easing: Easing,
    elapsed_ms: f64,
}

impl Tween {
    pub fn new(from: f64, to: f64, duration_ms: f64, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration_ms,
            easing,
            elapsed_ms: 0.0,
        }
    }

    pub fn linear(from: f64, to: f64, duration_ms: f64) -> Self {
        Self::new(from, to, duration_ms, Easing::Linear)
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn progress(&self) -> f64 {
        if self.duration_ms <= 0.0 {
            1.0
        } else {
            (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
        }
    }

    pub fn value(&self) -> f64 {
        let p = self.progress();
        if p >= 1.0 {
            return self.to;
        }
        self.from + (self.to - self.from) * self.easing.apply(p)
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Move forward by `dt_ms` and return the new value.
    pub fn advance(&mut self, dt_ms: f64) -> f64 {
        if dt_ms > 0.0 {
            self.elapsed_ms += dt_ms;
        }
        self.value()
    }
}
