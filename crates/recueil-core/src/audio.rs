//! Ambient audio mapper: one looping voice whose volume and playback rate
//! follow the narrative step.
//!
//! Voice lifecycle: `Uninitialized -> Loading -> Playing -> Released`.
//! Audio is an enhancement: every failure here is logged and contained, the
//! narrative keeps progressing without sound.

use crate::constants::{
    AMBIENT_FADE_IN_MS, AMBIENT_FADE_IN_VOLUME, AMBIENT_FALLBACK_VOLUME, AMBIENT_RATE_BASE,
    AMBIENT_RATE_PER_STEP, AMBIENT_SOURCE_URL, AMBIENT_STEP_FADE_MS, AMBIENT_VOLUME_TABLE,
};
use crate::error::AudioError;
use crate::registration::Registration;
use crate::store::ProgressionStore;
use crate::ticker::{FrameTicker, Tick};
use crate::tween::Tween;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientAudioParams {
    pub source_url: String,
    pub fade_in_ms: f64,
    pub fade_in_volume: f32,
    pub step_fade_ms: f64,
    pub volume_table: Vec<f32>,
    pub fallback_volume: f32,
    pub rate_base: f32,
    pub rate_per_step: f32,
}

impl Default for AmbientAudioParams {
    fn default() -> Self {
        Self {
            source_url: AMBIENT_SOURCE_URL.to_owned(),
            fade_in_ms: AMBIENT_FADE_IN_MS,
            fade_in_volume: AMBIENT_FADE_IN_VOLUME,
            step_fade_ms: AMBIENT_STEP_FADE_MS,
            volume_table: AMBIENT_VOLUME_TABLE.to_vec(),
            fallback_volume: AMBIENT_FALLBACK_VOLUME,
            rate_base: AMBIENT_RATE_BASE,
            rate_per_step: AMBIENT_RATE_PER_STEP,
        }
    }
}

/// Target volume for `step`; steps outside the table use the fallback.
pub fn volume_for_step(params: &AmbientAudioParams, step: i32) -> f32 {
    usize::try_from(step)
        .ok()
        .and_then(|i| params.volume_table.get(i).copied())
        .unwrap_or(params.fallback_volume)
}

/// Playback rate for `step`: linear in the step, unclamped.
pub fn rate_for_step(params: &AmbientAudioParams, step: i32) -> f32 {
    params.rate_base + step as f32 * params.rate_per_step
}

/// What to load and how to start it.
#[derive(Clone, Debug, PartialEq)]
pub struct VoiceSource {
    pub url: String,
    pub looping: bool,
    pub autoplay: bool,
    pub initial_volume: f32,
}

/// Runtime controls of a loaded (or loading) voice.
pub trait AudioVoice {
    fn volume(&self) -> f32;
    fn set_volume(&mut self, volume: f32);
    fn set_rate(&mut self, rate: f32);
    fn stop(&mut self) -> Result<(), AudioError>;
    fn unload(&mut self) -> Result<(), AudioError>;
}

/// Called exactly once with the outcome of an asynchronous load.
pub type LoadOutcome = Box<dyn FnOnce(Result<(), AudioError>)>;

/// Platform audio: creates voices and reports when their source is ready.
pub trait AudioEngine {
    /// False when there is no audio-capable execution context.
    fn is_available(&self) -> bool;
    fn load(
        &self,
        source: &VoiceSource,
        on_outcome: LoadOutcome,
    ) -> Result<Box<dyn AudioVoice>, AudioError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoiceState {
    Uninitialized,
    Loading,
    Playing,
    Released,
}

struct VoiceInner {
    params: AmbientAudioParams,
    state: VoiceState,
    voice: Option<Box<dyn AudioVoice>>,
    fade: Option<Tween>,
    pending_step: Option<i32>,
}

impl VoiceInner {
    fn fade(&mut self, from: f32, to: f32, duration_ms: f64) {
        let tween = Tween::linear(from as f64, to as f64, duration_ms);
        if let Some(voice) = self.voice.as_mut() {
            voice.set_volume(tween.value() as f32);
        }
        self.fade = (!tween.is_finished()).then_some(tween);
    }

    fn on_loaded(&mut self, outcome: Result<(), AudioError>) {
        if self.state != VoiceState::Loading {
            return;
        }
        match outcome {
            Ok(()) => {
                self.state = VoiceState::Playing;
                if let Some(step) = self.pending_step.take() {
                    let rate = rate_for_step(&self.params, step);
                    if let Some(voice) = self.voice.as_mut() {
                        voice.set_rate(rate);
                    }
                }
                let target = self.params.fade_in_volume;
                let duration = self.params.fade_in_ms;
                self.fade(0.0, target, duration);
            }
            Err(e) => {
                log::warn!("[audio] load error: {}", e);
                // Inert for the rest of the session.
                self.state = VoiceState::Uninitialized;
                self.voice = None;
                self.fade = None;
            }
        }
    }

    fn on_step(&mut self, step: i32) {
        match self.state {
            VoiceState::Loading => self.pending_step = Some(step),
            VoiceState::Playing => {
                let Some(current) = self.voice.as_ref().map(|v| v.volume()) else {
                    return;
                };
                let target = volume_for_step(&self.params, step);
                let duration = self.params.step_fade_ms;
                // Starts from the volume heard now, superseding any running fade.
                self.fade(current, target, duration);
                let rate = rate_for_step(&self.params, step);
                if let Some(voice) = self.voice.as_mut() {
                    voice.set_rate(rate);
                }
            }
            VoiceState::Uninitialized | VoiceState::Released => {}
        }
    }

    fn advance(&mut self, delta_ms: f64) {
        let Some(tween) = self.fade.as_mut() else {
            return;
        };
        let value = tween.advance(delta_ms) as f32;
        let finished = tween.is_finished();
        if let Some(voice) = self.voice.as_mut() {
            voice.set_volume(value);
        }
        if finished {
            self.fade = None;
        }
    }

    fn release(&mut self) {
        if self.state == VoiceState::Released {
            return;
        }
        self.state = VoiceState::Released;
        self.fade = None;
        if let Some(mut voice) = self.voice.take() {
            if let Err(e) = voice.stop() {
                log::debug!("[audio] stop during release ignored: {}", e);
            }
            if let Err(e) = voice.unload() {
                log::debug!("[audio] unload during release ignored: {}", e);
            }
        }
    }
}

/// The mounted ambient mapper. Dropping it releases the voice.
pub struct AmbientAudio {
    inner: Rc<RefCell<VoiceInner>>,
    step_watch: Registration,
    ticker_registration: Registration,
}

impl AmbientAudio {
    /// Start loading the ambient voice and begin following `store`'s step.
    pub fn mount(
        engine: &dyn AudioEngine,
        store: &ProgressionStore,
        ticker: &FrameTicker,
        params: AmbientAudioParams,
    ) -> Self {
        let inner = Rc::new(RefCell::new(VoiceInner {
            params,
            state: VoiceState::Uninitialized,
            voice: None,
            fade: None,
            pending_step: None,
        }));

        if !engine.is_available() {
            log::info!("[audio] no audio context; ambient voice disabled");
            return Self::inert(inner);
        }

        let source = VoiceSource {
            url: inner.borrow().params.source_url.clone(),
            looping: true,
            autoplay: true,
            initial_volume: 0.0,
        };
        inner.borrow_mut().state = VoiceState::Loading;
        let on_outcome = load_callback(Rc::downgrade(&inner));
        match engine.load(&source, on_outcome) {
            Ok(voice) => {
                let mut state = inner.borrow_mut();
                // The engine may already have reported failure synchronously.
                if state.state == VoiceState::Loading || state.state == VoiceState::Playing {
                    state.voice = Some(voice);
                }
            }
            Err(e) => {
                log::error!("[audio] voice initialization failed: {}", e);
                inner.borrow_mut().state = VoiceState::Uninitialized;
                return Self::inert(inner);
            }
        }

        let weak = Rc::downgrade(&inner);
        let step_watch = store.watch_intro_step(move |step| {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().on_step(step);
            }
        });
        let weak = Rc::downgrade(&inner);
        let ticker_registration = ticker.register(move |tick: &Tick| {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().advance(tick.delta_ms);
            }
        });

        Self {
            inner,
            step_watch,
            ticker_registration,
        }
    }

    fn inert(inner: Rc<RefCell<VoiceInner>>) -> Self {
        Self {
            inner,
            step_watch: Registration::inert(),
            ticker_registration: Registration::inert(),
        }
    }

    pub fn state(&self) -> VoiceState {
        self.inner.borrow().state
    }

    pub fn params(&self) -> AmbientAudioParams {
        self.inner.borrow().params.clone()
    }

    pub fn is_fading(&self) -> bool {
        self.inner.borrow().fade.is_some()
    }

    /// Fade the voice from `from` to `to` over `duration_ms`, replacing any
    /// fade in progress. No-op unless playing.
    pub fn fade(&self, from: f32, to: f32, duration_ms: f64) {
        let mut inner = self.inner.borrow_mut();
        if inner.state == VoiceState::Playing {
            inner.fade(from, to, duration_ms);
        }
    }

    /// Stop and unload the voice. Failures are swallowed; safe to repeat.
    pub fn release(&mut self) {
        self.step_watch.release();
        self.ticker_registration.release();
        self.inner.borrow_mut().release();
    }
}

impl Drop for AmbientAudio {
    fn drop(&mut self) {
        self.release();
    }
}

fn load_callback(weak: Weak<RefCell<VoiceInner>>) -> LoadOutcome {
    Box::new(move |outcome| {
        if let Some(inner) = weak.upgrade() {
            inner.borrow_mut().on_loaded(outcome);
        }
    })
}
