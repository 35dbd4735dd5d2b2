use crate::dom::{window_document, EventListener};
use recueil_core::{AudioEngine, AudioError, AudioVoice, LoadOutcome, VoiceSource};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

/// Audio engine backed by a streamed `<audio>` element.
#[derive(Default)]
pub struct HtmlAudioEngine;

impl AudioEngine for HtmlAudioEngine {
    fn is_available(&self) -> bool {
        web::window().is_some() && web::HtmlAudioElement::new().is_ok()
    }

    fn load(
        &self,
        source: &VoiceSource,
        on_outcome: LoadOutcome,
    ) -> Result<Box<dyn AudioVoice>, AudioError> {
        web::window().ok_or(AudioError::Unavailable)?;
        let el = web::HtmlAudioElement::new().map_err(|e| AudioError::Load(format!("{:?}", e)))?;
        el.set_loop(source.looping);
        el.set_autoplay(source.autoplay);
        el.set_preload("auto");
        el.set_volume(source.initial_volume.clamp(0.0, 1.0) as f64);

        // canplaythrough and error race; whichever fires first reports.
        let outcome: Rc<RefCell<Option<LoadOutcome>>> = Rc::new(RefCell::new(Some(on_outcome)));
        let mut listeners = Vec::new();
        let ok = outcome.clone();
        listeners.extend(EventListener::new(&el, "canplaythrough", move |_| {
            let cb = ok.borrow_mut().take();
            if let Some(cb) = cb {
                cb(Ok(()));
            }
        }));
        let failed = outcome;
        let url = source.url.clone();
        listeners.extend(EventListener::new(&el, "error", move |_| {
            let cb = failed.borrow_mut().take();
            if let Some(cb) = cb {
                cb(Err(AudioError::Load(url.clone())));
            }
        }));

        let stopped = Rc::new(Cell::new(false));
        if source.autoplay {
            listeners.extend(wire_gesture_unlock(&el, &stopped));
        }
        el.set_src(&source.url);
        if source.autoplay {
            try_play(&el);
        }

        Ok(Box::new(HtmlAudioVoice {
            el,
            listeners,
            stopped,
        }))
    }
}

pub struct HtmlAudioVoice {
    el: web::HtmlAudioElement,
    listeners: Vec<EventListener>,
    stopped: Rc<Cell<bool>>,
}

impl AudioVoice for HtmlAudioVoice {
    fn volume(&self) -> f32 {
        self.el.volume() as f32
    }

    fn set_volume(&mut self, volume: f32) {
        self.el.set_volume(volume.clamp(0.0, 1.0) as f64);
    }

    fn set_rate(&mut self, rate: f32) {
        self.el.set_playback_rate(rate as f64);
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.stopped.set(true);
        self.el
            .pause()
            .map_err(|e| AudioError::Playback(format!("{:?}", e)))?;
        self.el.set_current_time(0.0);
        Ok(())
    }

    fn unload(&mut self) -> Result<(), AudioError> {
        self.listeners.clear();
        self.el
            .remove_attribute("src")
            .map_err(|e| AudioError::Release(format!("{:?}", e)))?;
        self.el.load();
        Ok(())
    }
}

fn try_play(el: &web::HtmlAudioElement) {
    match el.play() {
        Ok(promise) => spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::info!("[audio] autoplay deferred until a user gesture: {:?}", e);
            }
        }),
        Err(e) => log::warn!("[audio] play() failed: {:?}", e),
    }
}

// Browsers refuse autoplay before the first gesture; retry on any gesture
// while the voice is paused and not explicitly stopped.
fn wire_gesture_unlock(el: &web::HtmlAudioElement, stopped: &Rc<Cell<bool>>) -> Vec<EventListener> {
    let Some(document) = window_document() else {
        return Vec::new();
    };
    ["pointerdown", "keydown", "touchstart"]
        .into_iter()
        .filter_map(|event| {
            let el = el.clone();
            let stopped = stopped.clone();
            EventListener::new(&document, event, move |_| {
                if !stopped.get() && el.paused() {
                    try_play(&el);
                }
            })
        })
        .collect()
}
