use crate::constants::{intro_command_for_key, next_intro_step, IntroCommand};
use crate::dom::EventListener;
use recueil_core::{ProgressionStore, INTRO_STEP_LAST};
use wasm_bindgen::JsCast;
use web_sys as web;

/// Apply a key press to the narrative. Returns true when the key was consumed.
///
/// Start is honoured only once the page is ready and the intro has not begun;
/// Advance only after it has.
pub fn handle_intro_key(key: &str, store: &ProgressionStore) -> bool {
    match intro_command_for_key(key) {
        Some(IntroCommand::Start) => {
            if store.is_ready() && !store.has_started() {
                log::info!("[keys] start intro");
                store.start_intro();
                true
            } else {
                false
            }
        }
        Some(IntroCommand::Advance) => {
            if !store.has_started() {
                return false;
            }
            let current = store.intro_step();
            let next = next_intro_step(current, INTRO_STEP_LAST);
            if next != current {
                store.set_intro_step(next);
            }
            true
        }
        None => false,
    }
}

pub fn wire_intro_keys(document: &web::Document, store: ProgressionStore) -> Option<EventListener> {
    EventListener::with_passive(document, "keydown", false, move |ev| {
        let Some(ev) = ev.dyn_ref::<web::KeyboardEvent>() else {
            return;
        };
        if ev.repeat() {
            return;
        }
        if handle_intro_key(&ev.key(), &store) {
            ev.prevent_default();
        }
    })
}
