#![cfg(target_arch = "wasm32")]
use recueil_core::PresentationConfig;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use web_sys as web;

mod audio;
mod constants;
mod content;
mod dom;
mod events;
mod frame;
mod overlay;
mod presentation;
mod render;
mod visual;

use presentation::Presentation;

thread_local! {
    static PRESENTATION: RefCell<Option<Presentation>> = const { RefCell::new(None) };
    static PAGEHIDE: RefCell<Option<dom::EventListener>> = const { RefCell::new(None) };
}

/// Config comes from an optional JSON `<script>`; anything unreadable means defaults.
fn read_config(document: &web::Document) -> PresentationConfig {
    let Some(text) = document
        .get_element_by_id(constants::CONFIG_SCRIPT_ID)
        .and_then(|el| el.text_content())
    else {
        return PresentationConfig::default();
    };
    match PresentationConfig::from_json(&text) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("[dom] ignoring malformed config: {}", e);
            PresentationConfig::default()
        }
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    _ = console_log::init_with_level(log::Level::Info);

    let window = web::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let config = read_config(&document);

    let presentation = Presentation::mount(&window, &document, config)
        .map_err(|e| JsValue::from_str(&format!("{:#}", e)))?;
    PRESENTATION.with(|slot| {
        slot.borrow_mut().replace(presentation);
    });

    let pagehide = dom::EventListener::new(&window, "pagehide", |_| unmount());
    PAGEHIDE.with(|slot| *slot.borrow_mut() = pagehide);
    Ok(())
}

/// Tear the page down. Safe to call more than once.
#[wasm_bindgen]
pub fn unmount() {
    let presentation = PRESENTATION.with(|slot| slot.borrow_mut().take());
    if presentation.is_some() {
        log::info!("[dom] unmounting presentation");
    }
    drop(presentation);
}

/// Current narrative step, for page scripts.
#[wasm_bindgen(js_name = introStep)]
pub fn intro_step() -> i32 {
    PRESENTATION.with(|slot| {
        slot.borrow()
            .as_ref()
            .map(|p| p.store().intro_step())
            .unwrap_or(0)
    })
}
