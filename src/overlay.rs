use crate::constants::*;
use web_sys as web;

#[inline]
pub fn show(document: &web::Document, id: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        _ = el.class_list().remove_1("hidden");
        // fallback for environments without CSS class
        _ = el.set_attribute("style", "");
    }
}

#[inline]
pub fn hide(document: &web::Document, id: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        _ = el.class_list().add_1("hidden");
        // fallback
        _ = el.set_attribute("style", "display:none");
    }
}

/// Reflect loading progress on the loading bar; values outside [0, 1] are
/// shown clamped but stored as given.
pub fn update_loading(document: &web::Document, progress: f64) {
    if let Some(el) = document.get_element_by_id(LOADING_BAR_ID) {
        let pct = (progress.clamp(0.0, 1.0) * 100.0).round();
        _ = el.set_attribute("style", &format!("width:{}%", pct));
    }
}

/// Swap the loading overlay for the start overlay.
pub fn show_ready(document: &web::Document) {
    hide(document, LOADING_OVERLAY_ID);
    show(document, START_OVERLAY_ID);
}

pub fn hide_start(document: &web::Document) {
    hide(document, START_OVERLAY_ID);
}
