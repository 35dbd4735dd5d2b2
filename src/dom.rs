use crate::constants::*;
use recueil_core::{ContentItem, Orientation};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

/// An event listener that is removed again when dropped.
pub struct EventListener {
    target: web::EventTarget,
    event: &'static str,
    closure: Option<Closure<dyn FnMut(web::Event)>>,
}

impl EventListener {
    pub fn new(
        target: &web::EventTarget,
        event: &'static str,
        handler: impl FnMut(web::Event) + 'static,
    ) -> Option<Self> {
        Self::with_passive(target, event, true, handler)
    }

    /// `passive = false` is needed for handlers that call `prevent_default`
    /// on wheel and touch events.
    pub fn with_passive(
        target: &web::EventTarget,
        event: &'static str,
        passive: bool,
        handler: impl FnMut(web::Event) + 'static,
    ) -> Option<Self> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
        let options = web::AddEventListenerOptions::new();
        options.set_passive(passive);
        match target.add_event_listener_with_callback_and_add_event_listener_options(
            event,
            closure.as_ref().unchecked_ref(),
            &options,
        ) {
            Ok(()) => Some(Self {
                target: target.clone(),
                event,
                closure: Some(closure),
            }),
            Err(e) => {
                log::error!("[dom] addEventListener({}) failed: {:?}", event, e);
                None
            }
        }
    }

    pub fn remove(&mut self) {
        if let Some(closure) = self.closure.take() {
            _ = self
                .target
                .remove_event_listener_with_callback(self.event, closure.as_ref().unchecked_ref());
        }
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        self.remove();
    }
}

pub fn listen_click(
    document: &web::Document,
    element_id: &str,
    mut handler: impl FnMut() + 'static,
) -> Option<EventListener> {
    let el = document.get_element_by_id(element_id)?;
    EventListener::new(el.unchecked_ref(), "click", move |_| handler())
}

pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) {
    if let Some(w) = web::window() {
        let dpr = w.device_pixel_ratio();
        let rect = canvas.get_bounding_client_rect();
        let w_px = (rect.width() * dpr) as u32;
        let h_px = (rect.height() * dpr) as u32;
        canvas.set_width(w_px.max(1));
        canvas.set_height(h_px.max(1));
    }
}

/// Scrollable overflow of the document along `orientation`.
pub fn scroll_limit(orientation: Orientation) -> f64 {
    let Some(window) = web::window() else {
        return 0.0;
    };
    let horizontal = orientation == Orientation::Horizontal;
    let viewport = if horizontal {
        window.inner_width()
    } else {
        window.inner_height()
    };
    let viewport = viewport.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let content = window
        .document()
        .and_then(|d| d.document_element())
        .map(|el| {
            if horizontal {
                el.scroll_width() as f64
            } else {
                el.scroll_height() as f64
            }
        })
        .unwrap_or(0.0);
    (content - viewport).max(0.0)
}

/// Move the window to a smoothed scroll offset.
pub fn scroll_window(x: f64, y: f64) {
    if let Some(window) = web::window() {
        window.scroll_to_with_x_and_y(x, y);
    }
}

pub fn set_body_attribute(document: &web::Document, name: &str, value: &str) {
    if let Some(body) = document.body() {
        _ = body.set_attribute(name, value);
    }
}

pub fn set_root_css_var(document: &web::Document, name: &str, value: f64) {
    if let Some(root) = document
        .document_element()
        .and_then(|el| el.dyn_into::<web::HtmlElement>().ok())
    {
        _ = root.style().set_property(name, &format!("{:.4}", value));
    }
}

/// Render a poem (or clear the poem area) as a title plus one line per element.
pub fn render_poem(document: &web::Document, item: Option<&ContentItem>) {
    let Some(root) = document.get_element_by_id(POEM_ROOT_ID) else {
        return;
    };
    root.set_inner_html("");
    let Some(item) = item else {
        _ = root.set_attribute("data-slug", "");
        return;
    };
    _ = root.set_attribute("data-slug", &item.slug);
    if let Some(symbol) = &item.symbol {
        append_text(document, &root, "span", "poem-symbol", symbol);
    }
    append_text(document, &root, "h2", "poem-title", &item.title);
    for line in &item.lines {
        append_text(document, &root, "p", "poem-line", line);
    }
}

fn append_text(document: &web::Document, parent: &web::Element, tag: &str, class: &str, text: &str) {
    if let Ok(el) = document.create_element(tag) {
        el.set_class_name(class);
        el.set_text_content(Some(text));
        _ = parent.append_child(&el);
    }
}
