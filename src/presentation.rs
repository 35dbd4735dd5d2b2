use crate::audio::HtmlAudioEngine;
use crate::constants::*;
use crate::content::lookup_for;
use crate::dom::{self, EventListener};
use crate::events::{self, ScrollWiring};
use crate::frame::{start_loop, AnimationLoop};
use crate::overlay;
use crate::render::GpuState;
use crate::visual::VisualMapper;
use recueil_core::{
    load_catalog, AmbientAudio, BackgroundMaterial, ContentLookup, FrameTicker, Liveness,
    MaterialHandle, PresentationConfig, ProgressionStore, Registration, ScrollWorld, StateChange,
};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

type RendererSlot = Rc<RefCell<Option<GpuState>>>;

/// Everything mounted on the page. Dropping it tears the page down.
pub struct Presentation {
    store: ProgressionStore,
    animation: AnimationLoop,
    scroll: Rc<RefCell<ScrollWorld>>,
    audio: AmbientAudio,
    visual: Option<Rc<VisualMapper>>,
    renderer: RendererSlot,
    registrations: Vec<Registration>,
    listeners: Vec<EventListener>,
    scroll_wiring: Option<ScrollWiring>,
    alive: Liveness,
}

impl Presentation {
    pub fn mount(
        window: &web::Window,
        document: &web::Document,
        config: PresentationConfig,
    ) -> anyhow::Result<Self> {
        let canvas: web::HtmlCanvasElement = document
            .get_element_by_id(CANVAS_ID)
            .ok_or_else(|| anyhow::anyhow!("missing #{}", CANVAS_ID))?
            .dyn_into()
            .map_err(|_| anyhow::anyhow!("#{} is not a canvas", CANVAS_ID))?;
        dom::sync_canvas_backing_size(&canvas);

        let store = ProgressionStore::new();
        let ticker = FrameTicker::new(config.ticker.clone());
        let mut registrations = Vec::new();

        registrations.push(reflect_state(document.clone(), &store));

        let scroll = Rc::new(RefCell::new(ScrollWorld::mount(&ticker, config.scroll.clone())));
        let audio = AmbientAudio::mount(&HtmlAudioEngine, &store, &ticker, config.audio.clone());

        let material: MaterialHandle = BackgroundMaterial::default().into_handle();
        store.set_background_material(Some(material.clone()));
        let visual = Rc::new(VisualMapper::mount(
            &store,
            &ticker,
            material,
            config.visual.clone(),
            rand::random::<f32>(),
        ));
        visual.set_resolution(canvas.width(), canvas.height());

        {
            let document = document.clone();
            let visual = Rc::downgrade(&visual);
            let options = config.scroll.clone();
            registrations.push(scroll.borrow().on_scroll(move |frame| {
                if let Some((x, y)) = options.window_offset(frame.scroll) {
                    dom::scroll_window(x, y);
                }
                dom::set_root_css_var(&document, CSS_VAR_SCROLL_PROGRESS, frame.progress);
                if let Some(visual) = visual.upgrade() {
                    visual.set_scroll_progress(frame.progress);
                }
            }));
        }

        let renderer: RendererSlot = Rc::new(RefCell::new(None));
        registrations.push(register_render(&ticker, &canvas, &renderer, &visual));

        let lookup: Rc<dyn ContentLookup> = Rc::from(lookup_for(&config.content));
        let alive = Liveness::default();

        let mut listeners = Vec::new();
        {
            let store = store.clone();
            listeners.extend(dom::listen_click(document, START_BUTTON_ID, move || {
                if store.is_ready() && !store.has_started() {
                    store.start_intro();
                }
            }));
        }
        listeners.extend(events::wire_intro_keys(document, store.clone()));
        {
            let store = store.clone();
            let lookup = lookup.clone();
            let alive = alive.clone();
            listeners.extend(EventListener::new(window, "hashchange", move |_| {
                route_from_hash(&store, &lookup, &alive);
            }));
        }
        let scroll_wiring = Some(events::wire_scroll_input(window, &scroll));

        let animation = start_loop(ticker);

        spawn_local(load_page(
            store.clone(),
            lookup,
            canvas,
            Rc::downgrade(&renderer),
            alive.clone(),
        ));

        log::info!("[dom] presentation mounted");
        Ok(Self {
            store,
            animation,
            scroll,
            audio,
            visual: Some(visual),
            renderer,
            registrations,
            listeners,
            scroll_wiring,
            alive,
        })
    }

    pub fn store(&self) -> &ProgressionStore {
        &self.store
    }

    /// Stop the loop and release every subscription, listener and resource.
    pub fn release(&mut self) {
        self.alive.end();
        self.animation.stop();
        self.listeners.clear();
        self.scroll_wiring = None;
        for registration in self.registrations.iter_mut() {
            registration.release();
        }
        self.scroll.borrow_mut().release();
        self.audio.release();
        // closures only hold weak references, so this drops the mapper
        self.visual.take();
        self.renderer.borrow_mut().take();
        self.store.set_background_material(None);
    }
}

impl Drop for Presentation {
    fn drop(&mut self) {
        self.release();
    }
}

/// Mirror store state onto the overlays, `<body>` attributes and the poem area.
fn reflect_state(document: web::Document, store: &ProgressionStore) -> Registration {
    store.subscribe(&[], move |change| match change {
        StateChange::LoadingProgress(progress) => {
            overlay::update_loading(&document, *progress);
            dom::set_root_css_var(&document, CSS_VAR_LOADING_PROGRESS, *progress);
        }
        StateChange::IsReady(true) => {
            overlay::show_ready(&document);
            dom::set_body_attribute(&document, ATTR_READY, "true");
        }
        StateChange::HasStarted(true) => {
            overlay::hide_start(&document);
            dom::set_body_attribute(&document, ATTR_STARTED, "true");
        }
        StateChange::IntroStep { current, .. } => {
            dom::set_body_attribute(&document, ATTR_INTRO_STEP, &current.to_string());
        }
        StateChange::CurrentContentItem(item) => {
            dom::render_poem(&document, item.as_deref());
        }
        _ => {}
    })
}

fn register_render(
    ticker: &FrameTicker,
    canvas: &web::HtmlCanvasElement,
    renderer: &RendererSlot,
    visual: &Rc<VisualMapper>,
) -> Registration {
    let canvas = canvas.clone();
    let renderer = Rc::downgrade(renderer);
    let visual = Rc::downgrade(visual);
    ticker.register(move |_| {
        let (Some(renderer), Some(visual)) = (renderer.upgrade(), visual.upgrade()) else {
            return;
        };
        let mut slot = renderer.borrow_mut();
        let Some(gpu) = slot.as_mut() else {
            return;
        };
        dom::sync_canvas_backing_size(&canvas);
        let (w, h) = (canvas.width(), canvas.height());
        if (w, h) != gpu.size() {
            gpu.resize_if_needed(w, h);
            visual.set_resolution(w, h);
        }
        match gpu.render(&visual.material()) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu.recover(),
            Err(e) => log::warn!("[visual] frame skipped: {:?}", e),
        }
    })
}

async fn load_page(
    store: ProgressionStore,
    lookup: Rc<dyn ContentLookup>,
    canvas: web::HtmlCanvasElement,
    renderer: Weak<RefCell<Option<GpuState>>>,
    alive: Liveness,
) {
    if !load_catalog(&*lookup, &store, &alive, LOADING_AFTER_CATALOG).await {
        return;
    }
    route_from_hash(&store, &lookup, &alive);

    let gpu = GpuState::new(&canvas).await;
    let Some(renderer) = renderer.upgrade().filter(|_| alive.is_alive()) else {
        log::debug!("[visual] renderer ready after unmount; dropped");
        return;
    };
    match gpu {
        Ok(gpu) => {
            *renderer.borrow_mut() = Some(gpu);
        }
        Err(e) => log::warn!("[visual] background disabled: {:?}", e),
    }
    store.set_loading_progress(LOADING_AFTER_RENDERER);
    store.finish_loading();
}

fn route_from_hash(store: &ProgressionStore, lookup: &Rc<dyn ContentLookup>, alive: &Liveness) {
    let hash = web::window()
        .and_then(|w| w.location().hash().ok())
        .unwrap_or_default();
    let Some(slug) = slug_from_hash(&hash).map(str::to_owned) else {
        return;
    };
    if let Some(item) = store.catalog().into_iter().find(|i| i.slug == slug) {
        store.set_current_content_item(Some(item));
        return;
    }
    let store = store.clone();
    let lookup = lookup.clone();
    let alive = alive.clone();
    spawn_local(async move {
        let result = lookup.fetch_by_slug(&slug).await;
        if !alive.is_alive() {
            return;
        }
        match result {
            Ok(Some(item)) => store.set_current_content_item(Some(Rc::new(item))),
            Ok(None) => {
                log::warn!("[content] no poem with slug {:?}", slug);
                store.set_current_content_item(None);
            }
            Err(e) => log::error!("[content] lookup for {:?} failed: {}", slug, e),
        }
    });
}
