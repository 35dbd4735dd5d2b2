// Host-side tests for the visual mapper and colour parsing.
// The main crate is wasm-only, so we include the pure-Rust module directly.

#![allow(dead_code)]
mod visual {
    include!("../src/visual.rs");
}

use glam::Vec3;
use recueil_core::{
    BackgroundMaterial, ContentItem, FrameTicker, InMemoryCatalog, MaterialHandle, ParticleKind,
    ProgressionStore, VisualParams,
};
use std::rc::Rc;
use visual::*;

fn close(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < 1e-4
}

fn poem(slug: &str) -> Rc<ContentItem> {
    Rc::new(
        InMemoryCatalog::with_default_poems()
            .get(slug)
            .cloned()
            .expect("default poem"),
    )
}

struct Rig {
    store: ProgressionStore,
    ticker: FrameTicker,
    material: MaterialHandle,
    mapper: VisualMapper,
}

fn rig() -> Rig {
    let store = ProgressionStore::new();
    let ticker = FrameTicker::default();
    let material = BackgroundMaterial::default().into_handle();
    let mapper = VisualMapper::mount(
        &store,
        &ticker,
        material.clone(),
        VisualParams::default(),
        0.25,
    );
    ticker.tick(0.0);
    Rig {
        store,
        ticker,
        material,
        mapper,
    }
}

#[test]
fn parses_short_and_long_hex() {
    assert_eq!(parse_color("#fff"), Some(Vec3::ONE));
    assert_eq!(parse_color("#000000"), Some(Vec3::ZERO));
    assert_eq!(parse_color("#ffffff"), parse_color("#FFF"));
}

#[test]
fn converts_srgb_to_linear() {
    let grey = parse_color("#808080").unwrap();
    assert!((grey.x - 0.2158605).abs() < 1e-4);
    let red = parse_color("#ff0000").unwrap();
    assert!(close(red, Vec3::new(1.0, 0.0, 0.0)));
}

#[test]
fn rejects_malformed_tokens() {
    for token in ["fff", "#ff", "#1234", "#gggggg", "", "#", "red", "#12345g"] {
        assert_eq!(parse_color(token), None, "{token:?}");
    }
}

#[test]
fn mount_writes_default_theme_and_seed() {
    let r = rig();
    let m = r.material.borrow();
    let u = m.uniforms();
    assert_eq!(u.seed, 0.25);
    assert_eq!(u.intro_step, 0.0);
    assert_eq!(u.particle_kind, ParticleKind::Dust.shader_index());
    assert!(close(Vec3::from_slice(&u.primary[..3]), ThemeTarget::default().primary));
}

#[test]
fn content_change_crossfades_theme() {
    let r = rig();
    let item = poem("i-used-to-know-you");
    let target = ThemeTarget::from_theme(&item.theme, &ThemeTarget::default());
    r.store.set_current_content_item(Some(item));

    // Particle kind switches at once, colours fade
    assert_eq!(
        r.material.borrow().uniforms().particle_kind,
        ParticleKind::Leaf.shader_index()
    );
    assert!(r.mapper.is_fading());
    r.ticker.tick(300.0);
    let mid = r.mapper.current_theme();
    assert_ne!(mid, target);
    assert_ne!(mid, ThemeTarget::default());

    r.ticker.tick(1500.0);
    assert!(!r.mapper.is_fading());
    assert_eq!(r.mapper.current_theme(), target);
    let u = *r.material.borrow().uniforms();
    assert_eq!(u.primary, target.primary.extend(1.0).to_array());
    assert_eq!(u.turbulence, 0.8);
}

#[test]
fn clearing_content_fades_back_to_defaults() {
    let r = rig();
    r.store.set_current_content_item(Some(poem("nightlight")));
    r.ticker.tick(2000.0);
    r.store.set_current_content_item(None);
    r.ticker.tick(4000.0);
    assert_eq!(r.mapper.current_theme(), ThemeTarget::default());
}

#[test]
fn bad_colour_keeps_previous_colour() {
    let r = rig();
    let mut item = (*poem("her")).clone();
    item.theme.primary_color = "rgb(1,2,3)".into();
    let previous = r.mapper.current_theme();
    r.store.set_current_content_item(Some(Rc::new(item.clone())));
    r.ticker.tick(2000.0);
    let now = r.mapper.current_theme();
    assert_eq!(now.primary, previous.primary);
    assert_eq!(now.secondary, parse_color(&item.theme.secondary_color).unwrap());
}

#[test]
fn intro_step_and_time_reach_the_material() {
    let r = rig();
    r.store.set_intro_step(3);
    r.ticker.tick(500.0);
    let u = *r.material.borrow().uniforms();
    assert_eq!(u.intro_step, 3.0);
    assert_eq!(u.time, 0.5);
}

#[test]
fn scroll_progress_and_resolution_are_written() {
    let r = rig();
    r.mapper.set_scroll_progress(0.4);
    r.mapper.set_resolution(800, 0);
    let u = *r.material.borrow().uniforms();
    assert!((u.scroll_progress - 0.4).abs() < 1e-6);
    assert_eq!(u.resolution, [800.0, 1.0]);
    r.mapper.set_scroll_progress(3.0);
    assert_eq!(r.material.borrow().uniforms().scroll_progress, 1.0);
}

#[test]
fn material_is_marked_dirty_by_updates() {
    let r = rig();
    assert!(r.material.borrow_mut().take_dirty().is_some());
    assert!(r.material.borrow_mut().take_dirty().is_none());
    r.ticker.tick(16.0);
    assert!(r.material.borrow().is_dirty());
}

#[test]
fn released_mapper_stops_following() {
    let mut r = rig();
    r.mapper.release();
    r.mapper.release();
    assert_eq!(r.store.subscriber_count(), 0);
    assert_eq!(r.ticker.registered_count(), 0);
    r.store.set_intro_step(5);
    r.ticker.tick(1000.0);
    let u = *r.material.borrow().uniforms();
    assert_eq!(u.intro_step, 0.0);
    assert_eq!(u.time, 0.0);
}
