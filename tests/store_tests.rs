// Host-side tests for the progression store.

use recueil_core::{
    BackgroundMaterial, ContentItem, Field, InMemoryCatalog, ProgressionStore, StateChange,
    INTRO_STEP_FIRST, INTRO_STEP_NOT_STARTED,
};
use std::cell::RefCell;
use std::rc::Rc;

fn recorder(store: &ProgressionStore, fields: &[Field]) -> (Rc<RefCell<Vec<StateChange>>>, recueil_core::Registration) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let reg = store.subscribe(fields, move |change| sink.borrow_mut().push(change.clone()));
    (seen, reg)
}

fn poem(slug: &str) -> ContentItem {
    InMemoryCatalog::with_default_poems()
        .get(slug)
        .cloned()
        .expect("default poem")
}

#[test]
fn initial_state_is_loading_and_not_started() {
    let store = ProgressionStore::new();
    let s = store.snapshot();
    assert!(s.is_loading);
    assert_eq!(s.loading_progress, 0.0);
    assert!(!s.loading_complete);
    assert!(!s.is_ready);
    assert!(!s.has_started);
    assert_eq!(s.intro_step, INTRO_STEP_NOT_STARTED);
    assert!(s.current_content_item.is_none());
    assert!(s.catalog.is_empty());
    assert!(s.background_material.is_none());
}

#[test]
fn loading_complete_latches_once_progress_reaches_one() {
    let store = ProgressionStore::new();
    store.set_loading_progress(0.5);
    assert!(!store.loading_complete());
    store.set_loading_progress(1.0);
    assert!(store.loading_complete());
    // Going back down never clears the latch
    store.set_loading_progress(0.2);
    assert_eq!(store.loading_progress(), 0.2);
    assert!(store.loading_complete());
}

#[test]
fn out_of_range_progress_is_stored_as_given() {
    let store = ProgressionStore::new();
    store.set_loading_progress(-0.5);
    assert_eq!(store.loading_progress(), -0.5);
    assert!(!store.loading_complete());
    store.set_loading_progress(1.7);
    assert_eq!(store.loading_progress(), 1.7);
    assert!(store.loading_complete());
}

#[test]
fn finish_loading_is_idempotent() {
    let store = ProgressionStore::new();
    let (seen, _reg) = recorder(&store, &[]);
    store.finish_loading();
    store.finish_loading();
    assert!(!store.is_loading());
    assert!(store.is_ready());
    // Only the first call changed anything
    assert_eq!(
        *seen.borrow(),
        vec![StateChange::IsLoading(false), StateChange::IsReady(true)]
    );
}

#[test]
fn start_intro_sets_first_step_and_started() {
    let store = ProgressionStore::new();
    store.finish_loading();
    let (seen, _reg) = recorder(&store, &[Field::HasStarted, Field::IntroStep]);
    store.start_intro();
    assert!(store.has_started());
    assert_eq!(store.intro_step(), INTRO_STEP_FIRST);
    assert_eq!(
        *seen.borrow(),
        vec![
            StateChange::HasStarted(true),
            StateChange::IntroStep {
                previous: 0,
                current: 1
            }
        ]
    );
}

#[test]
fn set_intro_step_overwrites_without_clamping() {
    let store = ProgressionStore::new();
    store.set_intro_step(5);
    store.set_intro_step(2);
    assert_eq!(store.intro_step(), 2);
    store.set_intro_step(99);
    assert_eq!(store.intro_step(), 99);
    store.set_intro_step(-3);
    assert_eq!(store.intro_step(), -3);
}

#[test]
fn notifications_only_fire_on_change() {
    let store = ProgressionStore::new();
    let steps = Rc::new(RefCell::new(Vec::new()));
    let sink = steps.clone();
    let _reg = store.watch_intro_step(move |s| sink.borrow_mut().push(s));
    store.set_intro_step(3);
    store.set_intro_step(3);
    store.set_intro_step(4);
    assert_eq!(*steps.borrow(), vec![3, 4]);
}

#[test]
fn subscribers_only_see_requested_fields() {
    let store = ProgressionStore::new();
    let (seen, _reg) = recorder(&store, &[Field::IsReady]);
    store.set_loading_progress(0.4);
    store.set_intro_step(2);
    store.finish_loading();
    assert_eq!(*seen.borrow(), vec![StateChange::IsReady(true)]);
}

#[test]
fn released_subscription_stops_receiving() {
    let store = ProgressionStore::new();
    let (seen, mut reg) = recorder(&store, &[]);
    store.set_intro_step(1);
    reg.release();
    reg.release();
    store.set_intro_step(2);
    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(store.subscriber_count(), 0);
}

#[test]
fn dropping_registration_unsubscribes() {
    let store = ProgressionStore::new();
    {
        let _reg = store.watch_intro_step(|_| {});
        assert_eq!(store.subscriber_count(), 1);
    }
    assert_eq!(store.subscriber_count(), 0);
}

#[test]
fn changes_raised_by_subscribers_are_delivered_in_order() {
    let store = ProgressionStore::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    // Reacting to readiness by starting the intro nests a different action.
    let nested = store.clone();
    let _starter = store.subscribe(&[Field::IsReady], move |_| nested.start_intro());
    let sink = log.clone();
    let _all = store.subscribe(&[], move |change| sink.borrow_mut().push(change.field()));

    store.finish_loading();
    assert_eq!(
        *log.borrow(),
        vec![
            Field::IsLoading,
            Field::IsReady,
            Field::HasStarted,
            Field::IntroStep
        ]
    );
    assert_eq!(store.intro_step(), 1);
}

#[test]
fn reentrant_same_action_is_rejected() {
    let store = ProgressionStore::new();
    let inner = store.clone();
    let calls = Rc::new(RefCell::new(0));
    let counter = calls.clone();
    let _reg = store.watch_intro_step(move |step| {
        *counter.borrow_mut() += 1;
        // Ignored: set_intro_step is still on the stack
        inner.set_intro_step(step + 10);
    });
    store.set_intro_step(1);
    assert_eq!(store.intro_step(), 1);
    assert_eq!(*calls.borrow(), 1);
}

#[test]
fn queued_change_still_rejects_its_own_action() {
    let store = ProgressionStore::new();
    let inner = store.clone();
    let calls = Rc::new(RefCell::new(0));
    let counter = calls.clone();
    let _reg = store.watch_intro_step(move |step| {
        *counter.borrow_mut() += 1;
        if *counter.borrow() < 1000 {
            inner.set_intro_step(step + 1);
        }
    });
    store.start_intro();
    // 1 from start_intro, 2 from the first set_intro_step; the next one is rejected
    assert_eq!(*calls.borrow(), 2);
    assert_eq!(store.intro_step(), 2);
}

#[test]
fn subscriber_can_read_state_during_delivery() {
    let store = ProgressionStore::new();
    let reader = store.clone();
    let observed = Rc::new(RefCell::new(None));
    let sink = observed.clone();
    let _reg = store.subscribe(&[Field::IsReady], move |_| {
        *sink.borrow_mut() = Some((reader.is_loading(), reader.is_ready()));
    });
    store.finish_loading();
    assert_eq!(*observed.borrow(), Some((false, true)));
}

#[test]
fn current_content_item_set_and_cleared() {
    let store = ProgressionStore::new();
    let (seen, _reg) = recorder(&store, &[Field::CurrentContentItem]);
    let item = Rc::new(poem("unworried"));
    store.set_current_content_item(Some(item.clone()));
    store.set_current_content_item(Some(item.clone()));
    assert_eq!(
        store.current_content_item().map(|i| i.slug.clone()),
        Some("unworried".to_owned())
    );
    store.set_current_content_item(None);
    assert!(store.current_content_item().is_none());
    assert_eq!(seen.borrow().len(), 2);
}

#[test]
fn catalog_action_replaces_items() {
    let store = ProgressionStore::new();
    let (seen, _reg) = recorder(&store, &[Field::Catalog]);
    store.set_catalog(vec![poem("her"), poem("nightlight")]);
    assert_eq!(store.catalog().len(), 2);
    store.set_catalog(vec![poem("her"), poem("nightlight")]);
    assert_eq!(*seen.borrow(), vec![StateChange::Catalog(2)]);
}

#[test]
fn background_material_compares_by_identity() {
    let store = ProgressionStore::new();
    let (seen, _reg) = recorder(&store, &[Field::BackgroundMaterial]);
    let a = BackgroundMaterial::default().into_handle();
    let b = BackgroundMaterial::default().into_handle();
    store.set_background_material(Some(a.clone()));
    store.set_background_material(Some(a.clone()));
    store.set_background_material(Some(b.clone()));
    store.set_background_material(None);
    assert_eq!(seen.borrow().len(), 3);
    assert!(store.background_material().is_none());
}

#[test]
fn clones_share_state() {
    let store = ProgressionStore::new();
    let other = store.clone();
    other.set_intro_step(4);
    assert_eq!(store.intro_step(), 4);
}
