//! Progression store: the single source of truth for the presentation timeline.
//!
//! Pure data plus transition actions. Observers subscribe to a set of fields
//! and are told about every change, synchronously and in mutation order.

use crate::constants::{INTRO_STEP_FIRST, INTRO_STEP_NOT_STARTED};
use crate::content::ContentItem;
use crate::material::MaterialHandle;
use crate::registration::{Registration, Registry};
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Clone, Debug)]
pub struct ProgressionState {
    pub is_loading: bool,
    pub loading_progress: f64,
    pub loading_complete: bool,
    pub is_ready: bool,
    pub has_started: bool,
    pub intro_step: i32,
    pub current_content_item: Option<Rc<ContentItem>>,
    pub catalog: Vec<Rc<ContentItem>>,
    pub background_material: Option<MaterialHandle>,
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self {
            is_loading: true,
            loading_progress: 0.0,
            loading_complete: false,
            is_ready: false,
            has_started: false,
            intro_step: INTRO_STEP_NOT_STARTED,
            current_content_item: None,
            catalog: Vec::new(),
            background_material: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    IsLoading,
    LoadingProgress,
    LoadingComplete,
    IsReady,
    HasStarted,
    IntroStep,
    CurrentContentItem,
    Catalog,
    BackgroundMaterial,
}

/// One field change, carrying the new value.
#[derive(Clone, Debug)]
pub enum StateChange {
    IsLoading(bool),
    LoadingProgress(f64),
    LoadingComplete(bool),
    IsReady(bool),
    HasStarted(bool),
    IntroStep { previous: i32, current: i32 },
    CurrentContentItem(Option<Rc<ContentItem>>),
    Catalog(usize),
    BackgroundMaterial(Option<MaterialHandle>),
}

impl StateChange {
    pub fn field(&self) -> Field {
        match self {
            StateChange::IsLoading(_) => Field::IsLoading,
            StateChange::LoadingProgress(_) => Field::LoadingProgress,
            StateChange::LoadingComplete(_) => Field::LoadingComplete,
            StateChange::IsReady(_) => Field::IsReady,
            StateChange::HasStarted(_) => Field::HasStarted,
            StateChange::IntroStep { .. } => Field::IntroStep,
            StateChange::CurrentContentItem(_) => Field::CurrentContentItem,
            StateChange::Catalog(_) => Field::Catalog,
            StateChange::BackgroundMaterial(_) => Field::BackgroundMaterial,
        }
    }
}

// Materials compare by identity, everything else by value.
impl PartialEq for StateChange {
    fn eq(&self, other: &Self) -> bool {
        use StateChange::*;
        match (self, other) {
            (IsLoading(a), IsLoading(b)) => a == b,
            (LoadingProgress(a), LoadingProgress(b)) => a == b,
            (LoadingComplete(a), LoadingComplete(b)) => a == b,
            (IsReady(a), IsReady(b)) => a == b,
            (HasStarted(a), HasStarted(b)) => a == b,
            (
                IntroStep {
                    previous: p1,
                    current: c1,
                },
                IntroStep {
                    previous: p2,
                    current: c2,
                },
            ) => p1 == p2 && c1 == c2,
            (CurrentContentItem(a), CurrentContentItem(b)) => a == b,
            (Catalog(a), Catalog(b)) => a == b,
            (BackgroundMaterial(a), BackgroundMaterial(b)) => match (a, b) {
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            },
            _ => false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    SetLoadingProgress,
    FinishLoading,
    StartIntro,
    SetIntroStep,
    SetCatalog,
    SetCurrentContentItem,
    SetBackgroundMaterial,
}

type Changes = SmallVec<[StateChange; 4]>;

struct Subscriber {
    fields: SmallVec<[Field; 4]>,
    callback: Box<dyn FnMut(&StateChange)>,
}

impl Subscriber {
    fn wants(&self, field: Field) -> bool {
        self.fields.is_empty() || self.fields.contains(&field)
    }
}

struct StoreInner {
    state: RefCell<ProgressionState>,
    subscribers: RefCell<Registry<Subscriber>>,
    pending: RefCell<VecDeque<(Action, StateChange)>>,
    draining: Cell<bool>,
    in_flight: RefCell<SmallVec<[Action; 4]>>,
}

/// Explicitly constructed, explicitly passed store handle.
///
/// Clones share the same state. No locking: the presentation is single
/// threaded, so the only hazard is re-entrancy from subscribers.
#[derive(Clone)]
pub struct ProgressionStore {
    inner: Rc<StoreInner>,
}

impl Default for ProgressionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressionStore {
    pub fn new() -> Self {
        Self::with_state(ProgressionState::default())
    }

    pub fn with_state(state: ProgressionState) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                state: RefCell::new(state),
                subscribers: RefCell::new(Registry::default()),
                pending: RefCell::new(VecDeque::new()),
                draining: Cell::new(false),
                in_flight: RefCell::new(SmallVec::new()),
            }),
        }
    }

    // ---------------- Reads ----------------

    pub fn snapshot(&self) -> ProgressionState {
        self.inner.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading
    }

    pub fn loading_progress(&self) -> f64 {
        self.inner.state.borrow().loading_progress
    }

    pub fn loading_complete(&self) -> bool {
        self.inner.state.borrow().loading_complete
    }

    pub fn is_ready(&self) -> bool {
        self.inner.state.borrow().is_ready
    }

    pub fn has_started(&self) -> bool {
        self.inner.state.borrow().has_started
    }

    pub fn intro_step(&self) -> i32 {
        self.inner.state.borrow().intro_step
    }

    pub fn current_content_item(&self) -> Option<Rc<ContentItem>> {
        self.inner.state.borrow().current_content_item.clone()
    }

    pub fn catalog(&self) -> Vec<Rc<ContentItem>> {
        self.inner.state.borrow().catalog.clone()
    }

    pub fn background_material(&self) -> Option<MaterialHandle> {
        self.inner.state.borrow().background_material.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    // ---------------- Observation ----------------

    /// Observe changes to `fields` (every field when empty).
    pub fn subscribe(
        &self,
        fields: &[Field],
        callback: impl FnMut(&StateChange) + 'static,
    ) -> Registration {
        let subscriber = Subscriber {
            fields: fields.iter().copied().collect(),
            callback: Box::new(callback),
        };
        let id = self
            .inner
            .subscribers
            .borrow_mut()
            .insert(Rc::new(RefCell::new(subscriber)));
        let weak = Rc::downgrade(&self.inner);
        Registration::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.subscribers.borrow_mut().remove(id);
            }
        })
    }

    pub fn watch_intro_step(&self, mut callback: impl FnMut(i32) + 'static) -> Registration {
        self.subscribe(&[Field::IntroStep], move |change| {
            if let StateChange::IntroStep { current, .. } = change {
                callback(*current);
            }
        })
    }

    // ---------------- Actions ----------------

    /// Record loading progress. Values are accepted as-is; once any value
    /// `>= 1` is seen, `loading_complete` stays true.
    pub fn set_loading_progress(&self, progress: f64) {
        self.run(Action::SetLoadingProgress, |state, changes| {
            if state.loading_progress != progress {
                state.loading_progress = progress;
                changes.push(StateChange::LoadingProgress(progress));
            }
            if progress >= 1.0 && !state.loading_complete {
                state.loading_complete = true;
                changes.push(StateChange::LoadingComplete(true));
            }
        });
    }

    pub fn finish_loading(&self) {
        self.run(Action::FinishLoading, |state, changes| {
            if state.is_loading {
                state.is_loading = false;
                changes.push(StateChange::IsLoading(false));
            }
            if !state.is_ready {
                state.is_ready = true;
                changes.push(StateChange::IsReady(true));
            }
        });
    }

    /// Begin the narrative at step 1. Expected after `finish_loading`, not enforced.
    pub fn start_intro(&self) {
        self.run(Action::StartIntro, |state, changes| {
            if !state.has_started {
                state.has_started = true;
                changes.push(StateChange::HasStarted(true));
            }
            set_step(state, changes, INTRO_STEP_FIRST);
        });
    }

    /// Overwrite the step. Monotonicity is the caller's business.
    pub fn set_intro_step(&self, step: i32) {
        self.run(Action::SetIntroStep, |state, changes| {
            set_step(state, changes, step);
        });
    }

    pub fn set_catalog(&self, items: Vec<ContentItem>) {
        let items: Vec<Rc<ContentItem>> = items.into_iter().map(Rc::new).collect();
        self.run(Action::SetCatalog, |state, changes| {
            if state.catalog != items {
                changes.push(StateChange::Catalog(items.len()));
                state.catalog = items;
            }
        });
    }

    pub fn set_current_content_item(&self, item: Option<Rc<ContentItem>>) {
        self.run(Action::SetCurrentContentItem, |state, changes| {
            if state.current_content_item != item {
                state.current_content_item = item.clone();
                changes.push(StateChange::CurrentContentItem(item));
            }
        });
    }

    pub fn set_background_material(&self, material: Option<MaterialHandle>) {
        self.run(Action::SetBackgroundMaterial, |state, changes| {
            let same = match (&state.background_material, &material) {
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            };
            if !same {
                state.background_material = material.clone();
                changes.push(StateChange::BackgroundMaterial(material));
            }
        });
    }

    // ---------------- Dispatch ----------------

    fn run(&self, action: Action, mutate: impl FnOnce(&mut ProgressionState, &mut Changes)) {
        if self.inner.in_flight.borrow().contains(&action) {
            log::warn!("[store] ignoring re-entrant {:?} from a subscriber", action);
            return;
        }
        let _in_flight = InFlight::enter(&self.inner, action);
        let mut changes = Changes::new();
        {
            let mut state = self.inner.state.borrow_mut();
            mutate(&mut *state, &mut changes);
        }
        self.emit(action, changes);
    }

    fn emit(&self, action: Action, changes: Changes) {
        if changes.is_empty() {
            return;
        }
        self.inner
            .pending
            .borrow_mut()
            .extend(changes.into_iter().map(|change| (action, change)));
        // Changes raised by subscribers are queued behind the current one.
        if self.inner.draining.get() {
            return;
        }
        let _draining = Draining::enter(&self.inner.draining);
        loop {
            let next = self.inner.pending.borrow_mut().pop_front();
            let Some((origin, change)) = next else { break };
            // A queued change keeps its action in flight while it is delivered.
            let _origin = InFlight::enter(&self.inner, origin);
            let field = change.field();
            let subscribers = self.inner.subscribers.borrow().snapshot();
            for (id, subscriber) in subscribers {
                if !self.inner.subscribers.borrow().contains(id) {
                    continue;
                }
                let mut subscriber = subscriber.borrow_mut();
                if subscriber.wants(field) {
                    (subscriber.callback)(&change);
                }
            }
        }
    }
}

fn set_step(state: &mut ProgressionState, changes: &mut Changes, step: i32) {
    if state.intro_step != step {
        let previous = state.intro_step;
        state.intro_step = step;
        changes.push(StateChange::IntroStep {
            previous,
            current: step,
        });
    }
}

struct InFlight<'a> {
    inner: &'a StoreInner,
    action: Action,
}

impl<'a> InFlight<'a> {
    fn enter(inner: &'a StoreInner, action: Action) -> Self {
        inner.in_flight.borrow_mut().push(action);
        Self { inner, action }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.inner.in_flight.borrow_mut();
        if let Some(pos) = in_flight.iter().rposition(|a| *a == self.action) {
            in_flight.remove(pos);
        }
    }
}

struct Draining<'a>(&'a Cell<bool>);

impl<'a> Draining<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for Draining<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
