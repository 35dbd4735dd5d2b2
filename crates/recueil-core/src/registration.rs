//! Scoped release of callbacks registered with the store, ticker and scroll world.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Guard returned by every subscribe/register call.
///
/// Dropping it unregisters the callback. `release` may be called any number
/// of times; only the first call has an effect.
#[must_use = "dropping a Registration immediately unregisters its callback"]
pub struct Registration {
    release: Option<Box<dyn FnOnce()>>,
}

impl Registration {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A registration that owns nothing; used when a subsystem stays inert.
    pub fn inert() -> Self {
        Self { release: None }
    }

    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    pub fn release(&mut self) {
        if let Some(f) = self.release.take() {
            f();
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Shared "still mounted" flag for async work that outlives the call which
/// spawned it. Clones observe the same flag.
#[derive(Clone, Debug)]
pub struct Liveness(Rc<Cell<bool>>);

impl Default for Liveness {
    fn default() -> Self {
        Self(Rc::new(Cell::new(true)))
    }
}

impl Liveness {
    pub fn is_alive(&self) -> bool {
        self.0.get()
    }

    /// Mark the owner as gone. Idempotent.
    pub fn end(&self) {
        self.0.set(false);
    }
}

/// Ordered set of callbacks keyed by a monotonically increasing id.
pub(crate) struct Registry<T: ?Sized> {
    entries: Vec<(u64, Rc<RefCell<T>>)>,
    next_id: u64,
}

impl<T: ?Sized> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }
}

impl<T: ?Sized> Registry<T> {
    pub(crate) fn insert(&mut self, entry: Rc<RefCell<T>>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, entry));
        id
    }

    pub(crate) fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| *k != id);
        self.entries.len() != before
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn contains(&self, id: u64) -> bool {
        self.entries.iter().any(|(k, _)| *k == id)
    }

    // Cloned so callbacks may register or release while being invoked.
    pub(crate) fn snapshot(&self) -> Vec<(u64, Rc<RefCell<T>>)> {
        self.entries.clone()
    }
}
