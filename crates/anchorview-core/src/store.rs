//! In-memory root store.
//!
//! Owns the top-level [`ChildMap`] and hands out the root [`Setter`]. Every
//! commit replaces the root map wholesale, bumps the revision and notifies
//! subscribers before returning.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::anchor::{Anchor, ChildMap, NodeId};
use crate::setter::{AnchorUpdate, Setter, SetterSource};

type Listener = Rc<dyn Fn(&ChildMap, u64)>;

struct StoreState {
    root: ChildMap,
    revision: u64,
}

struct StoreInner {
    state: RefCell<StoreState>,
    listeners: RefCell<Vec<(u64, Listener)>>,
    next_listener: Cell<u64>,
    setter: Setter,
    source: SetterSource,
}

impl StoreInner {
    fn commit(&self, id: &NodeId, update: AnchorUpdate<'_>) {
        let current = self.state.borrow().root.get(id).cloned();
        let next = update(current.clone());
        let unchanged = match &current {
            Some(current) => Rc::ptr_eq(current, &next),
            // an absent entry already reads as the default anchor
            None => next.is_default(),
        };
        if unchanged {
            log::trace!("commit of `{id}` left the anchor unchanged; skipping");
            return;
        }

        let (snapshot, revision) = {
            let mut state = self.state.borrow_mut();
            state.root.insert(id.clone(), next);
            state.revision += 1;
            (state.root.clone(), state.revision)
        };
        log::trace!("committed `{id}` at revision {revision}");

        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&snapshot, revision);
        }
    }
}

/// Backing store for the root of an anchor tree.
#[derive(Clone)]
pub struct RootStore {
    inner: Rc<StoreInner>,
}

impl RootStore {
    pub fn new() -> Self {
        Self::with_snapshot(ChildMap::new())
    }

    pub fn with_snapshot(root: ChildMap) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<StoreInner>| {
            let weak = weak.clone();
            let setter = Setter::new(move |id, update| match weak.upgrade() {
                Some(inner) => inner.commit(id, update),
                None => log::debug!("root store dropped; ignoring update of `{id}`"),
            });
            StoreInner {
                state: RefCell::new(StoreState { root, revision: 0 }),
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(1),
                source: SetterSource::fixed(setter.clone()),
                setter,
            }
        });
        Self { inner }
    }

    /// The root setter. Same instance for the store's lifetime.
    pub fn setter(&self) -> Setter {
        self.inner.setter.clone()
    }

    /// A stable source yielding [`RootStore::setter`].
    pub fn source(&self) -> SetterSource {
        self.inner.source.clone()
    }

    pub fn snapshot(&self) -> ChildMap {
        self.inner.state.borrow().root.clone()
    }

    pub fn revision(&self) -> u64 {
        self.inner.state.borrow().revision
    }

    pub fn anchor(&self, id: &str) -> Option<Rc<Anchor>> {
        self.inner.state.borrow().root.get(id).cloned()
    }

    /// Stores `anchor` under its own id through the root setter.
    pub fn replace(&self, anchor: Anchor) {
        let id = anchor.id.clone();
        let anchor = Rc::new(anchor);
        self.inner.setter.set(&id, move |_| anchor);
    }

    /// Calls `listener` with the new snapshot and revision after each commit.
    #[must_use = "dropping the subscription unsubscribes the listener"]
    pub fn subscribe(&self, listener: impl Fn(&ChildMap, u64) + 'static) -> Subscription {
        let key = self.inner.next_listener.get();
        self.inner.next_listener.set(key + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((key, Rc::new(listener)));
        Subscription {
            store: Rc::downgrade(&self.inner),
            key,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

impl Default for RootStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RootStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("RootStore")
            .field("revision", &state.revision)
            .field("root", &state.root)
            .finish()
    }
}

/// Handle returned by [`RootStore::subscribe`]; unsubscribes on drop.
pub struct Subscription {
    store: Weak<StoreInner>,
    key: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(store) = self.store.upgrade() {
            store
                .listeners
                .borrow_mut()
                .retain(|(key, _)| *key != self.key);
        }
    }
}
