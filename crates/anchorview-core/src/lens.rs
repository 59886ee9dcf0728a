//! Lens composition: derived setters scoped to one slot of an instance.
//!
//! A view hands each of its slots a [`SetterSource`] obtained from
//! [`LensCache::lens_for`]. Anything nested inside that slot commits through
//! it as if it were talking to a root store: the lens wraps the request into
//! an update of the owning anchor (`nodes[index].anchors[child_id]`) and
//! forwards it to the owner's own ambient setter. Chained over every level,
//! this lets a view at any depth edit its own anchor without knowing where it
//! lives.
//!
//! The owner's id and ambient source are read when the lens is *called*, not
//! when it is created, so a cached lens never commits through a stale parent.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::anchor::{set_child_anchor, NodeId};
use crate::collections::map::HashMap;
use crate::setter::{AnchorUpdate, Setter, SetterSource};

struct OwnerState {
    id: NodeId,
    source: SetterSource,
}

/// The current coordinates of a lens-owning instance: its id and the setter
/// source it received from its parent. Updated on every render pass.
#[derive(Clone)]
pub struct LensOwner {
    state: Rc<RefCell<OwnerState>>,
}

impl LensOwner {
    pub fn new(id: NodeId, source: SetterSource) -> Self {
        Self {
            state: Rc::new(RefCell::new(OwnerState { id, source })),
        }
    }

    pub fn update(&self, id: &NodeId, source: &SetterSource) {
        let mut state = self.state.borrow_mut();
        if state.id != *id {
            state.id = id.clone();
        }
        if !state.source.ptr_eq(source) {
            state.source = source.clone();
        }
    }

    pub fn id(&self) -> NodeId {
        self.state.borrow().id.clone()
    }

    pub fn source(&self) -> SetterSource {
        self.state.borrow().source.clone()
    }
}

/// Per-instance table of lenses keyed by slot index.
///
/// Entries are built on first access and live as long as the cache; the
/// same index always yields the same [`SetterSource`], which keeps
/// descendants' "my setter is unchanged" checks true across ancestor
/// re-renders.
pub struct LensCache {
    owner: Weak<RefCell<OwnerState>>,
    entries: RefCell<HashMap<usize, SetterSource>>,
}

impl LensCache {
    pub fn new(owner: &LensOwner) -> Self {
        Self {
            owner: Rc::downgrade(&owner.state),
            entries: RefCell::new(HashMap::default()),
        }
    }

    pub fn lens_for(&self, index: usize) -> SetterSource {
        self.entries
            .borrow_mut()
            .entry(index)
            .or_insert_with(|| derive_lens(self.owner.clone(), index))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

fn derive_lens(owner: Weak<RefCell<OwnerState>>, index: usize) -> SetterSource {
    SetterSource::new(move || {
        let owner = owner.clone();
        Setter::new(move |child_id, child_update| {
            commit_through_owner(&owner, index, child_id, child_update);
        })
    })
}

fn commit_through_owner(
    owner: &Weak<RefCell<OwnerState>>,
    index: usize,
    child_id: &NodeId,
    child_update: AnchorUpdate<'_>,
) {
    let Some(state) = owner.upgrade() else {
        log::debug!("lens for slot {index} outlived its owner; dropping update of `{child_id}`");
        return;
    };
    let (id, source) = {
        let state = state.borrow();
        (state.id.clone(), state.source.clone())
    };
    log::trace!("lens commit `{id}`[{index}] -> `{child_id}`");
    let parent = source.get();
    parent.set(&id, |anchor| {
        set_child_anchor(anchor, &id, index, child_id, child_update)
    });
}

#[cfg(test)]
#[path = "tests/lens_tests.rs"]
mod tests;
