//! Commit functions for anchors.
//!
//! A [`Setter`] applies an [`AnchorUpdate`] to the anchor stored under an id
//! in whatever scope owns it. The root setter writes the backing store;
//! derived setters produced by lenses relay the update into a parent anchor.
//! Every call is synchronous: when `set` returns, the commit has happened.

use std::fmt;
use std::rc::Rc;

use crate::anchor::{Anchor, NodeId};

/// Receives the current anchor (`None` when nothing is stored yet) and
/// returns its replacement. Returning the input `Rc` unchanged means "no
/// change".
pub type AnchorUpdate<'a> = Box<dyn FnOnce(Option<Rc<Anchor>>) -> Rc<Anchor> + 'a>;

type SetterFn = dyn for<'a> Fn(&NodeId, AnchorUpdate<'a>);

#[derive(Clone)]
pub struct Setter {
    inner: Rc<SetterFn>,
}

impl Setter {
    pub fn new<F>(commit: F) -> Self
    where
        F: for<'a> Fn(&NodeId, AnchorUpdate<'a>) + 'static,
    {
        Self {
            inner: Rc::new(commit),
        }
    }

    /// A setter that drops every request.
    pub fn noop() -> Self {
        NOOP_SETTER.with(Clone::clone)
    }

    pub fn set<'a, F>(&self, id: &NodeId, update: F)
    where
        F: FnOnce(Option<Rc<Anchor>>) -> Rc<Anchor> + 'a,
    {
        self.apply(id, Box::new(update));
    }

    pub fn apply(&self, id: &NodeId, update: AnchorUpdate<'_>) {
        (self.inner)(id, update)
    }

    pub fn ptr_eq(&self, other: &Setter) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Setter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter")
            .field("ptr", &Rc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}

/// The ambient handle a view reads to reach its setter.
///
/// Views compare sources by identity when deciding whether to re-render, so
/// a source should be created once and cloned, not rebuilt per pass.
#[derive(Clone)]
pub struct SetterSource {
    inner: Rc<dyn Fn() -> Setter>,
}

impl SetterSource {
    pub fn new(resolve: impl Fn() -> Setter + 'static) -> Self {
        Self {
            inner: Rc::new(resolve),
        }
    }

    /// A source that always yields `setter`.
    pub fn fixed(setter: Setter) -> Self {
        Self::new(move || setter.clone())
    }

    /// The shared source used when no tree scope provides one. Every call
    /// returns the same instance.
    pub fn noop() -> Self {
        NOOP_SOURCE.with(Clone::clone)
    }

    pub fn get(&self) -> Setter {
        (self.inner)()
    }

    pub fn ptr_eq(&self, other: &SetterSource) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for SetterSource {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for SetterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetterSource")
            .field("ptr", &Rc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}

thread_local! {
    static NOOP_SETTER: Setter = Setter::new(|id, _update| {
        log::trace!("dropping update for `{id}`: no setter in scope");
    });
    static NOOP_SOURCE: SetterSource = SetterSource::fixed(Setter::noop());
}

/// Records every committed anchor instead of storing it.
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct RecordingSetter {
    commits: Rc<std::cell::RefCell<Vec<(NodeId, Rc<Anchor>)>>>,
    current: Rc<std::cell::RefCell<Option<Rc<Anchor>>>>,
}

#[cfg(test)]
impl RecordingSetter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn setter(&self) -> Setter {
        let commits = Rc::clone(&self.commits);
        let current = Rc::clone(&self.current);
        Setter::new(move |id, update| {
            let before = current.borrow().clone();
            let after = update(before);
            *current.borrow_mut() = Some(after.clone());
            commits.borrow_mut().push((id.clone(), after));
        })
    }

    pub(crate) fn commits(&self) -> Vec<(NodeId, Rc<Anchor>)> {
        self.commits.borrow().clone()
    }

    pub(crate) fn last(&self) -> Option<Rc<Anchor>> {
        self.current.borrow().clone()
    }
}
