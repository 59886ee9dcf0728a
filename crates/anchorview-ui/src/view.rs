//! The view controller.
//!
//! A [`View`] is one long-lived instance bound to a node id. Each pass it
//! resolves its anchor from the ambient child map, lets the compositor (if
//! any) wrap the slots, renders every slot through the renderer picked by
//! its type, and opens a new tree scope per slot so nested views can find
//! their own anchors and commit through the slot's lens.
//!
//! Passes are gated: when none of the tracked inputs changed by identity and
//! every entry of the compositor overlay is the same map as in the previous
//! pass, the cached slot list is returned and no renderer runs. Since every
//! commit copies only the path it touches, an unchanged `Rc` means unchanged
//! content, so only the branch that was edited re-renders.
//!
//! Nested instances and lenses are addressed by slot *index*. After a
//! reorder the instance at each index is kept and renders whatever slot now
//! occupies it. [`NodesSetter`] moves whole slots, nested anchors included;
//! an edit that rebuilds slots from their props alone leaves each nested
//! anchor at its old index, where the next occupant picks it up.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use anchorview_core::collections::map::HashMap;
use anchorview_core::{
    merge_slot_props, Anchor, LensCache, LensOwner, NodeId, NodeSlot, PropMap, SetterSource,
    SlotType,
};
use smallvec::SmallVec;

use crate::compositor::{Compositor, NodesSetter};
use crate::element::{Element, SlotList, SlotOutput, ViewOutput};
use crate::error::RenderError;
use crate::renderer::{RenderRequest, Renderer, RendererMap};
use crate::scope::{HostScope, PropsListener, TreeScope, ViewParams};

/// Counters kept by each view, mostly for tests and diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewStats {
    /// Calls to [`View::render`].
    pub passes: usize,
    /// Passes that ran the slot renderers.
    pub renders: usize,
    /// Passes that reused the cached slot list.
    pub skips: usize,
}

/// Writes props back into one slot of a view's anchor.
///
/// Each request is a read-modify-write through the ambient setter: the
/// current anchor is fetched at call time, so several requests issued in
/// the same pass all land.
#[derive(Clone)]
pub struct UpdateProps {
    id: NodeId,
    index: usize,
    source: SetterSource,
}

impl UpdateProps {
    pub(crate) fn new(id: NodeId, index: usize, source: SetterSource) -> Self {
        Self { id, index, source }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Shallow-merges `partial` into the slot's persisted props.
    pub fn request(&self, partial: PropMap) {
        let id = &self.id;
        let index = self.index;
        log::trace!("props update on `{id}`[{index}]: {partial:?}");
        self.source
            .get()
            .set(id, |anchor| merge_slot_props(anchor, id, index, &partial));
    }
}

impl fmt::Debug for UpdateProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateProps")
            .field("id", &self.id)
            .field("index", &self.index)
            .finish()
    }
}

/// Inputs compared between passes. Everything is compared by identity
/// except `id` and `readonly`, which are plain values.
struct Tracked {
    id: NodeId,
    default_renderer: Option<Rc<dyn Renderer>>,
    props_listener: Option<PropsListener>,
    readonly: bool,
    renderers: RendererMap,
    compositor: Option<Rc<dyn Compositor>>,
    setter_source: SetterSource,
    anchor: Option<Rc<Anchor>>,
}

impl Tracked {
    fn capture(params: &ViewParams, tree: &TreeScope, host: &HostScope) -> Self {
        Self {
            id: params.id.clone(),
            default_renderer: params.default_renderer.clone(),
            props_listener: params.props_listener.clone(),
            readonly: host.readonly,
            renderers: host.renderers.clone(),
            compositor: host.compositor.clone(),
            setter_source: tree.setter_source.clone(),
            anchor: tree.child_map.get(&params.id).cloned(),
        }
    }

    fn differs(&self, other: &Tracked) -> bool {
        self.id != other.id
            || self.readonly != other.readonly
            || !same_rc(&self.default_renderer, &other.default_renderer)
            || !same_rc(&self.props_listener, &other.props_listener)
            || !self.renderers.ptr_eq(&other.renderers)
            || !same_rc(&self.compositor, &other.compositor)
            || !self.setter_source.ptr_eq(&other.setter_source)
            || !same_rc(&self.anchor, &other.anchor)
    }
}

fn same_rc<T: ?Sized>(a: &Option<Rc<T>>, b: &Option<Rc<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// Overlays are compared entry by entry by identity: a compositor that
/// rebuilds an entry, even with equal content, gets a new render.
fn same_operations(previous: &[PropMap], next: &[PropMap]) -> bool {
    previous.len() == next.len()
        && previous.iter().zip(next).all(|(a, b)| a.ptr_eq(b))
}

struct Memo {
    tracked: Tracked,
    operations: Vec<PropMap>,
    slots: Option<SlotList>,
    output: ViewOutput,
}

/// Nested instances are keyed by the slot that hosts them and their id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ChildKey {
    index: usize,
    id: NodeId,
}

struct ViewInner {
    owner: LensOwner,
    lenses: LensCache,
    memo: RefCell<Option<Memo>>,
    children: RefCell<HashMap<ChildKey, View>>,
    stats: Cell<ViewStats>,
}

/// A view instance. Cloning yields another handle to the same instance.
#[derive(Clone)]
pub struct View {
    inner: Rc<ViewInner>,
}

impl View {
    pub fn new(id: impl Into<NodeId>) -> Self {
        let owner = LensOwner::new(id.into(), SetterSource::noop());
        let lenses = LensCache::new(&owner);
        Self {
            inner: Rc::new(ViewInner {
                owner,
                lenses,
                memo: RefCell::new(None),
                children: RefCell::new(HashMap::default()),
                stats: Cell::new(ViewStats::default()),
            }),
        }
    }

    pub fn id(&self) -> NodeId {
        self.inner.owner.id()
    }

    /// The setter source handed to everything nested in slot `index`.
    /// Stable for the lifetime of the instance.
    pub fn lens_for(&self, index: usize) -> SetterSource {
        self.inner.lenses.lens_for(index)
    }

    pub fn stats(&self) -> ViewStats {
        self.inner.stats.get()
    }

    /// The nested instance with `id` hosted by slot `index`, if alive.
    pub fn child(&self, index: usize, id: &str) -> Option<View> {
        let key = ChildKey {
            index,
            id: NodeId::from(id),
        };
        self.inner.children.borrow().get(&key).cloned()
    }

    pub fn child_count(&self) -> usize {
        self.inner.children.borrow().len()
    }

    pub fn ptr_eq(&self, other: &View) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Runs one pass.
    ///
    /// Every slot is attempted even when an earlier one fails; the first
    /// failure is returned and nothing is cached, so the next pass retries.
    pub fn render(
        &self,
        params: &ViewParams,
        tree: &TreeScope,
        host: &HostScope,
    ) -> Result<ViewOutput, RenderError> {
        self.bump(|stats| stats.passes += 1);
        self.inner.owner.update(&params.id, &tree.setter_source);

        let tracked = Tracked::capture(params, tree, host);
        let inputs_changed = self
            .inner
            .memo
            .borrow()
            .as_ref()
            .map_or(true, |memo| memo.tracked.differs(&tracked));
        let anchor = Anchor::or_empty(tracked.anchor.clone(), &params.id);

        let mut pass = Pass {
            view: self,
            params,
            tree,
            host,
            anchor: &anchor,
            inputs_changed,
            outcome: None,
        };

        let element = match host.active_compositor() {
            None => {
                if let Some(output) = pass.cached_output() {
                    return Ok(output);
                }
                pass.content(Vec::new()).map(Element::Slots)
            }
            Some(compositor) => {
                let set = NodesSetter::new(params.id.clone(), tree.setter_source.clone());
                compositor.compose(
                    &anchor.nodes,
                    &host.renderers,
                    set,
                    &mut |operations| pass.content(operations).map(Element::Slots),
                )
            }
        };
        let outcome = pass.outcome.take();

        let element = match element {
            Ok(element) => element,
            Err(err) => {
                log::debug!("view `{}` failed: {err}", params.id);
                self.inner.memo.borrow_mut().take();
                return Err(err);
            }
        };

        let output = ViewOutput {
            id: params.id.clone(),
            element,
        };
        let (operations, slots) = match outcome {
            Some(SlotsOutcome::Rendered {
                operations,
                slots,
                children,
            }) => {
                self.retain_children(&children);
                (operations, Some(slots))
            }
            Some(SlotsOutcome::Reused { operations, slots }) => (operations, Some(slots)),
            // the compositor never asked for the slots
            None => (Vec::new(), None),
        };
        *self.inner.memo.borrow_mut() = Some(Memo {
            tracked,
            operations,
            slots,
            output: output.clone(),
        });
        Ok(output)
    }

    fn render_slots(
        &self,
        params: &ViewParams,
        tree: &TreeScope,
        host: &HostScope,
        anchor: &Anchor,
        operations: &[PropMap],
        children: &mut SmallVec<[ChildKey; 8]>,
    ) -> Result<SlotList, RenderError> {
        let mut slots = Vec::with_capacity(anchor.nodes.len());
        let mut first_error = None;
        for (index, node) in anchor.nodes.iter().enumerate() {
            let overlay = operations.get(index);
            match self.render_slot(params, tree, host, index, node, overlay, children) {
                Ok(element) => slots.push(SlotOutput { index, element }),
                Err(err) => {
                    log::debug!("slot {index} of `{}` failed: {err}", params.id);
                    first_error.get_or_insert(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(slots.into()),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn render_slot(
        &self,
        params: &ViewParams,
        tree: &TreeScope,
        host: &HostScope,
        index: usize,
        node: &NodeSlot,
        overlay: Option<&PropMap>,
        children: &mut SmallVec<[ChildKey; 8]>,
    ) -> Result<Element, RenderError> {
        let props = match overlay {
            Some(overlay) => node.props_or_empty().shallow_merge(overlay),
            None => node.props_or_empty(),
        };
        if let Some(listener) = &params.props_listener {
            listener(&props);
        }

        let renderer = match &node.slot_type {
            SlotType::Default => match &params.default_renderer {
                Some(renderer) => Rc::clone(renderer),
                None => {
                    return Err(RenderError::Configuration {
                        id: params.id.clone(),
                        index,
                    })
                }
            },
            SlotType::Tag(tag) => match host.renderers.get(tag) {
                Some(renderer) => Rc::clone(renderer),
                None => {
                    return Err(RenderError::Lookup {
                        id: params.id.clone(),
                        index,
                        type_tag: tag.clone(),
                    })
                }
            },
            SlotType::Invalid => match &params.default_renderer {
                Some(renderer) => Rc::clone(renderer),
                None => {
                    log::warn!(
                        "slot {index} of `{}` has a blank type and no default renderer; rendering nothing",
                        params.id
                    );
                    return Ok(Element::Empty);
                }
            },
        };

        let request = RenderRequest {
            props,
            readonly: host.readonly,
            request_update_props: (!host.readonly).then(|| {
                UpdateProps::new(params.id.clone(), index, tree.setter_source.clone())
            }),
        };
        let mut scope = SlotScope {
            view: self,
            index,
            tree: TreeScope::new(
                node.anchors.clone().unwrap_or_default(),
                self.inner.lenses.lens_for(index),
            ),
            host,
            children,
        };
        renderer.render(request, &mut scope)
    }

    fn retain_children(&self, seen: &[ChildKey]) {
        let mut children = self.inner.children.borrow_mut();
        let before = children.len();
        children.retain(|key, _| seen.contains(key));
        let dropped = before - children.len();
        if dropped > 0 {
            log::debug!("view `{}` dropped {dropped} nested instance(s)", self.id());
        }
    }

    fn bump(&self, f: impl FnOnce(&mut ViewStats)) {
        let mut stats = self.inner.stats.get();
        f(&mut stats);
        self.inner.stats.set(stats);
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("id", &self.id())
            .field("stats", &self.stats())
            .field("children", &self.child_count())
            .finish()
    }
}

enum SlotsOutcome {
    Rendered {
        operations: Vec<PropMap>,
        slots: SlotList,
        children: SmallVec<[ChildKey; 8]>,
    },
    Reused {
        operations: Vec<PropMap>,
        slots: SlotList,
    },
}

/// State of one [`View::render`] call, shared with the compositor's content
/// continuation.
struct Pass<'a> {
    view: &'a View,
    params: &'a ViewParams,
    tree: &'a TreeScope,
    host: &'a HostScope,
    anchor: &'a Anchor,
    inputs_changed: bool,
    outcome: Option<SlotsOutcome>,
}

impl Pass<'_> {
    /// Whole cached output, when nothing tracked changed and the previous
    /// pass ran without a compositor overlay.
    fn cached_output(&self) -> Option<ViewOutput> {
        if self.inputs_changed {
            return None;
        }
        let memo = self.view.inner.memo.borrow();
        let memo = memo.as_ref()?;
        if !memo.operations.is_empty() || memo.slots.is_none() {
            return None;
        }
        self.view.bump(|stats| stats.skips += 1);
        log::debug!("view `{}` unchanged; reusing output", self.params.id);
        Some(memo.output.clone())
    }

    fn content(&mut self, operations: Vec<PropMap>) -> Result<SlotList, RenderError> {
        if !self.inputs_changed {
            let reused = {
                let memo = self.view.inner.memo.borrow();
                memo.as_ref()
                    .filter(|memo| same_operations(&memo.operations, &operations))
                    .and_then(|memo| memo.slots.clone())
            };
            if let Some(slots) = reused {
                self.view.bump(|stats| stats.skips += 1);
                log::debug!("view `{}` slots unchanged; reusing", self.params.id);
                self.outcome = Some(SlotsOutcome::Reused {
                    operations,
                    slots: slots.clone(),
                });
                return Ok(slots);
            }
        }

        self.view.bump(|stats| stats.renders += 1);
        log::debug!(
            "rendering view `{}` ({} slot(s))",
            self.params.id,
            self.anchor.nodes.len()
        );
        let mut children = SmallVec::new();
        let slots = self.view.render_slots(
            self.params,
            self.tree,
            self.host,
            self.anchor,
            &operations,
            &mut children,
        )?;
        self.outcome = Some(SlotsOutcome::Rendered {
            operations,
            slots: slots.clone(),
            children,
        });
        Ok(slots)
    }
}

/// Context boundary around one rendered slot.
///
/// Views rendered through [`SlotScope::view`] see the slot's nested anchors
/// as their child map and the slot's lens as their setter source.
pub struct SlotScope<'a> {
    view: &'a View,
    index: usize,
    tree: TreeScope,
    host: &'a HostScope,
    children: &'a mut SmallVec<[ChildKey; 8]>,
}

impl SlotScope<'_> {
    pub fn index(&self) -> usize {
        self.index
    }

    /// The scope nested views of this slot receive.
    pub fn tree(&self) -> &TreeScope {
        &self.tree
    }

    pub fn host(&self) -> &HostScope {
        self.host
    }

    /// Renders the nested view described by `params` inside this slot.
    ///
    /// The instance is created on first use and kept while the slot keeps
    /// rendering it.
    pub fn view(&mut self, params: &ViewParams) -> Result<Element, RenderError> {
        let key = ChildKey {
            index: self.index,
            id: params.id.clone(),
        };
        let child = self
            .view
            .inner
            .children
            .borrow_mut()
            .entry(key.clone())
            .or_insert_with(|| View::new(params.id.clone()))
            .clone();
        if !self.children.contains(&key) {
            self.children.push(key);
        }
        child
            .render(params, &self.tree, self.host)
            .map(|output| Element::View(Box::new(output)))
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
