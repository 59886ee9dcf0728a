//! Compositor with a scripted overlay.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anchorview_core::collections::map::HashMap;
use anchorview_core::{NodeId, NodeSlot, PropMap};
use anchorview_ui::{Compositor, Element, NodesSetter, RenderError, RendererMap, SlotContent};

/// Wraps each view's slot list in an `Element::Node` of kind `"compositor"`
/// and feeds it the overlay the test scripted for that view id.
///
/// The host scope reaches nested views too, so everything is kept per view
/// id. A view's overlay is padded with empty maps (or cut) to its slot
/// count; the padding is stored, so an untouched overlay hands the view the
/// same maps on every pass. The last [`NodesSetter`] each view passed in is
/// kept so tests can make structural edits the way an editing UI would.
#[derive(Default)]
pub struct ScriptedCompositor {
    operations: RefCell<HashMap<NodeId, Vec<PropMap>>>,
    seen_nodes: RefCell<HashMap<NodeId, Vec<Rc<NodeSlot>>>>,
    setters: RefCell<HashMap<NodeId, NodesSetter>>,
    compose_count: Cell<usize>,
    withhold_content: Cell<bool>,
}

impl ScriptedCompositor {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Overlay for the view `id`. Fresh maps count as a change even when
    /// their content equals the previous overlay.
    pub fn set_operations(&self, id: &str, operations: Vec<PropMap>) {
        self.operations
            .borrow_mut()
            .insert(NodeId::from(id), operations);
    }

    /// When set, `compose` returns its frame without asking for the slots.
    pub fn withhold_content(&self, withhold: bool) {
        self.withhold_content.set(withhold);
    }

    /// The node-list setter of view `id`, once that view was composed.
    pub fn setter_for(&self, id: &str) -> Option<NodesSetter> {
        self.setters.borrow().get(id).cloned()
    }

    pub fn seen_nodes(&self, id: &str) -> Vec<Rc<NodeSlot>> {
        self.seen_nodes
            .borrow()
            .get(id)
            .cloned()
            .unwrap_or_default()
    }

    /// Compose calls across all views.
    pub fn compose_count(&self) -> usize {
        self.compose_count.get()
    }

    fn overlay_for(&self, id: &NodeId, len: usize) -> Vec<PropMap> {
        let mut operations = self.operations.borrow_mut();
        let stored = operations.entry(id.clone()).or_default();
        if stored.len() < len {
            stored.resize_with(len, PropMap::new);
        }
        stored[..len].to_vec()
    }
}

impl Compositor for ScriptedCompositor {
    fn compose(
        &self,
        nodes: &[Rc<NodeSlot>],
        _renderers: &RendererMap,
        set: NodesSetter,
        content: &mut SlotContent<'_>,
    ) -> Result<Element, RenderError> {
        self.compose_count.set(self.compose_count.get() + 1);
        let id = set.id().clone();
        self.seen_nodes
            .borrow_mut()
            .insert(id.clone(), nodes.to_vec());
        self.setters.borrow_mut().insert(id.clone(), set);

        let frame = Element::node("compositor", PropMap::new());
        if self.withhold_content.get() {
            return Ok(frame);
        }
        let operations = self.overlay_for(&id, nodes.len());
        let slots = content(operations)?;
        Ok(frame.with_children([slots]))
    }
}
