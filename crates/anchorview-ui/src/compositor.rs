//! Structural editing collaborator.
//!
//! A compositor wraps a view's slots in its own editing UI (drag handles,
//! selection, insertion points). It reports transient per-slot prop overlays
//! through the content continuation and may rewrite the node list at any time
//! through [`NodesSetter`].

use std::fmt;
use std::rc::Rc;

use anchorview_core::{replace_nodes, NodeId, NodeSlot, PropMap, SetterSource};

use crate::element::Element;
use crate::error::RenderError;
use crate::renderer::RendererMap;

/// Renders the view's slots with the given overlay, one entry per slot.
/// Missing entries mean "no overlay".
pub type SlotContent<'a> = dyn FnMut(Vec<PropMap>) -> Result<Element, RenderError> + 'a;

pub trait Compositor {
    fn compose(
        &self,
        nodes: &[Rc<NodeSlot>],
        renderers: &RendererMap,
        set: NodesSetter,
        content: &mut SlotContent<'_>,
    ) -> Result<Element, RenderError>;
}

/// Replaces a view's node list wholesale through the view's ambient setter.
///
/// Slots keep their nested anchors when moved through here, since the whole
/// slot travels. Nested view instances stay at their index and render the
/// slot that moved in.
#[derive(Clone)]
pub struct NodesSetter {
    id: NodeId,
    source: SetterSource,
}

impl NodesSetter {
    pub fn new(id: NodeId, source: SetterSource) -> Self {
        Self { id, source }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn replace(&self, edit: impl FnOnce(&[Rc<NodeSlot>]) -> Vec<Rc<NodeSlot>>) {
        let id = &self.id;
        self.source
            .get()
            .set(id, |anchor| replace_nodes(anchor, id, edit));
    }

    /// Moves the slot at `from` to position `to`. Out-of-range moves are
    /// ignored.
    pub fn move_slot(&self, from: usize, to: usize) {
        self.replace(|nodes| {
            let mut nodes = nodes.to_vec();
            if from < nodes.len() && to < nodes.len() {
                let slot = nodes.remove(from);
                nodes.insert(to, slot);
            }
            nodes
        });
    }

    /// Inserts `slot` at `index`, clamped to the end of the list.
    pub fn insert_slot(&self, index: usize, slot: NodeSlot) {
        self.replace(|nodes| {
            let mut nodes = nodes.to_vec();
            nodes.insert(index.min(nodes.len()), Rc::new(slot));
            nodes
        });
    }

    pub fn remove_slot(&self, index: usize) {
        self.replace(|nodes| {
            let mut nodes = nodes.to_vec();
            if index < nodes.len() {
                nodes.remove(index);
            }
            nodes
        });
    }
}

impl fmt::Debug for NodesSetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodesSetter").field("id", &self.id).finish()
    }
}
