//! Ambient configuration threaded down the render tree.
//!
//! Two bundles reach every view: the [`TreeScope`] set by the enclosing slot
//! (or the root store) and the [`HostScope`] shared by the whole tree. They
//! are merged with the view's own [`ViewParams`] at each instance boundary.

use std::fmt;
use std::rc::Rc;

use anchorview_core::{ChildMap, NodeId, PropMap, RootStore, SetterSource};

use crate::compositor::Compositor;
use crate::renderer::{Renderer, RendererMap};

pub type PropsListener = Rc<dyn Fn(&PropMap)>;

/// Per-instance parameters of a view.
#[derive(Clone)]
pub struct ViewParams {
    pub id: NodeId,
    /// Used for slots without a type.
    pub default_renderer: Option<Rc<dyn Renderer>>,
    /// Observes each slot's effective props right before it renders.
    pub props_listener: Option<PropsListener>,
}

impl ViewParams {
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            default_renderer: None,
            props_listener: None,
        }
    }

    pub fn default_renderer(mut self, renderer: Rc<dyn Renderer>) -> Self {
        self.default_renderer = Some(renderer);
        self
    }

    pub fn props_listener(mut self, listener: impl Fn(&PropMap) + 'static) -> Self {
        self.props_listener = Some(Rc::new(listener));
        self
    }

    pub fn shared_props_listener(mut self, listener: PropsListener) -> Self {
        self.props_listener = Some(listener);
        self
    }
}

impl fmt::Debug for ViewParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewParams")
            .field("id", &self.id)
            .field("default_renderer", &self.default_renderer.is_some())
            .field("props_listener", &self.props_listener.is_some())
            .finish()
    }
}

/// Snapshot and setter visible at one nesting level.
#[derive(Clone, Default, Debug)]
pub struct TreeScope {
    pub child_map: ChildMap,
    pub setter_source: SetterSource,
}

impl TreeScope {
    pub fn new(child_map: ChildMap, setter_source: SetterSource) -> Self {
        Self {
            child_map,
            setter_source,
        }
    }

    /// Root scope reading from and committing to `store`.
    pub fn from_store(store: &RootStore) -> Self {
        Self::new(store.snapshot(), store.source())
    }
}

/// Host-wide settings shared by every view of a tree.
#[derive(Clone, Default)]
pub struct HostScope {
    pub readonly: bool,
    pub renderers: RendererMap,
    pub compositor: Option<Rc<dyn Compositor>>,
}

impl HostScope {
    pub fn new(renderers: RendererMap) -> Self {
        Self {
            renderers,
            ..Self::default()
        }
    }

    pub fn readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    pub fn compositor(mut self, compositor: Rc<dyn Compositor>) -> Self {
        self.compositor = Some(compositor);
        self
    }

    /// The compositor that takes part in this pass: none when read-only.
    pub(crate) fn active_compositor(&self) -> Option<&Rc<dyn Compositor>> {
        self.compositor.as_ref().filter(|_| !self.readonly)
    }
}

impl fmt::Debug for HostScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostScope")
            .field("readonly", &self.readonly)
            .field("renderers", &self.renderers)
            .field("compositor", &self.compositor.is_some())
            .finish()
    }
}
