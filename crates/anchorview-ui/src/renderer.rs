//! Type-dispatched renderers.

use std::fmt;
use std::rc::Rc;

use anchorview_core::{PropMap, TypeTag};
use indexmap::IndexMap;

use crate::element::Element;
use crate::error::RenderError;
use crate::view::{SlotScope, UpdateProps};

/// Everything a renderer receives for one slot.
#[derive(Clone, Debug)]
pub struct RenderRequest {
    /// Persisted props with the compositor overlay applied.
    pub props: PropMap,
    pub readonly: bool,
    /// Writes props back into the slot. `None` when the host is read-only.
    pub request_update_props: Option<UpdateProps>,
}

/// Renders one slot.
///
/// Renderers may embed nested views through [`SlotScope::view`]; those views
/// see the slot's own child anchors and commit through the slot's lens.
pub trait Renderer {
    fn render(
        &self,
        request: RenderRequest,
        scope: &mut SlotScope<'_>,
    ) -> Result<Element, RenderError>;
}

struct FnRenderer<F>(F);

impl<F> Renderer for FnRenderer<F>
where
    F: Fn(RenderRequest, &mut SlotScope<'_>) -> Result<Element, RenderError>,
{
    fn render(
        &self,
        request: RenderRequest,
        scope: &mut SlotScope<'_>,
    ) -> Result<Element, RenderError> {
        (self.0)(request, scope)
    }
}

/// Wraps a closure as a shared renderer.
pub fn renderer_fn<F>(render: F) -> Rc<dyn Renderer>
where
    F: Fn(RenderRequest, &mut SlotScope<'_>) -> Result<Element, RenderError> + 'static,
{
    Rc::new(FnRenderer(render))
}

/// Registry from type tag to renderer.
///
/// Views compare registries by identity, so build one and clone it rather
/// than rebuilding it per pass.
#[derive(Clone, Default)]
pub struct RendererMap {
    entries: Rc<IndexMap<TypeTag, Rc<dyn Renderer>>>,
}

impl RendererMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, tag: impl Into<TypeTag>, renderer: Rc<dyn Renderer>) -> Self {
        self.register(tag, renderer);
        self
    }

    pub fn register(&mut self, tag: impl Into<TypeTag>, renderer: Rc<dyn Renderer>) {
        Rc::make_mut(&mut self.entries).insert(tag.into(), renderer);
    }

    pub fn get(&self, tag: &TypeTag) -> Option<&Rc<dyn Renderer>> {
        self.entries.get(tag)
    }

    pub fn contains(&self, tag: &TypeTag) -> bool {
        self.entries.contains_key(tag)
    }

    /// Registered tags in registration order.
    pub fn tags(&self) -> impl Iterator<Item = &TypeTag> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ptr_eq(&self, other: &RendererMap) -> bool {
        Rc::ptr_eq(&self.entries, &other.entries)
    }
}

impl fmt::Debug for RendererMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}
