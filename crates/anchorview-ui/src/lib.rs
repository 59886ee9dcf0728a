//! View controller, renderer registry and compositor protocol for Anchorview.
//!
//! A tree of [`View`]s renders an anchor tree held by a root store. Each view
//! reads its own anchor from the ambient [`TreeScope`], renders its slots
//! through the [`RendererMap`] of the [`HostScope`], and opens a fresh tree
//! scope per slot whose setter is a lens into that slot. Nested views at any
//! depth can therefore commit edits to their own anchor without knowing
//! their position in the tree.

pub mod compositor;
pub mod element;
mod error;
pub mod host;
pub mod renderer;
pub mod scope;
pub mod view;

pub use anchorview_core::{
    props, Anchor, AnchorPath, ChildMap, NodeId, NodeSlot, PropMap, PropValue, RootStore, Setter,
    SetterSource, SlotType, TypeTag,
};
pub use compositor::{Compositor, NodesSetter, SlotContent};
pub use element::{Element, SlotList, SlotOutput, ViewOutput};
pub use error::RenderError;
pub use host::ViewHost;
pub use renderer::{renderer_fn, RenderRequest, Renderer, RendererMap};
pub use scope::{HostScope, PropsListener, TreeScope, ViewParams};
pub use view::{SlotScope, UpdateProps, View, ViewStats};
