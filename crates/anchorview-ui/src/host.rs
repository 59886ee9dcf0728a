//! Drives a root view against a [`RootStore`].

use std::cell::Cell;

use anchorview_core::RootStore;

use crate::element::ViewOutput;
use crate::error::RenderError;
use crate::scope::{HostScope, TreeScope, ViewParams};
use crate::view::View;

/// Owns the root view of a tree and re-renders it when the store moves on.
///
/// Commits made through any setter of the tree land in the store
/// synchronously; [`ViewHost::pump`] then renders from the new snapshot and
/// the views' gating keeps the work to the edited branch.
pub struct ViewHost {
    store: RootStore,
    params: ViewParams,
    host: HostScope,
    root: View,
    rendered_revision: Cell<Option<u64>>,
}

impl ViewHost {
    pub fn new(store: RootStore, params: ViewParams, host: HostScope) -> Self {
        let root = View::new(params.id.clone());
        Self {
            store,
            params,
            host,
            root,
            rendered_revision: Cell::new(None),
        }
    }

    pub fn store(&self) -> &RootStore {
        &self.store
    }

    pub fn root(&self) -> &View {
        &self.root
    }

    pub fn params(&self) -> &ViewParams {
        &self.params
    }

    pub fn host_scope(&self) -> &HostScope {
        &self.host
    }

    pub fn set_host_scope(&mut self, host: HostScope) {
        self.host = host;
        self.rendered_revision.set(None);
    }

    pub fn set_params(&mut self, params: ViewParams) {
        self.params = params;
        self.rendered_revision.set(None);
    }

    /// Whether the store committed since the last pass (or none ran yet).
    pub fn needs_render(&self) -> bool {
        self.rendered_revision.get() != Some(self.store.revision())
    }

    /// Renders the root view from the current snapshot.
    pub fn render(&self) -> Result<ViewOutput, RenderError> {
        let revision = self.store.revision();
        let tree = TreeScope::from_store(&self.store);
        log::debug!("rendering `{}` at revision {revision}", self.params.id);
        let result = self.root.render(&self.params, &tree, &self.host);
        self.rendered_revision.set(Some(revision));
        result
    }

    /// Renders only if the store changed since the last pass.
    pub fn pump(&self) -> Option<Result<ViewOutput, RenderError>> {
        if !self.needs_render() {
            return None;
        }
        Some(self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use crate::renderer::{renderer_fn, RendererMap};
    use anchorview_core::{props, Anchor, NodeSlot};

    fn text_host() -> ViewHost {
        let store = RootStore::with_snapshot(
            [Anchor::new("root", [NodeSlot::typed("text")])]
                .into_iter()
                .collect(),
        );
        let text = renderer_fn(|request, _scope| Ok(Element::node("text", request.props)));
        ViewHost::new(
            store,
            ViewParams::new("root"),
            HostScope::new(RendererMap::new().with("text", text)),
        )
    }

    #[test]
    fn pump_renders_only_after_a_commit() {
        let host = text_host();
        assert!(host.needs_render());
        assert!(host.pump().is_some());
        assert!(host.pump().is_none());

        host.store().replace(Anchor::new(
            "root",
            [NodeSlot::typed("text").with_props(props! { "value" => "next" })],
        ));

        let output = host.pump().expect("store moved").expect("render");
        assert_eq!(
            output.slot(0).and_then(Element::props),
            Some(&props! { "value" => "next" })
        );
        assert_eq!(host.root().stats().renders, 2);
    }

    #[test]
    fn swapping_params_forces_a_pass() {
        let mut host = text_host();
        host.render().expect("render");
        assert!(!host.needs_render());

        host.set_params(ViewParams::new("root").props_listener(|_| {}));

        assert!(host.needs_render());
        assert!(host.pump().is_some());
    }
}
