use anchorview_core::{Anchor, AnchorPath, ChildMap, RootStore};
use anchorview_ui::{HostScope, RenderError, View, ViewHost, ViewOutput, ViewParams};
use std::rc::Rc;

/// Upper bound on passes in [`ViewTestRule::pump_until_idle`]; a tree that
/// keeps committing during render never settles.
const MAX_PUMP_PASSES: usize = 64;

/// Headless test harness around a [`RootStore`] and a root [`View`].
///
/// Mirrors how a host drives a tree: install content, let renderers and
/// tests commit through setters, then pump until the store stops moving.
pub struct ViewTestRule {
    store: RootStore,
    host: Option<ViewHost>,
    last_output: Option<ViewOutput>,
}

impl ViewTestRule {
    /// Create a rule backed by an empty store.
    pub fn new() -> Self {
        Self::with_store(RootStore::new())
    }

    pub fn with_snapshot(snapshot: ChildMap) -> Self {
        Self::with_store(RootStore::with_snapshot(snapshot))
    }

    pub fn with_store(store: RootStore) -> Self {
        Self {
            store,
            host: None,
            last_output: None,
        }
    }

    /// Install the root view and perform an initial render.
    pub fn set_content(
        &mut self,
        params: ViewParams,
        host: HostScope,
    ) -> Result<ViewOutput, RenderError> {
        self.host = Some(ViewHost::new(self.store.clone(), params, host));
        self.render()
    }

    /// Swap the host scope (readonly flag, registry, compositor) and render.
    pub fn set_host_scope(&mut self, host: HostScope) -> Result<ViewOutput, RenderError> {
        let view_host = self.view_host_mut()?;
        view_host.set_host_scope(host);
        self.render()
    }

    /// Force a pass even if the store did not change.
    pub fn render(&mut self) -> Result<ViewOutput, RenderError> {
        let output = self.view_host()?.render()?;
        self.last_output = Some(output.clone());
        Ok(output)
    }

    /// Render until no commit happened since the last pass.
    pub fn pump_until_idle(&mut self) -> Result<Option<ViewOutput>, RenderError> {
        let mut passes = 0;
        while self.view_host()?.needs_render() {
            passes += 1;
            if passes > MAX_PUMP_PASSES {
                return Err(RenderError::failed(format!(
                    "tree did not settle after {MAX_PUMP_PASSES} passes"
                )));
            }
            log::trace!("pump pass {passes} at revision {}", self.store.revision());
            self.render()?;
        }
        Ok(self.last_output.clone())
    }

    pub fn store(&self) -> &RootStore {
        &self.store
    }

    pub fn anchor(&self, id: &str) -> Option<Rc<Anchor>> {
        self.store.anchor(id)
    }

    pub fn anchor_at(&self, path: &AnchorPath) -> Option<Rc<Anchor>> {
        path.resolve(&self.store.snapshot())
    }

    /// Root view instance, once content is installed.
    pub fn root(&self) -> Option<&View> {
        self.host.as_ref().map(ViewHost::root)
    }

    pub fn last_output(&self) -> Option<&ViewOutput> {
        self.last_output.as_ref()
    }

    pub fn has_content(&self) -> bool {
        self.host.is_some()
    }

    fn view_host(&self) -> Result<&ViewHost, RenderError> {
        self.host
            .as_ref()
            .ok_or_else(|| RenderError::failed("no content installed"))
    }

    fn view_host_mut(&mut self) -> Result<&mut ViewHost, RenderError> {
        self.host
            .as_mut()
            .ok_or_else(|| RenderError::failed("no content installed"))
    }
}

impl Default for ViewTestRule {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for tests that only need temporary access to a
/// `ViewTestRule`.
pub fn run_test_view<R>(f: impl FnOnce(&mut ViewTestRule) -> R) -> R {
    let mut rule = ViewTestRule::new();
    f(&mut rule)
}

#[cfg(test)]
#[path = "tests/testing_tests.rs"]
mod tests;
