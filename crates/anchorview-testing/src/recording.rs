//! Renderer that records every call it receives.

use std::cell::RefCell;
use std::rc::Rc;

use anchorview_core::PropMap;
use anchorview_ui::{Element, RenderError, RenderRequest, Renderer, SlotScope, UpdateProps, ViewParams};

/// One invocation of a [`RecordingRenderer`].
#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub index: usize,
    pub props: PropMap,
    pub readonly: bool,
    pub update: Option<UpdateProps>,
}

type RenderHook = Box<dyn Fn(&RecordedCall)>;

/// Test renderer producing `Element::Node { kind, props }` for each slot.
///
/// Optionally embeds a nested view in every slot it renders, and runs a hook
/// after recording each call (useful for committing mid-pass).
pub struct RecordingRenderer {
    kind: Rc<str>,
    nested: Option<ViewParams>,
    hook: Option<RenderHook>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl RecordingRenderer {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: Rc::from(kind),
            nested: None,
            hook: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Render `params` as a nested view inside each slot.
    pub fn nesting(mut self, params: ViewParams) -> Self {
        self.nested = Some(params);
        self
    }

    pub fn on_render(mut self, hook: impl Fn(&RecordedCall) + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn shared(self) -> Rc<Self> {
        Rc::new(self)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn last_props(&self) -> Option<PropMap> {
        self.calls.borrow().last().map(|call| call.props.clone())
    }

    /// Update handle of the most recent call for slot `index`.
    pub fn last_update(&self, index: usize) -> Option<UpdateProps> {
        self.calls
            .borrow()
            .iter()
            .rev()
            .find(|call| call.index == index)
            .and_then(|call| call.update.clone())
    }

    /// Slot indices in call order.
    pub fn indices(&self) -> Vec<usize> {
        self.calls.borrow().iter().map(|call| call.index).collect()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl Renderer for RecordingRenderer {
    fn render(
        &self,
        request: RenderRequest,
        scope: &mut SlotScope<'_>,
    ) -> Result<Element, RenderError> {
        let call = RecordedCall {
            index: scope.index(),
            props: request.props.clone(),
            readonly: request.readonly,
            update: request.request_update_props.clone(),
        };
        self.calls.borrow_mut().push(call.clone());
        if let Some(hook) = &self.hook {
            hook(&call);
        }

        let element = Element::node(self.kind.clone(), request.props);
        match &self.nested {
            Some(params) => {
                let child = scope.view(params)?;
                Ok(element.with_children([child]))
            }
            None => Ok(element),
        }
    }
}
