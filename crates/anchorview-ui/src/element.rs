//! Output tree produced by renderers.

use std::rc::Rc;

use anchorview_core::{NodeId, PropMap};

/// What a renderer returns. Hosts turn this into real widgets; tests
/// inspect it directly.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Element {
    #[default]
    Empty,
    Text(Rc<str>),
    Node {
        kind: Rc<str>,
        props: PropMap,
        children: Vec<Element>,
    },
    /// The slot list of a view, as handed to a compositor or returned
    /// directly when there is none.
    Slots(SlotList),
    /// A nested view rendered inside a slot.
    View(Box<ViewOutput>),
}

impl Element {
    pub fn text(value: impl Into<Rc<str>>) -> Self {
        Element::Text(value.into())
    }

    pub fn node(kind: impl Into<Rc<str>>, props: PropMap) -> Self {
        Element::Node {
            kind: kind.into(),
            props,
            children: Vec::new(),
        }
    }

    /// Builder for [`Element::Node`] children; no-op on other variants.
    pub fn with_children(mut self, new_children: impl IntoIterator<Item = Element>) -> Self {
        if let Element::Node { children, .. } = &mut self {
            children.extend(new_children);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Element::Empty)
    }

    pub fn kind(&self) -> Option<&str> {
        match self {
            Element::Node { kind, .. } => Some(kind),
            _ => None,
        }
    }

    pub fn props(&self) -> Option<&PropMap> {
        match self {
            Element::Node { props, .. } => Some(props),
            _ => None,
        }
    }

    /// First slot list found depth-first, not descending into nested views.
    pub fn find_slots(&self) -> Option<&SlotList> {
        match self {
            Element::Slots(slots) => Some(slots),
            Element::Node { children, .. } => children.iter().find_map(Element::find_slots),
            _ => None,
        }
    }

    /// Node kinds in depth-first order, including nested views.
    pub fn kinds(&self) -> Vec<Rc<str>> {
        let mut out = Vec::new();
        self.collect_kinds(&mut out);
        out
    }

    fn collect_kinds(&self, out: &mut Vec<Rc<str>>) {
        match self {
            Element::Empty | Element::Text(_) => {}
            Element::Node { kind, children, .. } => {
                out.push(kind.clone());
                for child in children {
                    child.collect_kinds(out);
                }
            }
            Element::Slots(slots) => {
                for slot in slots.iter() {
                    slot.element.collect_kinds(out);
                }
            }
            Element::View(view) => view.element.collect_kinds(out),
        }
    }
}

/// Output of one slot, tagged with its position in the anchor.
#[derive(Clone, Debug, PartialEq)]
pub struct SlotOutput {
    pub index: usize,
    pub element: Element,
}

pub type SlotList = Rc<[SlotOutput]>;

/// Result of rendering one view instance.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewOutput {
    pub id: NodeId,
    pub element: Element,
}

impl ViewOutput {
    /// The view's slot list, wherever a compositor placed it.
    pub fn slots(&self) -> Option<&SlotList> {
        self.element.find_slots()
    }

    /// Element of slot `index`, if the slot list is present.
    pub fn slot(&self, index: usize) -> Option<&Element> {
        self.slots()?
            .iter()
            .find(|slot| slot.index == index)
            .map(|slot| &slot.element)
    }

    /// Whether `other` reuses this output's slot list.
    pub fn shares_slots_with(&self, other: &ViewOutput) -> bool {
        match (self.slots(), other.slots()) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}
