//! The anchor tree: anchors, their slots and the per-slot child maps.
//!
//! Every type here is immutable once shared. Edits go through the
//! copy-on-write helpers at the bottom of this module, which rebuild only the
//! anchor and slot on the edited path and reuse every other `Rc` untouched.
//! Pointer equality therefore doubles as "unchanged".

use std::fmt;
use std::rc::Rc;

use crate::collections::map::HashMap;
use crate::setter::AnchorUpdate;
use crate::value::{PropMap, PropValue};

/// Identifies one anchor within the nearest child map. Ids are scoped to
/// that map, not global: two slots may hold children with the same id.
pub type NodeId = Rc<str>;

/// Names a renderer in the host's registry.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeTag(Rc<str>);

impl TypeTag {
    pub fn new(tag: impl Into<Rc<str>>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TypeTag {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for TypeTag {
    fn from(tag: String) -> Self {
        Self::new(tag)
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a slot picks its renderer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SlotType {
    /// No type set: the owning view's default renderer is used.
    #[default]
    Default,
    Tag(TypeTag),
    /// The document carried an explicit but falsy type (null, `false`, `0`,
    /// `""`). Kept apart from [`SlotType::Default`] because hosts treat it as
    /// a soft warning rather than a configuration error.
    Invalid,
}

impl SlotType {
    pub fn tag(tag: impl Into<TypeTag>) -> Self {
        SlotType::Tag(tag.into())
    }

    /// Interprets a raw `type` field read from a document.
    pub fn from_value(value: Option<&PropValue>) -> Self {
        match value {
            None => SlotType::Default,
            Some(value) if !value.is_truthy() => SlotType::Invalid,
            Some(PropValue::Str(tag)) => SlotType::Tag(TypeTag::new(tag.clone())),
            Some(other) => SlotType::Tag(TypeTag::new(other.to_string())),
        }
    }

    pub fn as_tag(&self) -> Option<&TypeTag> {
        match self {
            SlotType::Tag(tag) => Some(tag),
            _ => None,
        }
    }
}

/// One renderable unit of an anchor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeSlot {
    pub slot_type: SlotType,
    pub props: Option<PropMap>,
    /// Nested anchors of the views embedded in this slot, keyed by their id.
    pub anchors: Option<ChildMap>,
}

impl NodeSlot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn typed(tag: impl Into<TypeTag>) -> Self {
        Self {
            slot_type: SlotType::tag(tag),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, slot_type: SlotType) -> Self {
        self.slot_type = slot_type;
        self
    }

    pub fn with_props(mut self, props: PropMap) -> Self {
        self.props = Some(props);
        self
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchors
            .get_or_insert_with(ChildMap::new)
            .insert_anchor(Rc::new(anchor));
        self
    }

    /// Persisted props, or an empty map when none were ever written.
    pub fn props_or_empty(&self) -> PropMap {
        self.props.clone().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.slot_type == SlotType::Default && self.props.is_none() && self.anchors.is_none()
    }
}

/// The persisted, ordered slot list of one view instance.
#[derive(Clone, Debug, PartialEq)]
pub struct Anchor {
    pub id: NodeId,
    pub nodes: Vec<Rc<NodeSlot>>,
}

impl Anchor {
    pub fn new(id: impl Into<NodeId>, nodes: impl IntoIterator<Item = NodeSlot>) -> Self {
        Self {
            id: id.into(),
            nodes: nodes.into_iter().map(Rc::new).collect(),
        }
    }

    /// The anchor a view sees when nothing was ever stored for `id`: a single
    /// untyped slot with no props and no children.
    pub fn empty(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            nodes: vec![Rc::new(NodeSlot::empty())],
        }
    }

    pub fn or_empty(anchor: Option<Rc<Anchor>>, id: &NodeId) -> Rc<Anchor> {
        anchor.unwrap_or_else(|| Rc::new(Anchor::empty(id.clone())))
    }

    /// Whether this anchor reads the same as an absent one: a single
    /// untouched slot.
    pub fn is_default(&self) -> bool {
        matches!(self.nodes.as_slice(), [slot] if slot.is_empty())
    }

    pub fn slot(&self, index: usize) -> Option<&Rc<NodeSlot>> {
        self.nodes.get(index)
    }

    /// Returns a copy with the slot at `index` rebuilt by `edit`.
    ///
    /// The edited slot starts as a shallow copy of the current one, or as an
    /// empty slot when `index` is out of range; the node list is padded with
    /// empty slots up to `index`. All other slots are shared with `self`.
    pub fn update_slot(&self, index: usize, edit: impl FnOnce(&mut NodeSlot)) -> Anchor {
        let mut nodes = self.nodes.clone();
        if nodes.len() <= index {
            nodes.resize_with(index + 1, || Rc::new(NodeSlot::empty()));
        }
        let mut slot = NodeSlot::clone(&nodes[index]);
        edit(&mut slot);
        nodes[index] = Rc::new(slot);
        Anchor {
            id: self.id.clone(),
            nodes,
        }
    }
}

/// Snapshot of the anchors visible at one nesting level.
#[derive(Clone, Default)]
pub struct ChildMap {
    entries: Rc<HashMap<NodeId, Rc<Anchor>>>,
}

impl ChildMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Rc<Anchor>> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &Rc<Anchor>)> {
        self.entries.iter()
    }

    pub fn insert(&mut self, id: NodeId, anchor: Rc<Anchor>) {
        Rc::make_mut(&mut self.entries).insert(id, anchor);
    }

    /// Inserts `anchor` under its own id.
    pub fn insert_anchor(&mut self, anchor: Rc<Anchor>) {
        self.insert(anchor.id.clone(), anchor);
    }

    pub fn remove(&mut self, id: &str) -> Option<Rc<Anchor>> {
        if !self.entries.contains_key(id) {
            return None;
        }
        Rc::make_mut(&mut self.entries).remove(id)
    }

    /// Builder form of [`ChildMap::insert_anchor`].
    pub fn with(mut self, anchor: Anchor) -> Self {
        self.insert_anchor(Rc::new(anchor));
        self
    }

    pub fn ptr_eq(&self, other: &ChildMap) -> bool {
        Rc::ptr_eq(&self.entries, &other.entries)
    }
}

impl PartialEq for ChildMap {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.entries == *other.entries
    }
}

impl fmt::Debug for ChildMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&NodeId> = self.entries.keys().collect();
        ids.sort_unstable();
        let mut map = f.debug_map();
        for id in ids {
            map.entry(id, &self.entries[id]);
        }
        map.finish()
    }
}

impl FromIterator<Anchor> for ChildMap {
    fn from_iter<I: IntoIterator<Item = Anchor>>(iter: I) -> Self {
        let mut map = ChildMap::new();
        for anchor in iter {
            map.insert_anchor(Rc::new(anchor));
        }
        map
    }
}

/// Shallow-merges `partial` into the persisted props of slot `index`.
///
/// Missing anchors and slots are created on the way. Existing keys not named
/// in `partial` are kept.
pub fn merge_slot_props(
    anchor: Option<Rc<Anchor>>,
    id: &NodeId,
    index: usize,
    partial: &PropMap,
) -> Rc<Anchor> {
    let anchor = Anchor::or_empty(anchor, id);
    Rc::new(anchor.update_slot(index, |slot| {
        slot.props.get_or_insert_with(PropMap::new).merge_from(partial);
    }))
}

/// Applies `child_update` to the nested anchor `child_id` of slot `index`.
///
/// This is the step a lens performs at each level: one anchor and one slot
/// are copied, and the child map of that slot is copied with a single entry
/// replaced.
pub fn set_child_anchor(
    anchor: Option<Rc<Anchor>>,
    id: &NodeId,
    index: usize,
    child_id: &NodeId,
    child_update: AnchorUpdate<'_>,
) -> Rc<Anchor> {
    let anchor = Anchor::or_empty(anchor, id);
    Rc::new(anchor.update_slot(index, |slot| {
        let anchors = slot.anchors.get_or_insert_with(ChildMap::new);
        let current = anchors.get(child_id).cloned();
        anchors.insert(child_id.clone(), child_update(current));
    }))
}

/// Replaces the whole node list with `edit(current nodes)`.
///
/// An edit that hands back the same slots in the same order returns the
/// stored anchor itself, so committing it is a no-op.
pub fn replace_nodes(
    anchor: Option<Rc<Anchor>>,
    id: &NodeId,
    edit: impl FnOnce(&[Rc<NodeSlot>]) -> Vec<Rc<NodeSlot>>,
) -> Rc<Anchor> {
    let anchor = Anchor::or_empty(anchor, id);
    let nodes = edit(&anchor.nodes);
    let unchanged = nodes.len() == anchor.nodes.len()
        && nodes.iter().zip(&anchor.nodes).all(|(a, b)| Rc::ptr_eq(a, b));
    if unchanged {
        return anchor;
    }
    Rc::new(Anchor {
        id: anchor.id.clone(),
        nodes,
    })
}
