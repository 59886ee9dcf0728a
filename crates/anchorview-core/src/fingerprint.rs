//! Content fingerprints for anchor trees.
//!
//! Two trees with the same observable content hash to the same value, no
//! matter how their `Rc`s are shared or in which order map entries were
//! inserted. Useful for change logs and for asserting that a sequence of
//! commits left a tree where it started.

use std::hash::{Hash, Hasher};

use crate::anchor::{Anchor, ChildMap, NodeSlot, SlotType};
use crate::collections::hasher;
use crate::value::{PropMap, PropValue};

pub trait Fingerprint {
    fn write_fingerprint<H: Hasher>(&self, state: &mut H);

    fn fingerprint(&self) -> u64 {
        let mut state = hasher::new();
        self.write_fingerprint(&mut state);
        state.finish()
    }
}

impl Fingerprint for PropValue {
    fn write_fingerprint<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            PropValue::Null => {}
            PropValue::Bool(value) => value.hash(state),
            PropValue::Int(value) => value.hash(state),
            PropValue::Float(value) => value.to_bits().hash(state),
            PropValue::Str(value) => value.hash(state),
            PropValue::List(items) => {
                items.len().hash(state);
                for item in items.iter() {
                    item.write_fingerprint(state);
                }
            }
            PropValue::Map(map) => map.write_fingerprint(state),
        }
    }
}

impl Fingerprint for PropMap {
    fn write_fingerprint<H: Hasher>(&self, state: &mut H) {
        let keys = self.sorted_keys();
        keys.len().hash(state);
        for key in keys {
            key.hash(state);
            if let Some(value) = self.get(key) {
                value.write_fingerprint(state);
            }
        }
    }
}

impl Fingerprint for NodeSlot {
    fn write_fingerprint<H: Hasher>(&self, state: &mut H) {
        match &self.slot_type {
            SlotType::Default => 0u8.hash(state),
            SlotType::Tag(tag) => {
                1u8.hash(state);
                tag.as_str().hash(state);
            }
            SlotType::Invalid => 2u8.hash(state),
        }
        // absent and empty props render the same
        self.props_or_empty().write_fingerprint(state);
        match &self.anchors {
            Some(anchors) => anchors.write_fingerprint(state),
            None => ChildMap::new().write_fingerprint(state),
        }
    }
}

impl Fingerprint for Anchor {
    fn write_fingerprint<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.nodes.len().hash(state);
        for node in &self.nodes {
            node.write_fingerprint(state);
        }
    }
}

impl Fingerprint for ChildMap {
    fn write_fingerprint<H: Hasher>(&self, state: &mut H) {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
        entries.len().hash(state);
        for (id, anchor) in entries {
            id.hash(state);
            anchor.write_fingerprint(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props;

    #[test]
    fn insertion_order_does_not_matter() {
        let a = props! { "x" => 1, "y" => "two" };
        let b = props! { "y" => "two", "x" => 1 };
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn prop_changes_change_the_fingerprint() {
        let before = Anchor::new("root", [NodeSlot::typed("text").with_props(props! { "v" => 1 })]);
        let after = Anchor::new("root", [NodeSlot::typed("text").with_props(props! { "v" => 2 })]);
        assert_ne!(before.fingerprint(), after.fingerprint());
    }

    #[test]
    fn unset_props_match_empty_props() {
        let unset = NodeSlot::typed("text");
        let empty = NodeSlot::typed("text").with_props(PropMap::new());
        assert_eq!(unset.fingerprint(), empty.fingerprint());
    }

    #[test]
    fn nested_anchors_contribute() {
        let plain = Anchor::new("root", [NodeSlot::empty()]);
        let nested = Anchor::new("root", [NodeSlot::empty().with_anchor(Anchor::empty("child"))]);
        assert_ne!(plain.fingerprint(), nested.fingerprint());
    }
}
