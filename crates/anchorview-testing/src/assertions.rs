//! Assertion helpers for anchor trees and view output.

use std::rc::Rc;

use anchorview_core::{Anchor, Fingerprint, PropMap, PropValue};
use anchorview_ui::{Element, ViewOutput};

/// Persisted props of slot `index`, empty when the slot has none.
pub fn slot_props(anchor: &Anchor, index: usize) -> PropMap {
    anchor
        .slot(index)
        .map(|slot| slot.props_or_empty())
        .unwrap_or_default()
}

/// Assert that slot `index` of `anchor` persists `key = expected`.
pub fn assert_slot_prop(anchor: &Anchor, index: usize, key: &str, expected: impl Into<PropValue>) {
    let expected = expected.into();
    let props = slot_props(anchor, index);
    assert_eq!(
        props.get(key),
        Some(&expected),
        "slot {} of `{}`: expected {} = {}, props were {:?}",
        index,
        anchor.id,
        key,
        expected,
        props
    );
}

/// Assert that two anchors are the same allocation, i.e. untouched by a
/// commit.
pub fn assert_shared(actual: &Rc<Anchor>, expected: &Rc<Anchor>, msg: &str) {
    assert!(
        Rc::ptr_eq(actual, expected),
        "{}: anchor `{}` was copied",
        msg,
        actual.id
    );
}

/// Assert that a commit produced a new allocation for this anchor.
pub fn assert_copied(actual: &Rc<Anchor>, previous: &Rc<Anchor>, msg: &str) {
    assert!(
        !Rc::ptr_eq(actual, previous),
        "{}: anchor `{}` was not copied",
        msg,
        actual.id
    );
}

/// Kinds of each rendered slot in order; `None` for non-node slots.
pub fn slot_kinds(output: &ViewOutput) -> Vec<Option<String>> {
    output
        .slots()
        .map(|slots| {
            slots
                .iter()
                .map(|slot| slot.element.kind().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}

/// Assert the node kinds of a view's slots, in order.
pub fn assert_slot_kinds(output: &ViewOutput, expected: &[&str]) {
    let actual = slot_kinds(output);
    let expected: Vec<Option<String>> = expected.iter().map(|kind| Some(kind.to_string())).collect();
    assert_eq!(actual, expected, "slot kinds of `{}`", output.id);
}

/// Props of the element rendered for slot `index`.
pub fn rendered_props(output: &ViewOutput, index: usize) -> Option<PropMap> {
    output.slot(index).and_then(Element::props).cloned()
}

/// Assert that two anchors hold the same content, whether or not they share
/// an allocation.
pub fn assert_same_content(actual: &Anchor, expected: &Anchor, msg: &str) {
    assert_eq!(
        actual.fingerprint(),
        expected.fingerprint(),
        "{}: anchor `{}` differs from `{}`: {:?} vs {:?}",
        msg,
        actual.id,
        expected.id,
        actual,
        expected
    );
}
