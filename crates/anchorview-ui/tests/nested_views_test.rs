//! Nested views, lens commits and re-render gating across levels.

use std::rc::Rc;

use anchorview_testing::prelude::*;
use anchorview_ui::*;

struct Fixture {
    rule: ViewTestRule,
    frame: Rc<RecordingRenderer>,
    leaf: Rc<RecordingRenderer>,
}

/// `root` has two `frame` slots, each hosting a nested `inner` view whose
/// untyped slot renders through the `leaf` default renderer.
fn two_frames() -> Fixture {
    let _ = env_logger::builder().is_test(true).try_init();
    let leaf = RecordingRenderer::new("leaf").shared();
    let frame = RecordingRenderer::new("frame")
        .nesting(ViewParams::new("inner").default_renderer(leaf.clone()))
        .shared();
    let store = RootStore::with_snapshot(
        [Anchor::new(
            "root",
            [NodeSlot::typed("frame"), NodeSlot::typed("frame")],
        )]
        .into_iter()
        .collect(),
    );
    let mut rule = ViewTestRule::with_store(store);
    rule.set_content(
        ViewParams::new("root"),
        HostScope::new(RendererMap::new().with("frame", frame.clone())),
    )
    .expect("initial render");
    Fixture { rule, frame, leaf }
}

#[test]
fn nested_update_lands_in_owning_slot() {
    let Fixture { rule, leaf, .. } = two_frames();
    let before = rule.anchor("root").expect("root");

    // second leaf call belongs to the `inner` view of slot 1
    let update = leaf.calls()[1].update.clone().expect("update handle");
    update.request(props! { "checked" => true });

    let after = rule.anchor("root").expect("root");
    assert_copied(&after, &before, "root after nested commit");
    assert!(Rc::ptr_eq(&before.nodes[0], &after.nodes[0]));

    let inner = rule
        .anchor_at(&AnchorPath::root("root").child(1, "inner"))
        .expect("inner anchor created on first write");
    assert_slot_prop(&inner, 0, "checked", true);
    assert!(rule
        .anchor_at(&AnchorPath::root("root").child(0, "inner"))
        .is_none());
}

#[test]
fn sibling_branch_is_not_re_rendered() {
    let Fixture {
        mut rule,
        frame,
        leaf,
    } = two_frames();
    let update = leaf.calls()[1].update.clone().expect("update handle");
    update.request(props! { "checked" => true });

    rule.pump_until_idle().expect("re-render");

    // the root anchor changed, so both frames ran again
    assert_eq!(frame.call_count(), 4);
    // only the edited inner view re-ran its leaf
    assert_eq!(leaf.call_count(), 3);
    assert_eq!(leaf.last_props(), Some(props! { "checked" => true }));

    let root = rule.root().expect("root view");
    let untouched = root.child(0, "inner").expect("slot 0 inner");
    let edited = root.child(1, "inner").expect("slot 1 inner");
    assert_eq!(
        untouched.stats(),
        ViewStats {
            passes: 2,
            renders: 1,
            skips: 1
        }
    );
    assert_eq!(edited.stats().renders, 2);
}

#[test]
fn lenses_resolve_the_owner_at_call_time() {
    let Fixture { mut rule, leaf, .. } = two_frames();
    let first = leaf.calls()[0].update.clone().expect("update handle");
    first.request(props! { "n" => 1 });
    rule.pump_until_idle().expect("re-render");

    // the handle from the first pass still writes through the current tree
    first.request(props! { "m" => 2 });

    let inner = rule
        .anchor_at(&AnchorPath::root("root").child(0, "inner"))
        .expect("inner anchor");
    assert_eq!(slot_props(&inner, 0), props! { "n" => 1, "m" => 2 });
}

#[test]
fn deep_commit_copies_only_the_path() {
    let _ = env_logger::builder().is_test(true).try_init();
    let leaf = RecordingRenderer::new("leaf").shared();
    let middle = RecordingRenderer::new("middle")
        .nesting(ViewParams::new("leaf-view").default_renderer(leaf.clone()))
        .shared();
    let outer = RecordingRenderer::new("outer")
        .nesting(ViewParams::new("middle-view").default_renderer(middle.clone()))
        .shared();
    let side = Anchor::new("side", [NodeSlot::typed("outer")]);
    let store = RootStore::with_snapshot(
        [
            Anchor::new("root", [NodeSlot::typed("outer"), NodeSlot::typed("outer")]),
            side,
        ]
        .into_iter()
        .collect(),
    );
    let mut rule = ViewTestRule::with_store(store);
    rule.set_content(
        ViewParams::new("root"),
        HostScope::new(RendererMap::new().with("outer", outer.clone())),
    )
    .expect("initial render");
    let side_before = rule.anchor("side").expect("side");
    let root_before = rule.anchor("root").expect("root");

    let update = leaf.calls()[0].update.clone().expect("update handle");
    update.request(props! { "deep" => true });

    let path = AnchorPath::root("root")
        .child(0, "middle-view")
        .child(0, "leaf-view");
    let leaf_anchor = rule.anchor_at(&path).expect("leaf anchor");
    assert_slot_prop(&leaf_anchor, 0, "deep", true);
    assert_shared(&rule.anchor("side").expect("side"), &side_before, "unrelated root entry");
    let root_after = rule.anchor("root").expect("root");
    assert!(Rc::ptr_eq(&root_before.nodes[1], &root_after.nodes[1]));

    rule.pump_until_idle().expect("re-render");
    assert_eq!(leaf.call_count(), 3);
    assert_eq!(middle.call_count(), 3);
    assert_eq!(outer.call_count(), 4);
}

#[test]
fn sibling_slots_may_reuse_a_child_id() {
    let Fixture { rule, leaf, .. } = two_frames();
    let calls = leaf.calls();
    calls[0].update.clone().expect("slot 0").request(props! { "v" => "zero" });
    calls[1].update.clone().expect("slot 1").request(props! { "v" => "one" });

    let zero = rule
        .anchor_at(&AnchorPath::root("root").child(0, "inner"))
        .expect("slot 0 inner");
    let one = rule
        .anchor_at(&AnchorPath::root("root").child(1, "inner"))
        .expect("slot 1 inner");
    assert_slot_prop(&zero, 0, "v", "zero");
    assert_slot_prop(&one, 0, "v", "one");
}

#[test]
fn removed_slot_tears_down_its_nested_view() {
    let Fixture { mut rule, .. } = two_frames();
    let root = rule.root().expect("root view").clone();
    assert_eq!(root.child_count(), 2);

    rule.store()
        .replace(Anchor::new("root", [NodeSlot::typed("frame")]));
    rule.pump_until_idle().expect("re-render");

    assert_eq!(root.child_count(), 1);
    assert!(root.child(1, "inner").is_none());
}
