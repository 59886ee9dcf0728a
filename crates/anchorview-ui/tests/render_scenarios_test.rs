//! End-to-end render scenarios against a root store.
//!
//! Covers the basic contract of a single view: typed slots render through
//! the registry, untyped slots need a default renderer, unknown types are
//! reported by name, and update handles merge into persisted props.

use anchorview_testing::prelude::*;
use anchorview_ui::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn store_with(anchor: Anchor) -> RootStore {
    RootStore::with_snapshot([anchor].into_iter().collect())
}

#[test]
fn text_slot_renders_through_registry() {
    init_logging();
    let text = RecordingRenderer::new("text").shared();
    let store = store_with(Anchor::new(
        "root",
        [NodeSlot::typed("text").with_props(props! { "value" => "hi" })],
    ));
    let mut rule = ViewTestRule::with_store(store);

    let output = rule
        .set_content(
            ViewParams::new("root"),
            HostScope::new(RendererMap::new().with("text", text.clone())),
        )
        .expect("render succeeds");

    assert_slot_kinds(&output, &["text"]);
    assert_eq!(rendered_props(&output, 0), Some(props! { "value" => "hi" }));

    let calls = text.calls();
    assert_eq!(calls.len(), 1);
    assert!(!calls[0].readonly);

    let update = text.last_update(0).expect("writable host hands out an update handle");
    update.request(props! { "bold" => true });

    let anchor = rule.anchor("root").expect("root anchor");
    assert_slot_prop(&anchor, 0, "value", "hi");
    assert_slot_prop(&anchor, 0, "bold", true);

    let output = rule
        .pump_until_idle()
        .expect("re-render succeeds")
        .expect("output");
    assert_eq!(text.call_count(), 2);
    assert_eq!(
        rendered_props(&output, 0),
        Some(props! { "value" => "hi", "bold" => true })
    );
}

#[test]
fn untyped_slot_without_default_renderer_is_a_configuration_error() {
    init_logging();
    let store = store_with(Anchor::new("root", [NodeSlot::empty()]));
    let mut rule = ViewTestRule::with_store(store);

    let err = rule
        .set_content(ViewParams::new("root"), HostScope::default())
        .expect_err("untyped slot must not render silently");

    assert_eq!(
        err,
        RenderError::Configuration {
            id: NodeId::from("root"),
            index: 0
        }
    );
}

#[test]
fn missing_anchor_renders_one_default_slot() {
    let fallback = RecordingRenderer::new("fallback").shared();
    let mut rule = ViewTestRule::new();

    let output = rule
        .set_content(
            ViewParams::new("fresh").default_renderer(fallback.clone()),
            HostScope::default(),
        )
        .expect("render succeeds");

    assert_slot_kinds(&output, &["fallback"]);
    assert_eq!(fallback.last_props(), Some(PropMap::new()));
    assert!(rule.anchor("fresh").is_none(), "rendering never writes");
}

#[test]
fn unknown_type_is_a_lookup_error_naming_the_type() {
    let text = RecordingRenderer::new("text").shared();
    let store = store_with(Anchor::new(
        "root",
        [NodeSlot::typed("text"), NodeSlot::typed("widget")],
    ));
    let mut rule = ViewTestRule::with_store(store);

    let err = rule
        .set_content(
            ViewParams::new("root"),
            HostScope::new(RendererMap::new().with("text", text.clone())),
        )
        .expect_err("widget is not registered");

    assert_eq!(err.missing_type(), Some(&TypeTag::from("widget")));
    assert!(err.to_string().contains("no renderer registered for type `widget`"));
    // the sibling still rendered
    assert_eq!(text.indices(), vec![0]);
}

#[test]
fn sibling_updates_in_one_pass_both_persist() {
    init_logging();
    let touching = RecordingRenderer::new("field")
        .on_render(|call| {
            if call.props.get("touched").is_none() {
                if let Some(update) = &call.update {
                    update.request(props! { "touched" => call.index });
                }
            }
        })
        .shared();
    let store = store_with(Anchor::new(
        "root",
        [
            NodeSlot::typed("field").with_props(props! { "name" => "a" }),
            NodeSlot::typed("field").with_props(props! { "name" => "b" }),
        ],
    ));
    let mut rule = ViewTestRule::with_store(store);

    rule.set_content(
        ViewParams::new("root"),
        HostScope::new(RendererMap::new().with("field", touching.clone())),
    )
    .expect("render succeeds");

    let anchor = rule.anchor("root").expect("root anchor");
    assert_slot_prop(&anchor, 0, "touched", 0usize);
    assert_slot_prop(&anchor, 1, "touched", 1usize);
    assert_slot_prop(&anchor, 0, "name", "a");
    assert_slot_prop(&anchor, 1, "name", "b");
    assert_eq!(rule.store().revision(), 2);

    rule.pump_until_idle().expect("settles");
    assert_eq!(touching.call_count(), 4);
}

#[test]
fn slots_render_in_order() {
    let item = RecordingRenderer::new("item").shared();
    let heading = RecordingRenderer::new("heading").shared();
    let store = store_with(Anchor::new(
        "root",
        [
            NodeSlot::typed("heading").with_props(props! { "n" => 0 }),
            NodeSlot::typed("item").with_props(props! { "n" => 1 }),
            NodeSlot::typed("item").with_props(props! { "n" => 2 }),
        ],
    ));
    let mut rule = ViewTestRule::with_store(store);

    let output = rule
        .set_content(
            ViewParams::new("root"),
            HostScope::new(
                RendererMap::new()
                    .with("item", item.clone())
                    .with("heading", heading.clone()),
            ),
        )
        .expect("render succeeds");

    assert_slot_kinds(&output, &["heading", "item", "item"]);
    let slots = output.slots().expect("slot list");
    let order: Vec<usize> = slots.iter().map(|slot| slot.index).collect();
    assert_eq!(order, vec![0, 1, 2]);
    for (index, slot) in slots.iter().enumerate() {
        let n = slot.element.props().and_then(|props| props.get("n")).cloned();
        assert_eq!(n, Some(PropValue::from(index)));
    }
}

#[test]
fn update_merges_instead_of_replacing() {
    let text = RecordingRenderer::new("text").shared();
    let store = store_with(Anchor::new(
        "root",
        [NodeSlot::typed("text").with_props(props! { "value" => "hi", "size" => 12 })],
    ));
    let mut rule = ViewTestRule::with_store(store);
    rule.set_content(
        ViewParams::new("root"),
        HostScope::new(RendererMap::new().with("text", text.clone())),
    )
    .expect("render succeeds");

    let update = text.last_update(0).expect("update handle");
    update.request(props! { "a" => 1 });
    update.request(props! { "size" => 14 });

    assert_eq!(
        slot_props(&rule.anchor("root").expect("root"), 0),
        props! { "value" => "hi", "size" => 14, "a" => 1 }
    );
}

#[test]
fn readonly_host_renders_without_update_handles() {
    let text = RecordingRenderer::new("text").shared();
    let store = store_with(Anchor::new("root", [NodeSlot::typed("text")]));
    let mut rule = ViewTestRule::with_store(store);

    rule.set_content(
        ViewParams::new("root"),
        HostScope::new(RendererMap::new().with("text", text.clone())).readonly(true),
    )
    .expect("render succeeds");

    let calls = text.calls();
    assert!(calls[0].readonly);
    assert!(calls[0].update.is_none());
}

#[test]
fn identity_commit_leaves_the_tree_untouched() {
    let text = RecordingRenderer::new("text").shared();
    let store = store_with(Anchor::new(
        "root",
        [NodeSlot::typed("text").with_props(props! { "value" => "hi" })],
    ));
    let mut rule = ViewTestRule::with_store(store);
    rule.set_content(
        ViewParams::new("root"),
        HostScope::new(RendererMap::new().with("text", text.clone())),
    )
    .expect("render succeeds");
    let before = rule.anchor("root").expect("root");

    let root = NodeId::from("root");
    for _ in 0..2 {
        rule.store()
            .setter()
            .set(&root, |anchor| Anchor::or_empty(anchor, &NodeId::from("root")));
    }
    rule.pump_until_idle().expect("idle");

    let after = rule.anchor("root").expect("root");
    assert_shared(&after, &before, "identity commit");
    assert_same_content(&after, &before, "identity commit");
    assert_eq!(rule.store().revision(), 0);
    assert_eq!(text.call_count(), 1);
}
