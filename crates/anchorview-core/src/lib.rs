#![doc = r"Anchor tree model, setters and lens composition for Anchorview."]

pub mod anchor;
pub mod collections;
pub mod fingerprint;
pub mod lens;
pub mod path;
pub mod setter;
pub mod store;
mod value;

pub use anchor::{
    merge_slot_props, replace_nodes, set_child_anchor, Anchor, ChildMap, NodeId, NodeSlot,
    SlotType, TypeTag,
};
pub use fingerprint::Fingerprint;
pub use lens::{LensCache, LensOwner};
pub use path::{AnchorPath, PathSegment};
pub use setter::{AnchorUpdate, Setter, SetterSource};
pub use store::{RootStore, Subscription};
pub use value::{PropMap, PropValue};
