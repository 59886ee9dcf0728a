//! Absolute addresses of nested anchors.
//!
//! Views never need paths: lenses let them commit without knowing where they
//! live. Paths exist for the host side, to inspect or edit a nested anchor
//! from outside the render tree. [`AnchorPath::commit`] composes the same
//! per-level step a lens performs, so both routes produce identical trees.

use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::anchor::{set_child_anchor, Anchor, ChildMap, NodeId};
use crate::setter::{AnchorUpdate, Setter};

/// One hop: the slot index in the parent anchor and the child's id there.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathSegment {
    pub index: usize,
    pub child_id: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AnchorPath {
    root: NodeId,
    segments: SmallVec<[PathSegment; 4]>,
}

impl AnchorPath {
    pub fn root(id: impl Into<NodeId>) -> Self {
        Self {
            root: id.into(),
            segments: SmallVec::new(),
        }
    }

    pub fn child(mut self, index: usize, child_id: impl Into<NodeId>) -> Self {
        self.segments.push(PathSegment {
            index,
            child_id: child_id.into(),
        });
        self
    }

    pub fn root_id(&self) -> &NodeId {
        &self.root
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Id of the anchor this path points at.
    pub fn leaf_id(&self) -> &NodeId {
        self.segments
            .last()
            .map(|segment| &segment.child_id)
            .unwrap_or(&self.root)
    }

    /// Looks the addressed anchor up in a root snapshot.
    pub fn resolve(&self, root: &ChildMap) -> Option<Rc<Anchor>> {
        let mut anchor = root.get(&self.root)?.clone();
        for segment in &self.segments {
            let next = anchor
                .slot(segment.index)?
                .anchors
                .as_ref()?
                .get(&segment.child_id)?
                .clone();
            anchor = next;
        }
        Some(anchor)
    }

    /// Applies `update` to the addressed anchor through `root_setter`,
    /// creating any missing intermediate anchors and slots.
    pub fn commit<'a, F>(&'a self, root_setter: &Setter, update: F)
    where
        F: FnOnce(Option<Rc<Anchor>>) -> Rc<Anchor> + 'a,
    {
        let update = nest(&self.root, &self.segments, Box::new(update));
        root_setter.apply(&self.root, update);
    }
}

fn nest<'a>(
    parent_id: &'a NodeId,
    segments: &'a [PathSegment],
    update: AnchorUpdate<'a>,
) -> AnchorUpdate<'a> {
    match segments.split_first() {
        None => update,
        Some((segment, rest)) => {
            let inner = nest(&segment.child_id, rest, update);
            Box::new(move |anchor| {
                set_child_anchor(anchor, parent_id, segment.index, &segment.child_id, inner)
            })
        }
    }
}

impl fmt::Display for AnchorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root)?;
        for segment in &self.segments {
            write!(f, "/{}:{}", segment.index, segment.child_id)?;
        }
        Ok(())
    }
}
