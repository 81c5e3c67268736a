// SPDX-License-Identifier: MIT OR Apache-2.0
//! Slot definitions and nominal type tag sets.

use serde::{Deserialize, Serialize};

/// A set of nominal type tags.
///
/// Tags are plain strings; matching is set membership, not subtyping.
/// The empty set is the wildcard: it accepts (or can plug into) anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSet(Vec<String>);

impl TypeSet {
    /// The wildcard set, compatible with everything.
    pub fn any() -> Self {
        Self(Vec::new())
    }

    /// Build a set from a list of tags.
    pub fn of<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tags.into_iter().map(Into::into).collect())
    }

    /// Whether this set is the wildcard.
    pub fn is_any(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the set contains a specific tag.
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    /// The tags in this set.
    pub fn tags(&self) -> &[String] {
        &self.0
    }

    /// Check whether a producer declaring `self` may attach to a consumer
    /// accepting `accepted`. Either side being the wildcard matches; otherwise
    /// the sets must intersect.
    pub fn matches(&self, accepted: &TypeSet) -> bool {
        if self.is_any() || accepted.is_any() {
            return true;
        }
        self.0.iter().any(|t| accepted.contains(t))
    }
}

/// What a slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotKind {
    /// An expression child (the node's value plugs in).
    Value,
    /// The head of a nested statement chain (a body).
    Body,
}

/// A named attachment point declared by a node type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotSpec {
    /// Slot name, unique within the node type.
    pub name: String,
    /// Whether the slot holds a value or a statement body.
    pub kind: SlotKind,
    /// Tags accepted from a child plugged here.
    pub accepts: TypeSet,
}

impl SlotSpec {
    /// Declare a value slot.
    pub fn value(name: impl Into<String>, accepts: TypeSet) -> Self {
        Self {
            name: name.into(),
            kind: SlotKind::Value,
            accepts,
        }
    }

    /// Declare a body slot.
    pub fn body(name: impl Into<String>, accepts: TypeSet) -> Self {
        Self {
            name: name.into(),
            kind: SlotKind::Body,
            accepts,
        }
    }
}

/// A slot instance on a node: the declared spec plus the plugged child.
///
/// Nodes clone their slot specs from their [`crate::NodeType`] at creation,
/// so the graph can validate edits without consulting the type registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    /// Whether the slot holds a value or a statement body.
    pub kind: SlotKind,
    /// Tags accepted from a child plugged here.
    pub accepts: TypeSet,
    pub(crate) child: Option<crate::NodeId>,
}

impl Slot {
    pub(crate) fn from_spec(spec: &SlotSpec) -> Self {
        Self {
            kind: spec.kind,
            accepts: spec.accepts.clone(),
            child: None,
        }
    }

    /// The child plugged into this slot, if any.
    pub fn child(&self) -> Option<crate::NodeId> {
        self.child
    }
}
