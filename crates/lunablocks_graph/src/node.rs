// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node type shapes and node instances.

use crate::slot::{Slot, SlotSpec, TypeSet};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// A literal entered directly on a node (text box, number box, checkbox,
/// dropdown choice).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Free text or a dropdown choice
    Text(String),
    /// Numeric literal
    Number(f64),
    /// Checkbox state
    Bool(bool),
}

impl FieldValue {
    /// The text content, if this is a text field.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// The shape of a node type: which connectors it exposes and what they
/// accept or produce.
///
/// `previous` carries the tags the node *produces* on its statement
/// connector (what it claims to be when linked under a predecessor or into
/// a body slot); `next` carries the tags it *accepts* from a successor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeType {
    /// Unique type identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Produced tags when used as a value, `None` if the node produces no value
    pub output: Option<TypeSet>,
    /// Produced tags on the previous-statement connector, `None` if absent
    pub previous: Option<TypeSet>,
    /// Accepted tags for a successor statement, `None` if the node cannot chain
    pub next: Option<TypeSet>,
    /// Declared slots, in display order
    pub slots: Vec<SlotSpec>,
}

impl NodeType {
    /// Start a shape with no connectors and no slots.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            output: None,
            previous: None,
            next: None,
            slots: Vec::new(),
        }
    }

    /// Declare a value output with the given produced tags.
    pub fn output(mut self, tags: TypeSet) -> Self {
        self.output = Some(tags);
        self
    }

    /// Declare a previous-statement connector producing the given tags.
    pub fn previous(mut self, tags: TypeSet) -> Self {
        self.previous = Some(tags);
        self
    }

    /// Declare a next-statement connector accepting the given tags.
    pub fn next(mut self, tags: TypeSet) -> Self {
        self.next = Some(tags);
        self
    }

    /// Add a value slot.
    pub fn value_slot(mut self, name: impl Into<String>, accepts: TypeSet) -> Self {
        self.slots.push(SlotSpec::value(name, accepts));
        self
    }

    /// Add a body slot.
    pub fn body_slot(mut self, name: impl Into<String>, accepts: TypeSet) -> Self {
        self.slots.push(SlotSpec::body(name, accepts));
        self
    }

    /// Look up a slot spec by name.
    pub fn slot(&self, name: &str) -> Option<&SlotSpec> {
        self.slots.iter().find(|s| s.name == name)
    }
}

/// Where a node currently sits.
///
/// A node occupies exactly one position: floating at top level, plugged
/// into one slot, or chained as one node's successor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attachment {
    /// Floating at the top level of the graph
    TopLevel,
    /// Plugged into `parent`'s slot
    Slot {
        /// Owning node
        parent: NodeId,
        /// Name of the slot on the owner
        slot: String,
    },
    /// Chained as the successor of `prev`
    Next {
        /// Predecessor in the statement chain
        prev: NodeId,
    },
}

/// A node instance in the graph.
///
/// Connector tag sets and slot specs are cloned from the [`NodeType`] at
/// creation, so a graph is self-contained once built and edits validate
/// without the registry. Structural links are private; they are created and broken only
/// through [`crate::Graph`], which gates every edit through the connection
/// checker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Node type ID
    pub type_id: String,
    /// Field literals by field name
    pub fields: IndexMap<String, FieldValue>,
    pub(crate) output: Option<TypeSet>,
    pub(crate) previous: Option<TypeSet>,
    pub(crate) next_accepts: Option<TypeSet>,
    pub(crate) slots: IndexMap<String, Slot>,
    pub(crate) next: Option<NodeId>,
    pub(crate) attachment: Attachment,
}

impl Node {
    /// Create a new detached node from a type definition
    pub fn new(node_type: &NodeType) -> Self {
        Self {
            id: NodeId::new(),
            type_id: node_type.id.clone(),
            fields: IndexMap::new(),
            output: node_type.output.clone(),
            previous: node_type.previous.clone(),
            next_accepts: node_type.next.clone(),
            slots: node_type
                .slots
                .iter()
                .map(|s| (s.name.clone(), Slot::from_spec(s)))
                .collect(),
            next: None,
            attachment: Attachment::TopLevel,
        }
    }

    /// Set a field literal, builder style.
    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Set a field literal.
    pub fn set_field(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    /// Get a field literal by name.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Produced tags when the node is used as a value, if it produces one.
    pub fn output(&self) -> Option<&TypeSet> {
        self.output.as_ref()
    }

    /// Produced tags on the previous-statement connector, if present.
    pub fn previous_tags(&self) -> Option<&TypeSet> {
        self.previous.as_ref()
    }

    /// Accepted tags for a successor statement, if the node can chain.
    pub fn next_accepts(&self) -> Option<&TypeSet> {
        self.next_accepts.as_ref()
    }

    /// A slot instance by name.
    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.get(name)
    }

    /// All slot instances, in declaration order.
    pub fn slots(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.slots.iter().map(|(n, s)| (n.as_str(), s))
    }

    /// The child plugged into a slot, if any.
    pub fn slot_target(&self, slot: &str) -> Option<NodeId> {
        self.slots.get(slot).and_then(Slot::child)
    }

    /// The successor statement, if any.
    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    /// Where this node currently sits.
    pub fn attachment(&self) -> &Attachment {
        &self.attachment
    }
}

/// Registry of node type shapes, built once at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeTypeRegistry {
    types: IndexMap<String, NodeType>,
}

impl NodeTypeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            types: IndexMap::new(),
        }
    }

    /// Register a node type
    pub fn register(&mut self, node_type: NodeType) {
        self.types.insert(node_type.id.clone(), node_type);
    }

    /// Get a node type by ID
    pub fn get(&self, id: &str) -> Option<&NodeType> {
        self.types.get(id)
    }

    /// Get all registered types
    pub fn types(&self) -> impl Iterator<Item = &NodeType> {
        self.types.values()
    }

    /// Create a detached node from a type ID
    pub fn create_node(&self, type_id: &str) -> Option<Node> {
        self.get(type_id).map(Node::new)
    }
}
