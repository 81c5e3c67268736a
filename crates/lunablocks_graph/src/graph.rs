// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure: node storage plus checker-gated structural edits.
//!
//! The graph owns two link structures: the value/body slot forest and the
//! next/previous statement chains. Every node occupies exactly one position
//! (top level, one slot, or one successor link), and both structures stay
//! acyclic because only detached nodes may be attached and an ancestry check
//! rejects re-parenting a node under its own subtree.

use crate::checker::ConnectionChecker;
use crate::node::{Attachment, FieldValue, Node, NodeId};
use crate::slot::SlotKind;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A block graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// Graph name
    pub name: String,
    nodes: IndexMap<NodeId, Node>,
    #[serde(skip)]
    checker: ConnectionChecker,
}

impl Graph {
    /// Create a new empty graph with the default (tag-only) checker.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            checker: ConnectionChecker::new(),
        }
    }

    /// Replace the connection checker (e.g. to install a structural veto).
    pub fn set_checker(&mut self, checker: ConnectionChecker) {
        self.checker = checker;
    }

    /// Add a detached node to the graph.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID (fields only; links are edited through the
    /// gated operations).
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// All nodes, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// The number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes floating at the top level, in insertion order.
    pub fn top_level_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes
            .values()
            .filter(|n| matches!(n.attachment, Attachment::TopLevel))
    }

    /// The type ID of a node.
    pub fn node_type(&self, node_id: NodeId) -> Option<&str> {
        self.nodes.get(&node_id).map(|n| n.type_id.as_str())
    }

    /// The child plugged into a slot.
    pub fn slot_target(&self, node_id: NodeId, slot: &str) -> Option<NodeId> {
        self.nodes.get(&node_id)?.slot_target(slot)
    }

    /// A field literal on a node.
    pub fn field_value(&self, node_id: NodeId, name: &str) -> Option<&FieldValue> {
        self.nodes.get(&node_id)?.field(name)
    }

    /// The successor statement of a node.
    pub fn next_statement(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes.get(&node_id)?.next()
    }

    /// The node that lexically encloses `node_id`: walk the statement chain
    /// back to its head, then to the owner of the slot it sits in.
    ///
    /// The walk is bounded; attachments that loop (possible only in a
    /// hand-edited snapshot) resolve to `None` instead of hanging.
    pub fn surrounding_parent(&self, node_id: NodeId) -> Option<NodeId> {
        let mut seen = HashSet::new();
        let mut cur = node_id;
        loop {
            if !seen.insert(cur) {
                return None;
            }
            match &self.nodes.get(&cur)?.attachment {
                Attachment::TopLevel => return None,
                Attachment::Next { prev } => cur = *prev,
                Attachment::Slot { parent, .. } => return Some(*parent),
            }
        }
    }

    /// Plug a detached node into a slot.
    ///
    /// The edit is validated (tags, occupancy, acyclicity, structural veto)
    /// before anything is mutated; a rejection leaves the graph unchanged.
    pub fn plug(
        &mut self,
        child: NodeId,
        parent: NodeId,
        slot: &str,
    ) -> Result<(), ConnectionError> {
        let child_node = self
            .nodes
            .get(&child)
            .ok_or(ConnectionError::NodeNotFound(child))?;
        let parent_node = self
            .nodes
            .get(&parent)
            .ok_or(ConnectionError::NodeNotFound(parent))?;

        if !matches!(child_node.attachment, Attachment::TopLevel) {
            return Err(ConnectionError::AlreadyAttached(child));
        }
        let slot_inst = parent_node
            .slot(slot)
            .ok_or_else(|| ConnectionError::SlotNotFound(slot.to_string()))?;
        if slot_inst.child().is_some() {
            return Err(ConnectionError::AlreadyOccupied);
        }

        // A value slot consumes the child's output connector, a body slot its
        // previous-statement connector.
        let produced = match slot_inst.kind {
            SlotKind::Value => child_node.output.as_ref(),
            SlotKind::Body => child_node.previous.as_ref(),
        }
        .ok_or(ConnectionError::NoSuchConnector)?;

        if !self.checker.check_tags(produced, &slot_inst.accepts) {
            return Err(ConnectionError::Incompatible);
        }
        if self.is_in_subtree_of(parent, child) {
            return Err(ConnectionError::WouldCycle);
        }
        if !self.checker.check_structure(self, child, parent) {
            return Err(ConnectionError::Vetoed);
        }

        let slot_name = slot.to_string();
        if let Some(p) = self.nodes.get_mut(&parent) {
            if let Some(s) = p.slots.get_mut(&slot_name) {
                s.child = Some(child);
            }
        }
        if let Some(c) = self.nodes.get_mut(&child) {
            c.attachment = Attachment::Slot {
                parent,
                slot: slot_name,
            };
        }
        Ok(())
    }

    /// Link a detached node as the successor of `prev`.
    pub fn link_next(&mut self, prev: NodeId, child: NodeId) -> Result<(), ConnectionError> {
        let prev_node = self
            .nodes
            .get(&prev)
            .ok_or(ConnectionError::NodeNotFound(prev))?;
        let child_node = self
            .nodes
            .get(&child)
            .ok_or(ConnectionError::NodeNotFound(child))?;

        if !matches!(child_node.attachment, Attachment::TopLevel) {
            return Err(ConnectionError::AlreadyAttached(child));
        }
        let accepted = prev_node
            .next_accepts
            .as_ref()
            .ok_or(ConnectionError::NoSuchConnector)?;
        if prev_node.next.is_some() {
            return Err(ConnectionError::AlreadyOccupied);
        }
        let produced = child_node
            .previous
            .as_ref()
            .ok_or(ConnectionError::NoSuchConnector)?;

        if !self.checker.check_tags(produced, accepted) {
            return Err(ConnectionError::Incompatible);
        }
        if self.is_in_subtree_of(prev, child) {
            return Err(ConnectionError::WouldCycle);
        }
        if !self.checker.check_structure(self, child, prev) {
            return Err(ConnectionError::Vetoed);
        }

        if let Some(p) = self.nodes.get_mut(&prev) {
            p.next = Some(child);
        }
        if let Some(c) = self.nodes.get_mut(&child) {
            c.attachment = Attachment::Next { prev };
        }
        Ok(())
    }

    /// Detach a node from its current position, keeping its subtree intact.
    /// A top-level node is left as-is.
    pub fn unplug(&mut self, node_id: NodeId) -> Result<(), ConnectionError> {
        let attachment = self
            .nodes
            .get(&node_id)
            .ok_or(ConnectionError::NodeNotFound(node_id))?
            .attachment
            .clone();

        match attachment {
            Attachment::TopLevel => {}
            Attachment::Slot { parent, slot } => {
                if let Some(p) = self.nodes.get_mut(&parent) {
                    if let Some(s) = p.slots.get_mut(&slot) {
                        s.child = None;
                    }
                }
            }
            Attachment::Next { prev } => {
                if let Some(p) = self.nodes.get_mut(&prev) {
                    p.next = None;
                }
            }
        }
        if let Some(n) = self.nodes.get_mut(&node_id) {
            n.attachment = Attachment::TopLevel;
        }
        Ok(())
    }

    /// Detach a node and remove it together with everything below it: slot
    /// children recursively and the entire successor chain.
    pub fn remove_subtree(&mut self, node_id: NodeId) -> Result<(), ConnectionError> {
        self.unplug(node_id)?;
        let mut doomed = Vec::new();
        self.collect_subtree(node_id, &mut doomed);
        for id in doomed {
            self.nodes.shift_remove(&id);
        }
        Ok(())
    }

    fn collect_subtree(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        out.push(node_id);
        let Some(node) = self.nodes.get(&node_id) else {
            return;
        };
        for (_, slot) in node.slots() {
            if let Some(child) = slot.child() {
                self.collect_subtree(child, out);
            }
        }
        if let Some(next) = node.next {
            self.collect_subtree(next, out);
        }
    }

    /// Whether `candidate` sits anywhere inside the subtree rooted at `root`
    /// (slot descent and next chains). Equal IDs count as inside.
    fn is_in_subtree_of(&self, candidate: NodeId, root: NodeId) -> bool {
        if candidate == root {
            return true;
        }
        let Some(node) = self.nodes.get(&root) else {
            return false;
        };
        for (_, slot) in node.slots() {
            if let Some(child) = slot.child() {
                if self.is_in_subtree_of(candidate, child) {
                    return true;
                }
            }
        }
        match node.next {
            Some(next) => self.is_in_subtree_of(candidate, next),
            None => false,
        }
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Error when attempting a structural edit
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Node not found
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Slot not found on the target node
    #[error("slot not found: {0}")]
    SlotNotFound(String),

    /// The node lacks the connector this edit needs
    #[error("node has no suitable connector")]
    NoSuchConnector,

    /// Type tags do not match
    #[error("incompatible type tags")]
    Incompatible,

    /// The slot or next link is already occupied
    #[error("connection point already occupied")]
    AlreadyOccupied,

    /// The node is already attached somewhere; unplug it first
    #[error("node already attached: {0:?}")]
    AlreadyAttached(NodeId),

    /// The edit would create a cycle
    #[error("edit would create a cycle")]
    WouldCycle,

    /// The structural veto hook rejected the edit
    #[error("connection vetoed")]
    Vetoed,
}
