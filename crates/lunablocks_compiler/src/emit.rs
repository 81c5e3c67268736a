// SPDX-License-Identifier: MIT OR Apache-2.0
//! The code generator: a pure recursive descent over the slot forest and the
//! statement chains.
//!
//! Statement emission is continuation-passing: an emitter asks for its
//! successor's *already rendered* code via [`EmitCtx::next`] and decides how
//! to splice it. That is what lets an `if`/`elif`/`else` run fold into one
//! Lua construct with a single `end`, lets a match chain share one
//! terminator, and lets a continuation-capture block wrap everything after
//! itself into a function.
//!
//! Generation is total: empty slots and unregistered types render as
//! sentinel Lua that fails at runtime rather than breaking the syntax.

use crate::fragment::{
    indent, missing_value, unimplemented_statement, unimplemented_value, unsupported_target,
    Fragment, Precedence,
};
use crate::registry::{Emitter, Registry};
use crate::CompileError;
use lunablocks_graph::{Graph, Node, NodeId};
use std::collections::HashSet;

/// Tag a block must produce on its previous connector to head a top-level
/// chain. Chain links like `elif` or `case` produce only their folding tags
/// and are meaningless outside the construct they splice into.
pub const STATEMENT_TAG: &str = "code";

/// Services an emitter uses to render its node.
pub struct EmitCtx<'a> {
    graph: &'a Graph,
    registry: &'a Registry,
    rendering: HashSet<NodeId>,
}

impl<'a> EmitCtx<'a> {
    fn new(graph: &'a Graph, registry: &'a Registry) -> Self {
        Self {
            graph,
            registry,
            rendering: HashSet::new(),
        }
    }

    /// The graph being compiled.
    pub fn graph(&self) -> &'a Graph {
        self.graph
    }

    /// Rendered code for the child plugged into a value slot, parenthesized
    /// as needed for `context`. An empty slot renders the missing-value
    /// sentinel so generation stays total.
    pub fn value(
        &mut self,
        node: &Node,
        slot: &str,
        context: Precedence,
    ) -> Result<String, CompileError> {
        match node.slot_target(slot) {
            Some(child) => {
                let fragment = self.render_value(child)?;
                Ok(fragment.in_context(context))
            }
            None => Ok(missing_value().in_context(context)),
        }
    }

    /// Rendered code for a nested statement chain, indented one step. An
    /// empty body renders as the empty string.
    pub fn body(&mut self, node: &Node, slot: &str) -> Result<String, CompileError> {
        match node.slot_target(slot) {
            Some(head) => {
                let code = self.render_statement(head)?;
                Ok(indent(&code))
            }
            None => Ok(String::new()),
        }
    }

    /// The already-rendered code of this node's successor chain, empty when
    /// there is none. The caller decides whether and how to splice it.
    pub fn next(&mut self, node: &Node) -> Result<String, CompileError> {
        match node.next() {
            Some(next) => self.render_statement(next),
            None => Ok(String::new()),
        }
    }

    /// The type ID of this node's successor, for chain-folding decisions.
    pub fn next_type(&self, node: &Node) -> Option<&'a str> {
        self.graph.node_type(node.next()?)
    }

    /// Lvalue indirection: render an assignment to `target` of the given
    /// value expression via the target type's setter. A type without a
    /// registered setter renders a sentinel statement; the pass continues.
    pub fn setter(&mut self, target: &Node, value_code: &str) -> Result<String, CompileError> {
        match self.registry.setter(&target.type_id) {
            Some(f) => f(self, target, value_code),
            None => Ok(unsupported_target(&target.type_id)),
        }
    }

    /// Render one statement (its emitter pulls the rest of the chain).
    fn render_statement(&mut self, id: NodeId) -> Result<String, CompileError> {
        let node = self.enter(id)?;
        match self.registry.emitter(&node.type_id) {
            Some(Emitter::Statement(f)) => f(self, node),
            // Unregistered (or mis-registered) types render an inert
            // sentinel statement and still splice their continuation.
            Some(Emitter::Value(_)) | None => {
                let next = self.next(node)?;
                Ok(format!("{}{next}", unimplemented_statement(&node.type_id)))
            }
        }
    }

    fn render_value(&mut self, id: NodeId) -> Result<Fragment, CompileError> {
        let node = self.enter(id)?;
        match self.registry.emitter(&node.type_id) {
            Some(Emitter::Value(f)) => f(self, node),
            Some(Emitter::Statement(_)) | None => Ok(unimplemented_value(&node.type_id)),
        }
    }

    /// Cycle defense: a node re-entered while still being rendered means the
    /// structural invariants were bypassed; abort the whole pass.
    fn enter(&mut self, id: NodeId) -> Result<&'a Node, CompileError> {
        if !self.rendering.insert(id) {
            return Err(CompileError::CorruptGraph(id));
        }
        self.graph.node(id).ok_or(CompileError::CorruptGraph(id))
    }
}

/// Generate the full source for a graph.
///
/// Every top-level statement chain is rendered in graph insertion order;
/// floating value nodes (an expression not plugged anywhere) and orphan
/// chain links produce no code. The result is a function of the snapshot
/// alone.
pub fn generate(graph: &Graph, registry: &Registry) -> Result<String, CompileError> {
    let mut ctx = EmitCtx::new(graph, registry);
    let mut chains = Vec::new();
    for node in graph.top_level_nodes() {
        // A pure value shape cannot head a statement chain.
        if node.output().is_some() && node.previous_tags().is_none() {
            continue;
        }
        // An orphan mid-chain link would render an unclosed splice (a bare
        // `elseif`); suppressing the whole chain keeps the output loadable.
        if node
            .previous_tags()
            .is_some_and(|tags| !tags.is_any() && !tags.contains(STATEMENT_TAG))
        {
            continue;
        }
        let code = ctx.render_statement(node.id)?;
        let trimmed = code.trim_end();
        if !trimmed.is_empty() {
            chains.push(trimmed.to_string());
        }
    }
    if chains.is_empty() {
        return Ok(String::new());
    }
    let mut out = chains.join("\n\n");
    out.push('\n');
    tracing::debug!(nodes = graph.node_count(), bytes = out.len(), "generated source");
    Ok(out)
}
