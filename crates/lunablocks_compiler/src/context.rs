// SPDX-License-Identifier: MIT OR Apache-2.0
//! Context propagation analysis.
//!
//! Block types may assert a tri-state opinion about runtime facts ("the
//! player is loaded") for everything nested in their bodies, and other
//! types may require a fact to resolve to a specific state where they are
//! placed. Resolution walks enclosing scopes innermost to outermost; the
//! first opinion wins. The analysis is advisory: mismatches become warnings
//! and never affect code generation.
//!
//! One deliberate quirk: the complete absence of any opinionated ancestor
//! resolves to the same `Unknown` an ancestor can assert explicitly, so
//! "must resolve unknown" is satisfied by either. See DESIGN.md before
//! changing this.

use crate::registry::Registry;
use crate::CompileError;
use lunablocks_graph::{Attachment, Graph, NodeId, SlotKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A contextual precondition about the runtime situation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fact {
    /// The current player entity is fully loaded
    PlayerLoaded,
    /// Execution is confined to the local host
    HostLocal,
    /// Execution happens inside a per-frame render callback
    RenderTick,
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::PlayerLoaded => "player loaded",
            Self::HostLocal => "host-only",
            Self::RenderTick => "inside a render callback",
        };
        f.write_str(text)
    }
}

/// Resolved (or required) state of a fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriState {
    /// The fact holds
    True,
    /// The fact does not hold
    False,
    /// No opinion, or explicitly ambiguous
    Unknown,
}

impl fmt::Display for TriState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::True => "true",
            Self::False => "false",
            Self::Unknown => "unknown",
        };
        f.write_str(text)
    }
}

/// Diagnostic severity. Context analysis only ever warns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory; generation proceeds unaffected
    Warning,
}

/// An advisory diagnostic attached to one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The requiring node
    pub node: NodeId,
    /// Always [`Severity::Warning`]
    pub severity: Severity,
    /// Human-readable description of the mismatch
    pub message: String,
}

/// Outcome of resolving one fact at one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The resolved state
    pub value: TriState,
    /// Type ID of the ancestor whose opinion won, `None` when nobody had one
    pub source: Option<String>,
}

/// Resolve a fact at a node by walking enclosing scopes innermost to
/// outermost. An ancestor's opinion only applies to nodes reached through
/// one of its body slots; plugging into a value slot does not enter the
/// scope.
///
/// Attachments revisited during the walk mean the forest invariants were
/// bypassed (a hand-edited snapshot); that aborts the whole pass.
pub fn resolve(
    graph: &Graph,
    registry: &Registry,
    node: NodeId,
    fact: Fact,
) -> Result<Resolution, CompileError> {
    let mut seen = HashSet::new();
    let mut cur = node;
    loop {
        if !seen.insert(cur) {
            return Err(CompileError::CorruptGraph(cur));
        }
        let Some(n) = graph.node(cur) else {
            break;
        };
        match n.attachment() {
            Attachment::TopLevel => break,
            Attachment::Next { prev } => cur = *prev,
            Attachment::Slot { parent, slot } => {
                let Some(parent_node) = graph.node(*parent) else {
                    break;
                };
                let entered_body = parent_node
                    .slot(slot)
                    .is_some_and(|s| s.kind == SlotKind::Body);
                if entered_body {
                    if let Some(opinion) = registry
                        .supplies(&parent_node.type_id)
                        .and_then(|m| m.get(&fact))
                    {
                        return Ok(Resolution {
                            value: *opinion,
                            source: Some(parent_node.type_id.clone()),
                        });
                    }
                }
                cur = *parent;
            }
        }
    }
    Ok(Resolution {
        value: TriState::Unknown,
        source: None,
    })
}

/// Run context analysis over the whole graph.
///
/// Diagnostics come out in graph insertion order, then fact declaration
/// order, so identical snapshots always produce identical lists.
pub fn analyze(graph: &Graph, registry: &Registry) -> Result<Vec<Diagnostic>, CompileError> {
    let mut diagnostics = Vec::new();
    for node in graph.nodes() {
        let Some(requirements) = registry.requirements(&node.type_id) else {
            continue;
        };
        for (fact, required) in requirements {
            let resolution = resolve(graph, registry, node.id, *fact)?;
            if resolution.value == *required {
                continue;
            }
            let origin = match &resolution.source {
                Some(source) => format!("nearest opinion comes from enclosing '{source}'"),
                None => "no enclosing scope has an opinion".to_string(),
            };
            diagnostics.push(Diagnostic {
                node: node.id,
                severity: Severity::Warning,
                message: format!(
                    "'{}' requires the {} context to resolve {}, but it resolves {} ({})",
                    node.type_id, fact, required, resolution.value, origin
                ),
            });
        }
    }
    Ok(diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::BlockSpec;
    use lunablocks_graph::{NodeType, TypeSet};

    /// Registry with one supplier scope and two requirers.
    fn fixture_registry() -> Registry {
        let mut registry = Registry::new();
        registry.register(
            BlockSpec::new(
                NodeType::new("player_scope", "Player Scope")
                    .previous(TypeSet::of(["code"]))
                    .body_slot("BODY", TypeSet::of(["code"])),
            )
            .supplies(Fact::PlayerLoaded, TriState::True),
        );
        registry.register(
            BlockSpec::new(
                NodeType::new("ambiguous_scope", "Ambiguous Scope")
                    .previous(TypeSet::of(["code"]))
                    .body_slot("BODY", TypeSet::of(["code"])),
            )
            .supplies(Fact::PlayerLoaded, TriState::Unknown),
        );
        registry.register(
            BlockSpec::new(
                NodeType::new("needs_player", "Needs Player")
                    .previous(TypeSet::of(["code"]))
                    .next(TypeSet::of(["code"])),
            )
            .requires(Fact::PlayerLoaded, TriState::True),
        );
        registry.register(
            BlockSpec::new(
                NodeType::new("needs_ambiguity", "Needs Ambiguity")
                    .previous(TypeSet::of(["code"]))
                    .next(TypeSet::of(["code"])),
            )
            .requires(Fact::PlayerLoaded, TriState::Unknown),
        );
        registry
    }

    #[test]
    fn test_requirement_unsatisfied_without_supplier() {
        let registry = fixture_registry();
        let mut graph = Graph::new("test");
        let requirer = graph.add_node(registry.create_node("needs_player").unwrap());

        let diagnostics = analyze(&graph, &registry).unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].node, requirer);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert!(diagnostics[0].message.contains("no enclosing scope"));
    }

    #[test]
    fn test_requirement_satisfied_inside_supplier() {
        let registry = fixture_registry();
        let mut graph = Graph::new("test");
        let scope = graph.add_node(registry.create_node("player_scope").unwrap());
        let requirer = graph.add_node(registry.create_node("needs_player").unwrap());
        graph.plug(requirer, scope, "BODY").unwrap();

        assert!(analyze(&graph, &registry).unwrap().is_empty());
    }

    #[test]
    fn test_innermost_opinion_shadows_outermost() {
        let registry = fixture_registry();
        let mut graph = Graph::new("test");
        let outer = graph.add_node(registry.create_node("player_scope").unwrap());
        let inner = graph.add_node(registry.create_node("ambiguous_scope").unwrap());
        let requirer = graph.add_node(registry.create_node("needs_player").unwrap());
        graph.plug(inner, outer, "BODY").unwrap();
        graph.plug(requirer, inner, "BODY").unwrap();

        let resolution = resolve(&graph, &registry, requirer, Fact::PlayerLoaded).unwrap();
        assert_eq!(resolution.value, TriState::Unknown);
        assert_eq!(resolution.source.as_deref(), Some("ambiguous_scope"));
        assert_eq!(analyze(&graph, &registry).unwrap().len(), 1);
    }

    #[test]
    fn test_explicit_unknown_equals_absence() {
        // "Must resolve unknown" is satisfied both by an explicit
        // ambiguous ancestor and by no ancestor at all.
        let registry = fixture_registry();
        let mut graph = Graph::new("test");
        let floating = graph.add_node(registry.create_node("needs_ambiguity").unwrap());
        assert!(analyze(&graph, &registry).unwrap().is_empty());

        let scope = graph.add_node(registry.create_node("ambiguous_scope").unwrap());
        graph.plug(floating, scope, "BODY").unwrap();
        assert!(analyze(&graph, &registry).unwrap().is_empty());
    }

    #[test]
    fn test_chain_members_share_the_enclosing_scope() {
        let registry = fixture_registry();
        let mut graph = Graph::new("test");
        let scope = graph.add_node(registry.create_node("player_scope").unwrap());
        let first = graph.add_node(registry.create_node("needs_player").unwrap());
        let second = graph.add_node(registry.create_node("needs_player").unwrap());
        graph.plug(first, scope, "BODY").unwrap();
        graph.link_next(first, second).unwrap();

        assert!(analyze(&graph, &registry).unwrap().is_empty());
    }

    #[test]
    fn test_removed_supplier_invalidates_resolution() {
        let registry = fixture_registry();
        let mut graph = Graph::new("test");
        let scope = graph.add_node(registry.create_node("player_scope").unwrap());
        let requirer = graph.add_node(registry.create_node("needs_player").unwrap());
        graph.plug(requirer, scope, "BODY").unwrap();
        assert!(analyze(&graph, &registry).unwrap().is_empty());

        graph.unplug(requirer).unwrap();
        graph.remove_subtree(scope).unwrap();
        let diagnostics = analyze(&graph, &registry).unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].node, requirer);
    }

    #[test]
    fn test_cyclic_attachments_abort_analysis() {
        let registry = fixture_registry();
        let mut graph = Graph::new("test");
        let head = graph.add_node(registry.create_node("needs_player").unwrap());
        let tail = graph.add_node(registry.create_node("needs_player").unwrap());
        graph.link_next(head, tail).unwrap();

        // Forge a snapshot whose attachments loop: the chain head claims
        // its own tail as predecessor. Only a hand-edited save can look
        // like this; the gated mutations refuse to build it.
        let text = ron::to_string(&graph).unwrap();
        let forged = text.replace("TopLevel", &format!("Next(prev:(\"{}\"))", tail.0));
        let corrupt: Graph = ron::from_str(&forged).unwrap();

        assert!(matches!(
            analyze(&corrupt, &registry),
            Err(CompileError::CorruptGraph(_))
        ));
    }
}
