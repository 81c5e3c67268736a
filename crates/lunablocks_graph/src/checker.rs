// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection compatibility checking.
//!
//! Tag matching is pure set membership (see [`TypeSet::matches`]). On top of
//! that, a checker may carry a *structural veto*: a predicate over the two
//! nodes involved that can forbid a connection even when the tags line up
//! (e.g. a loop-exit block with no enclosing loop). The veto policy is
//! injected by the editing surface; the default checker has none.

use crate::graph::Graph;
use crate::node::NodeId;
use crate::slot::TypeSet;

/// Tag-level compatibility: does a producer declaring `produced` fit a
/// consumer accepting `accepted`?
///
/// True iff either set is the wildcard or the sets intersect. Pure; a
/// rejection is just `false`, never an error.
pub fn can_connect(produced: &TypeSet, accepted: &TypeSet) -> bool {
    produced.matches(accepted)
}

/// Structural veto predicate. Returns `false` to forbid the connection.
///
/// `producer` is the node being attached; `consumer` is the node it attaches
/// to (slot owner or chain predecessor).
pub type VetoFn = fn(graph: &Graph, producer: NodeId, consumer: NodeId) -> bool;

/// Gate for structural edits.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectionChecker {
    veto: Option<VetoFn>,
}

impl ConnectionChecker {
    /// A checker with tag matching only.
    pub fn new() -> Self {
        Self { veto: None }
    }

    /// Attach a structural veto predicate.
    pub fn with_veto(veto: VetoFn) -> Self {
        Self { veto: Some(veto) }
    }

    /// Tag-level check, identical to the free function.
    pub fn check_tags(&self, produced: &TypeSet, accepted: &TypeSet) -> bool {
        can_connect(produced, accepted)
    }

    /// Run the structural veto, if any. `true` when no veto is installed.
    pub fn check_structure(&self, graph: &Graph, producer: NodeId, consumer: NodeId) -> bool {
        match self.veto {
            Some(veto) => veto(graph, producer, consumer),
            None => true,
        }
    }
}
