// SPDX-License-Identifier: MIT OR Apache-2.0
//! Block graph compiler for LunaBlocks.
//!
//! Turns a validated block graph into Lua source and advisory diagnostics:
//! - Per-type emitter registry with continuation-passing statement emission
//! - Lvalue indirection through a separate setter registry
//! - Context propagation analysis over enclosing scopes
//!
//! Both passes are pure, synchronous functions of `(graph, registry)`; the
//! registry is built once at startup (see [`blocks::standard_registry`])
//! and never mutated afterwards.

pub mod blocks;
pub mod context;
pub mod emit;
pub mod fragment;
pub mod registry;

pub use context::{Diagnostic, Fact, Resolution, Severity, TriState};
pub use emit::{EmitCtx, STATEMENT_TAG};
pub use fragment::{Fragment, Precedence};
pub use registry::{BlockSpec, Emitter, Registry, SetterFn, StatementFn, ValueFn};

use lunablocks_graph::{Graph, NodeId};

/// Output of a compile pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled {
    /// Generated Lua source; possibly containing runtime-error sentinels,
    /// never invalid syntax
    pub source: String,
    /// Advisory context diagnostics, in deterministic order
    pub diagnostics: Vec<Diagnostic>,
}

/// Fatal compile failure.
///
/// The only way a compile pass can fail: the graph's structural invariants
/// were bypassed and a walk revisited a node. Everything else (empty slots,
/// unregistered emitters, unsatisfied context requirements) is recovered
/// locally as sentinels or warnings.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// A node was reached twice during one descent
    #[error("corrupt graph: node {0:?} revisited during generation")]
    CorruptGraph(NodeId),
}

/// Compile a graph snapshot: generate source, then analyze context.
///
/// Pure and deterministic; identical snapshots yield byte-identical source
/// and identically ordered diagnostics.
pub fn compile(graph: &Graph, registry: &Registry) -> Result<Compiled, CompileError> {
    tracing::debug!(graph = %graph.name, "compiling block graph");
    let source = emit::generate(graph, registry)?;
    let diagnostics = context::analyze(graph, registry)?;
    tracing::debug!(
        graph = %graph.name,
        warnings = diagnostics.len(),
        "compile pass finished"
    );
    Ok(Compiled {
        source,
        diagnostics,
    })
}
