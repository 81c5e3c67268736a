// SPDX-License-Identifier: MIT OR Apache-2.0
//! The block registry: shapes plus compile-time behavior per node type.
//!
//! A [`Registry`] is built once at startup from [`BlockSpec`] declarations
//! and treated as immutable afterwards. It is threaded explicitly through
//! [`crate::compile`], so independent registries (e.g. in tests) never
//! contaminate each other.

use crate::context::{Fact, TriState};
use crate::emit::EmitCtx;
use crate::fragment::Fragment;
use crate::CompileError;
use indexmap::IndexMap;
use lunablocks_graph::{Node, NodeType, NodeTypeRegistry};

/// Emitter for a statement-shaped node. Receives the emit context and the
/// node; splices its own continuation via [`EmitCtx::next`].
pub type StatementFn = fn(&mut EmitCtx<'_>, &Node) -> Result<String, CompileError>;

/// Emitter for a value-shaped node. Returns code plus a precedence hint.
pub type ValueFn = fn(&mut EmitCtx<'_>, &Node) -> Result<Fragment, CompileError>;

/// Setter emitter, used when a node of this type is plugged as an
/// assignment target. Receives the target node and the already-rendered
/// value expression.
pub type SetterFn = fn(&mut EmitCtx<'_>, &Node, &str) -> Result<String, CompileError>;

/// How a node type renders.
#[derive(Clone, Copy)]
pub enum Emitter {
    /// Renders as a statement within a chain
    Statement(StatementFn),
    /// Renders as a value expression
    Value(ValueFn),
}

/// Declaration of one block type: its shape plus its compile behavior.
pub struct BlockSpec {
    shape: NodeType,
    emitter: Option<Emitter>,
    setter: Option<SetterFn>,
    supplies: IndexMap<Fact, TriState>,
    requires: IndexMap<Fact, TriState>,
}

impl BlockSpec {
    /// Start a spec from a shape.
    pub fn new(shape: NodeType) -> Self {
        Self {
            shape,
            emitter: None,
            setter: None,
            supplies: IndexMap::new(),
            requires: IndexMap::new(),
        }
    }

    /// Attach a statement emitter.
    pub fn emit_statement(mut self, f: StatementFn) -> Self {
        self.emitter = Some(Emitter::Statement(f));
        self
    }

    /// Attach a value emitter.
    pub fn emit_value(mut self, f: ValueFn) -> Self {
        self.emitter = Some(Emitter::Value(f));
        self
    }

    /// Attach a setter emitter, making this type usable as an assignment
    /// target.
    pub fn setter(mut self, f: SetterFn) -> Self {
        self.setter = Some(f);
        self
    }

    /// Assert a context fact for every node inside this type's bodies.
    pub fn supplies(mut self, fact: Fact, value: TriState) -> Self {
        self.supplies.insert(fact, value);
        self
    }

    /// Require a context fact to resolve to exactly `value` wherever a node
    /// of this type is placed.
    pub fn requires(mut self, fact: Fact, value: TriState) -> Self {
        self.requires.insert(fact, value);
        self
    }
}

/// Registry of block types, keyed by type ID.
#[derive(Default)]
pub struct Registry {
    types: NodeTypeRegistry,
    emitters: IndexMap<String, Emitter>,
    setters: IndexMap<String, SetterFn>,
    supplies: IndexMap<String, IndexMap<Fact, TriState>>,
    requires: IndexMap<String, IndexMap<Fact, TriState>>,
}

impl Registry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a block spec.
    pub fn register(&mut self, spec: BlockSpec) {
        let id = spec.shape.id.clone();
        self.types.register(spec.shape);
        if let Some(emitter) = spec.emitter {
            self.emitters.insert(id.clone(), emitter);
        }
        if let Some(setter) = spec.setter {
            self.setters.insert(id.clone(), setter);
        }
        if !spec.supplies.is_empty() {
            self.supplies.insert(id.clone(), spec.supplies);
        }
        if !spec.requires.is_empty() {
            self.requires.insert(id, spec.requires);
        }
    }

    /// The underlying shape registry.
    pub fn types(&self) -> &NodeTypeRegistry {
        &self.types
    }

    /// Create a detached node from a type ID.
    pub fn create_node(&self, type_id: &str) -> Option<Node> {
        self.types.create_node(type_id)
    }

    /// The emitter for a type, if one is registered.
    pub fn emitter(&self, type_id: &str) -> Option<Emitter> {
        self.emitters.get(type_id).copied()
    }

    /// The setter emitter for a type, if one is registered.
    pub fn setter(&self, type_id: &str) -> Option<SetterFn> {
        self.setters.get(type_id).copied()
    }

    /// Fact opinions this type asserts for its body descendants.
    pub fn supplies(&self, type_id: &str) -> Option<&IndexMap<Fact, TriState>> {
        self.supplies.get(type_id)
    }

    /// Fact requirements declared by this type.
    pub fn requirements(&self, type_id: &str) -> Option<&IndexMap<Fact, TriState>> {
        self.requires.get(type_id)
    }
}
