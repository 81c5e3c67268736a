// SPDX-License-Identifier: MIT OR Apache-2.0
//! Block graph model for LunaBlocks.
//!
//! This crate provides the in-memory representation of a block program:
//! - Typed nodes with value slots, statement bodies, and next/previous chains
//! - Nominal tag sets and connection validation
//! - A checker-gated mutation API that preserves the forest invariants
//! - Serialization support
//!
//! ## Architecture
//!
//! Node *types* declare shape (connectors, slots, accepted tag sets) and are
//! collected in a [`NodeTypeRegistry`] built once at startup. Node
//! *instances* live in a [`Graph`]; every structural edit goes through the
//! [`checker::ConnectionChecker`], and a rejected edit leaves the graph
//! untouched. The compiler crate only ever reads the graph.

pub mod checker;
pub mod graph;
pub mod node;
pub mod slot;

pub use checker::{can_connect, ConnectionChecker, VetoFn};
pub use graph::{ConnectionError, Graph};
pub use node::{Attachment, FieldValue, Node, NodeId, NodeType, NodeTypeRegistry};
pub use slot::{Slot, SlotKind, SlotSpec, TypeSet};
