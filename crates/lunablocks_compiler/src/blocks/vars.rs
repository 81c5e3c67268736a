// SPDX-License-Identifier: MIT OR Apache-2.0
//! Variables and the assignment block.
//!
//! `assign` is the consumer of the lvalue indirection: its target slot takes
//! any addressable block (tag `"lvalue"` via a wildcard output), and the
//! rendering of the assignment is delegated to the *setter* registered for
//! the target's type. Addressable blocks therefore register both a value
//! emitter (for reads) and a setter (for writes).

use crate::emit::EmitCtx;
use crate::fragment::{Fragment, Precedence};
use crate::registry::{BlockSpec, Registry};
use crate::CompileError;
use lunablocks_graph::{FieldValue, Node, NodeType, TypeSet};

/// Register the variable and assignment blocks.
pub fn register(registry: &mut Registry) {
    registry.register(
        BlockSpec::new(
            NodeType::new("assign", "Set")
                .previous(TypeSet::of(["code"]))
                .next(TypeSet::of(["code"]))
                .value_slot("TARGET", TypeSet::of(["lvalue"]))
                .value_slot("VALUE", TypeSet::any()),
        )
        .emit_statement(assign_statement),
    );
    registry.register(
        BlockSpec::new(NodeType::new("variable", "Variable").output(TypeSet::any()))
            .emit_value(variable_value)
            .setter(variable_setter),
    );
    registry.register(
        BlockSpec::new(
            NodeType::new("table_field", "Key Of")
                .output(TypeSet::any())
                .value_slot("KEY", TypeSet::any())
                .value_slot("TABLE", TypeSet::any()),
        )
        .emit_value(table_field_value)
        .setter(table_field_setter),
    );
}

fn assign_statement(ctx: &mut EmitCtx<'_>, node: &Node) -> Result<String, CompileError> {
    let value = ctx.value(node, "VALUE", Precedence::None)?;
    let assignment = match node.slot_target("TARGET") {
        Some(target_id) => {
            let target = ctx
                .graph()
                .node(target_id)
                .ok_or(CompileError::CorruptGraph(target_id))?;
            ctx.setter(target, &value)?
        }
        None => "error(\"missing assignment target\")\n".to_string(),
    };
    let next = ctx.next(node)?;
    Ok(format!("{assignment}{next}"))
}

fn variable_name(node: &Node) -> &str {
    node.field("NAME")
        .and_then(FieldValue::as_text)
        .filter(|n| !n.is_empty())
        .unwrap_or("_")
}

fn variable_value(_: &mut EmitCtx<'_>, node: &Node) -> Result<Fragment, CompileError> {
    Ok(Fragment::atomic(variable_name(node)))
}

fn variable_setter(
    _: &mut EmitCtx<'_>,
    node: &Node,
    value: &str,
) -> Result<String, CompileError> {
    Ok(format!("{} = {value}\n", variable_name(node)))
}

fn table_field_value(ctx: &mut EmitCtx<'_>, node: &Node) -> Result<Fragment, CompileError> {
    let table = ctx.value(node, "TABLE", Precedence::Atomic)?;
    let key = ctx.value(node, "KEY", Precedence::None)?;
    Ok(Fragment::atomic(format!("{table}[{key}]")))
}

fn table_field_setter(
    ctx: &mut EmitCtx<'_>,
    node: &Node,
    value: &str,
) -> Result<String, CompileError> {
    let table = ctx.value(node, "TABLE", Precedence::Atomic)?;
    let key = ctx.value(node, "KEY", Precedence::None)?;
    Ok(format!("{table}[{key}] = {value}\n"))
}
