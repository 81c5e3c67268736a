// SPDX-License-Identifier: MIT OR Apache-2.0
//! Literal and text blocks.

use crate::emit::EmitCtx;
use crate::fragment::{format_number, quote_lua, Fragment, Precedence};
use crate::registry::{BlockSpec, Registry};
use crate::CompileError;
use lunablocks_graph::{FieldValue, Node, NodeType, TypeSet};

/// Register the literal and text blocks.
pub fn register(registry: &mut Registry) {
    registry.register(
        BlockSpec::new(NodeType::new("string_literal", "Text").output(TypeSet::of(["String"])))
            .emit_value(string_literal_value),
    );
    registry.register(
        BlockSpec::new(NodeType::new("number_literal", "Number").output(TypeSet::of(["Number"])))
            .emit_value(number_literal_value),
    );
    registry.register(
        BlockSpec::new(
            NodeType::new("boolean_literal", "Boolean").output(TypeSet::of(["Boolean"])),
        )
        .emit_value(boolean_literal_value),
    );
    registry.register(
        BlockSpec::new(
            NodeType::new("concat", "Followed By")
                .output(TypeSet::of(["String"]))
                .value_slot("A", TypeSet::of(["String"]))
                .value_slot("B", TypeSet::of(["String"])),
        )
        .emit_value(concat_value),
    );
    registry.register(
        BlockSpec::new(
            NodeType::new("logic_op", "And/Or")
                .output(TypeSet::of(["Boolean"]))
                .value_slot("A", TypeSet::any())
                .value_slot("B", TypeSet::any()),
        )
        .emit_value(logic_op_value),
    );
    registry.register(
        BlockSpec::new(
            NodeType::new("print", "Print")
                .previous(TypeSet::of(["code"]))
                .next(TypeSet::of(["code"]))
                .value_slot("VALUE", TypeSet::of(["String"])),
        )
        .emit_statement(print_statement),
    );
}

fn string_literal_value(_: &mut EmitCtx<'_>, node: &Node) -> Result<Fragment, CompileError> {
    let text = node
        .field("VALUE")
        .and_then(FieldValue::as_text)
        .unwrap_or_default();
    Ok(Fragment::atomic(quote_lua(text)))
}

fn number_literal_value(_: &mut EmitCtx<'_>, node: &Node) -> Result<Fragment, CompileError> {
    let value = match node.field("VALUE") {
        Some(FieldValue::Number(n)) => *n,
        _ => 0.0,
    };
    Ok(Fragment::atomic(format_number(value)))
}

fn boolean_literal_value(_: &mut EmitCtx<'_>, node: &Node) -> Result<Fragment, CompileError> {
    let value = match node.field("VALUE") {
        Some(FieldValue::Bool(b)) => *b,
        _ => true,
    };
    Ok(Fragment::atomic(if value { "true" } else { "false" }))
}

fn concat_value(ctx: &mut EmitCtx<'_>, node: &Node) -> Result<Fragment, CompileError> {
    let a = ctx.value(node, "A", Precedence::Concat)?;
    let b = ctx.value(node, "B", Precedence::Concat)?;
    Ok(Fragment::new(format!("{a} .. {b}"), Precedence::Concat))
}

fn logic_op_value(ctx: &mut EmitCtx<'_>, node: &Node) -> Result<Fragment, CompileError> {
    let op = node
        .field("OP")
        .and_then(FieldValue::as_text)
        .unwrap_or("and");
    let precedence = if op == "or" {
        Precedence::Or
    } else {
        Precedence::And
    };
    let a = ctx.value(node, "A", precedence)?;
    let b = ctx.value(node, "B", precedence)?;
    Ok(Fragment::new(format!("{a} {op} {b}"), precedence))
}

fn print_statement(ctx: &mut EmitCtx<'_>, node: &Node) -> Result<String, CompileError> {
    let value = ctx.value(node, "VALUE", Precedence::None)?;
    let next = ctx.next(node)?;
    Ok(format!("print({value})\n{next}"))
}
