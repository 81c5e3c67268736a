// SPDX-License-Identifier: MIT OR Apache-2.0
//! Control flow blocks: conditionals, loops, match chains, continuations.
//!
//! The conditional and match emitters implement the chain folding rules: a
//! run of `if`/`elif`/`else` links or `match`/`case`/`otherwise` links
//! renders as one Lua construct with exactly one opening keyword and one
//! `end`, however long the run is.

use crate::emit::EmitCtx;
use crate::fragment::{indent, Fragment, Precedence};
use crate::registry::{BlockSpec, Registry};
use crate::CompileError;
use lunablocks_graph::{Node, NodeType, TypeSet};

/// Register the control flow blocks.
pub fn register(registry: &mut Registry) {
    registry.register(
        BlockSpec::new(
            NodeType::new("if", "If")
                .previous(TypeSet::of(["code"]))
                .next(TypeSet::of(["code", "elif", "else"]))
                .value_slot("CONDITION", TypeSet::of(["Boolean"]))
                .body_slot("BODY", TypeSet::of(["code"])),
        )
        .emit_statement(if_statement),
    );
    registry.register(
        BlockSpec::new(
            NodeType::new("elif", "Else If")
                .previous(TypeSet::of(["elif"]))
                .next(TypeSet::of(["code", "elif", "else"]))
                .value_slot("CONDITION", TypeSet::of(["Boolean"]))
                .body_slot("BODY", TypeSet::of(["code"])),
        )
        .emit_statement(elif_statement),
    );
    registry.register(
        BlockSpec::new(
            NodeType::new("else", "Else")
                .previous(TypeSet::of(["else"]))
                .next(TypeSet::of(["code"]))
                .body_slot("BODY", TypeSet::of(["code"])),
        )
        .emit_statement(else_statement),
    );
    registry.register(
        BlockSpec::new(
            NodeType::new("while", "While")
                .previous(TypeSet::of(["code"]))
                .next(TypeSet::of(["code"]))
                .value_slot("CONDITION", TypeSet::of(["Boolean"]))
                .body_slot("BODY", TypeSet::of(["code"])),
        )
        .emit_statement(while_statement),
    );
    registry.register(
        BlockSpec::new(NodeType::new("break_loop", "Finish Loop Early").previous(TypeSet::of(["code"])))
            .emit_statement(break_statement),
    );
    registry.register(
        BlockSpec::new(
            NodeType::new("do_block", "Do")
                .previous(TypeSet::of(["code"]))
                .next(TypeSet::of(["code"]))
                .body_slot("BODY", TypeSet::of(["code"])),
        )
        .emit_statement(do_statement),
    );
    registry.register(
        BlockSpec::new(
            NodeType::new("match", "Match")
                .previous(TypeSet::of(["code"]))
                .next(TypeSet::of(["code"]))
                .value_slot("VALUE", TypeSet::any())
                .body_slot("BODY", TypeSet::of(["case"])),
        )
        .emit_statement(match_statement),
    );
    registry.register(
        BlockSpec::new(
            NodeType::new("case", "If It Equals")
                .previous(TypeSet::of(["case"]))
                .next(TypeSet::of(["case", "otherwise"]))
                .value_slot("VALUE", TypeSet::any())
                .body_slot("BODY", TypeSet::of(["code"])),
        )
        .emit_statement(case_statement),
    );
    registry.register(
        BlockSpec::new(
            NodeType::new("otherwise", "Otherwise")
                .previous(TypeSet::of(["otherwise"]))
                .body_slot("BODY", TypeSet::of(["code"])),
        )
        .emit_statement(otherwise_statement),
    );
    registry.register(
        BlockSpec::new(
            NodeType::new("capture_continuation", "Capture Continuation")
                .previous(TypeSet::of(["code"]))
                .next(TypeSet::of(["code"]))
                .body_slot("BODY", TypeSet::of(["code"])),
        )
        .emit_statement(capture_continuation_statement),
    );
    registry.register(
        BlockSpec::new(
            NodeType::new("captured_continuation", "Captured Continuation")
                .output(TypeSet::of(["Function"])),
        )
        .emit_value(captured_continuation_value),
    );
    registry.register(
        BlockSpec::new(
            NodeType::new("run", "Run")
                .previous(TypeSet::of(["code"]))
                .next(TypeSet::of(["code"]))
                .value_slot("VALUE", TypeSet::of(["Function"])),
        )
        .emit_statement(run_statement),
    );
    registry.register(
        BlockSpec::new(
            NodeType::new("continue_with", "Continue Running")
                .previous(TypeSet::of(["code"]))
                .value_slot("VALUE", TypeSet::of(["Function"])),
        )
        .emit_statement(continue_with_statement),
    );
    registry.register(
        BlockSpec::new(
            NodeType::new("code_block", "Code")
                .output(TypeSet::of(["Function"]))
                .next(TypeSet::of(["code"])),
        )
        .emit_value(code_block_value),
    );
}

fn conditional(
    ctx: &mut EmitCtx<'_>,
    node: &Node,
    keyword: &str,
) -> Result<String, CompileError> {
    let condition = ctx.value(node, "CONDITION", Precedence::None)?;
    let body = ctx.body(node, "BODY")?;
    // The run continues while the successor is another link of the same
    // conditional; the final link emits the single shared `end`.
    let folds = matches!(ctx.next_type(node), Some("elif" | "else"));
    let next = ctx.next(node)?;
    let terminator = if folds { "" } else { "end\n" };
    Ok(format!("{keyword} {condition} then\n{body}{terminator}{next}"))
}

fn if_statement(ctx: &mut EmitCtx<'_>, node: &Node) -> Result<String, CompileError> {
    conditional(ctx, node, "if")
}

fn elif_statement(ctx: &mut EmitCtx<'_>, node: &Node) -> Result<String, CompileError> {
    conditional(ctx, node, "elseif")
}

fn else_statement(ctx: &mut EmitCtx<'_>, node: &Node) -> Result<String, CompileError> {
    let body = ctx.body(node, "BODY")?;
    let next = ctx.next(node)?;
    Ok(format!("else\n{body}end\n{next}"))
}

fn while_statement(ctx: &mut EmitCtx<'_>, node: &Node) -> Result<String, CompileError> {
    let condition = ctx.value(node, "CONDITION", Precedence::None)?;
    let body = ctx.body(node, "BODY")?;
    let next = ctx.next(node)?;
    Ok(format!("while {condition} do\n{body}end\n{next}"))
}

fn break_statement(_: &mut EmitCtx<'_>, _: &Node) -> Result<String, CompileError> {
    Ok("break\n".to_string())
}

fn do_statement(ctx: &mut EmitCtx<'_>, node: &Node) -> Result<String, CompileError> {
    let body = ctx.body(node, "BODY")?;
    let next = ctx.next(node)?;
    Ok(format!("do\n{body}end\n{next}"))
}

fn match_statement(ctx: &mut EmitCtx<'_>, node: &Node) -> Result<String, CompileError> {
    let scrutinee = ctx.value(node, "VALUE", Precedence::None)?;
    let body = ctx.body(node, "BODY")?;
    let next = ctx.next(node)?;
    // The body is a run of `case` links, each rendered as `elseif`. Dropping
    // the `else` prefix of the first one opens the construct, and one shared
    // `end` closes it, however many cases follow.
    let inner = match body.find("elseif") {
        Some(pos) => {
            let mut folded = String::with_capacity(body.len() + 8);
            folded.push_str(&body[..pos]);
            folded.push_str(&body[pos + "else".len()..]);
            folded.push_str("  end\n");
            folded
        }
        None => String::new(),
    };
    Ok(format!("local __match = {scrutinee}\ndo\n{inner}end\n{next}"))
}

fn case_statement(ctx: &mut EmitCtx<'_>, node: &Node) -> Result<String, CompileError> {
    let value = ctx.value(node, "VALUE", Precedence::Comparison)?;
    let body = ctx.body(node, "BODY")?;
    let next = ctx.next(node)?;
    Ok(format!("elseif __match == {value} then\n{body}{next}"))
}

fn otherwise_statement(ctx: &mut EmitCtx<'_>, node: &Node) -> Result<String, CompileError> {
    let body = ctx.body(node, "BODY")?;
    Ok(format!("else\n{body}"))
}

fn capture_continuation_statement(
    ctx: &mut EmitCtx<'_>,
    node: &Node,
) -> Result<String, CompileError> {
    // Everything after this block becomes a callable unit; the body runs in
    // its place and may invoke or stash the captured continuation.
    let next = ctx.next(node)?;
    let body = ctx.body(node, "BODY")?;
    Ok(format!(
        "local function __continuation()\n{}end\ndo\n{body}end\n",
        indent(&next)
    ))
}

fn captured_continuation_value(
    _: &mut EmitCtx<'_>,
    _: &Node,
) -> Result<Fragment, CompileError> {
    Ok(Fragment::atomic("__continuation"))
}

fn run_statement(ctx: &mut EmitCtx<'_>, node: &Node) -> Result<String, CompileError> {
    let callee = ctx.value(node, "VALUE", Precedence::None)?;
    let next = ctx.next(node)?;
    Ok(format!("({callee})()\n{next}"))
}

fn continue_with_statement(ctx: &mut EmitCtx<'_>, node: &Node) -> Result<String, CompileError> {
    // Tail transfer: the remainder of this chain is abandoned for the callee.
    let callee = ctx.value(node, "VALUE", Precedence::None)?;
    Ok(format!("return ({callee})()\n"))
}

fn code_block_value(ctx: &mut EmitCtx<'_>, node: &Node) -> Result<Fragment, CompileError> {
    // The block's own statement chain becomes the function body.
    let next = ctx.next(node)?;
    Ok(Fragment::atomic(format!(
        "function()\n{}end",
        indent(&next)
    )))
}
