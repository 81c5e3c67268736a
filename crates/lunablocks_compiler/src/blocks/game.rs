// SPDX-License-Identifier: MIT OR Apache-2.0
//! Game-facing blocks: entity and host guards, model part access.
//!
//! The guard blocks both supply and require context. `if_player_loaded`
//! asserts `PlayerLoaded = true` for its body, and at the same time requires
//! the fact to be *unknown* where the guard itself stands, so nesting it
//! under a scope that already guarantees the player warns about the
//! redundant check. `if_host` does the same for host-only execution.

use crate::context::{Fact, TriState};
use crate::emit::EmitCtx;
use crate::fragment::{Fragment, Precedence};
use crate::registry::{BlockSpec, Registry};
use crate::CompileError;
use lunablocks_graph::{FieldValue, Node, NodeType, TypeSet};

/// Register the game blocks.
pub fn register(registry: &mut Registry) {
    registry.register(
        BlockSpec::new(
            NodeType::new("if_host", "If Running On Host")
                .previous(TypeSet::of(["code"]))
                .next(TypeSet::of(["code", "else"]))
                .body_slot("BODY", TypeSet::of(["code"])),
        )
        .emit_statement(if_host_statement)
        .supplies(Fact::HostLocal, TriState::True)
        .requires(Fact::HostLocal, TriState::Unknown),
    );
    registry.register(
        BlockSpec::new(
            NodeType::new("if_player_loaded", "If Current Player Is Ready")
                .previous(TypeSet::of(["code"]))
                .next(TypeSet::of(["code", "else"]))
                .body_slot("BODY", TypeSet::of(["code"])),
        )
        .emit_statement(if_player_loaded_statement)
        .supplies(Fact::PlayerLoaded, TriState::True)
        .requires(Fact::PlayerLoaded, TriState::Unknown),
    );
    registry.register(
        BlockSpec::new(
            NodeType::new("part_visible", "Is Visible")
                .output(TypeSet::of(["Boolean"]))
                .value_slot("PART", TypeSet::of(["ModelPart"])),
        )
        .emit_value(part_visible_value)
        .requires(Fact::PlayerLoaded, TriState::True),
    );
    registry.register(
        BlockSpec::new(
            NodeType::new("set_part_visible", "Set Visibility")
                .previous(TypeSet::of(["code"]))
                .next(TypeSet::of(["code"]))
                .value_slot("PART", TypeSet::of(["ModelPart"]))
                .value_slot("VALUE", TypeSet::of(["Boolean"])),
        )
        .emit_statement(set_part_visible_statement)
        .requires(Fact::PlayerLoaded, TriState::True),
    );
    registry.register(
        BlockSpec::new(
            NodeType::new("model_part", "Model Part").output(TypeSet::of(["ModelPart"])),
        )
        .emit_value(model_part_value),
    );
    registry.register(
        BlockSpec::new(
            NodeType::new("send_chat", "Send Chat Message")
                .previous(TypeSet::of(["code"]))
                .next(TypeSet::of(["code"]))
                .value_slot("VALUE", TypeSet::of(["String"])),
        )
        .emit_statement(send_chat_statement)
        .requires(Fact::HostLocal, TriState::True),
    );
}

fn guard(ctx: &mut EmitCtx<'_>, node: &Node, condition: &str) -> Result<String, CompileError> {
    let body = ctx.body(node, "BODY")?;
    // Folds with a trailing `else` link exactly like the plain conditional.
    let folds = matches!(ctx.next_type(node), Some("else"));
    let next = ctx.next(node)?;
    let terminator = if folds { "" } else { "end\n" };
    Ok(format!("if {condition} then\n{body}{terminator}{next}"))
}

fn if_host_statement(ctx: &mut EmitCtx<'_>, node: &Node) -> Result<String, CompileError> {
    guard(ctx, node, "host:isHost()")
}

fn if_player_loaded_statement(ctx: &mut EmitCtx<'_>, node: &Node) -> Result<String, CompileError> {
    guard(ctx, node, "player:isLoaded()")
}

fn part_visible_value(ctx: &mut EmitCtx<'_>, node: &Node) -> Result<Fragment, CompileError> {
    let part = ctx.value(node, "PART", Precedence::Atomic)?;
    Ok(Fragment::atomic(format!("{part}:isVisible()")))
}

fn set_part_visible_statement(ctx: &mut EmitCtx<'_>, node: &Node) -> Result<String, CompileError> {
    let part = ctx.value(node, "PART", Precedence::Atomic)?;
    let value = ctx.value(node, "VALUE", Precedence::None)?;
    let next = ctx.next(node)?;
    Ok(format!("{part}:setVisible({value})\n{next}"))
}

fn model_part_value(_: &mut EmitCtx<'_>, node: &Node) -> Result<Fragment, CompileError> {
    let part = node
        .field("PART")
        .and_then(FieldValue::as_text)
        .filter(|p| !p.is_empty())
        .unwrap_or("PLAYER");
    Ok(Fragment::atomic(format!("vanilla_model.{part}")))
}

fn send_chat_statement(ctx: &mut EmitCtx<'_>, node: &Node) -> Result<String, CompileError> {
    let value = ctx.value(node, "VALUE", Precedence::None)?;
    let next = ctx.next(node)?;
    Ok(format!("host:sendChatMessage({value})\n{next}"))
}
