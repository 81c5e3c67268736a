// SPDX-License-Identifier: MIT OR Apache-2.0
//! Event blocks: the entry points a script hangs its chains on.
//!
//! Events are also the outermost context suppliers. `on_load` runs while
//! the player may or may not exist yet, so it explicitly asserts ambiguity
//! rather than staying silent.

use crate::context::{Fact, TriState};
use crate::emit::EmitCtx;
use crate::registry::{BlockSpec, Registry};
use crate::CompileError;
use lunablocks_graph::{Node, NodeType, TypeSet};

/// Register the event blocks.
pub fn register(registry: &mut Registry) {
    registry.register(
        BlockSpec::new(
            NodeType::new("on_load", "When Avatar Is Selected")
                .body_slot("BODY", TypeSet::of(["code"])),
        )
        .emit_statement(on_load_statement)
        .supplies(Fact::PlayerLoaded, TriState::Unknown),
    );
    registry.register(
        BlockSpec::new(
            NodeType::new("on_player_load", "When Player Is Loaded")
                .body_slot("BODY", TypeSet::of(["code"])),
        )
        .emit_statement(on_player_load_statement)
        .supplies(Fact::PlayerLoaded, TriState::True),
    );
    registry.register(
        BlockSpec::new(
            NodeType::new("on_render", "Every Render Frame")
                .body_slot("BODY", TypeSet::of(["code"])),
        )
        .emit_statement(on_render_statement)
        .supplies(Fact::RenderTick, TriState::True)
        .supplies(Fact::PlayerLoaded, TriState::True),
    );
}

fn on_load_statement(ctx: &mut EmitCtx<'_>, node: &Node) -> Result<String, CompileError> {
    let body = ctx.body(node, "BODY")?;
    Ok(format!("do\n{body}end\n"))
}

fn on_player_load_statement(ctx: &mut EmitCtx<'_>, node: &Node) -> Result<String, CompileError> {
    let body = ctx.body(node, "BODY")?;
    Ok(format!("function events.entity_init()\n{body}end\n"))
}

fn on_render_statement(ctx: &mut EmitCtx<'_>, node: &Node) -> Result<String, CompileError> {
    let body = ctx.body(node, "BODY")?;
    Ok(format!("function events.render(delta)\n{body}end\n"))
}
