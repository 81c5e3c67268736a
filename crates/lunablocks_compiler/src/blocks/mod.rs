// SPDX-License-Identifier: MIT OR Apache-2.0
//! The standard block library.
//!
//! Each module registers one category of blocks; [`standard_registry`]
//! assembles the full set once at startup.

pub mod control;
pub mod events;
pub mod game;
pub mod text;
pub mod vars;

use crate::registry::Registry;

/// Build the full standard registry.
pub fn standard_registry() -> Registry {
    let mut registry = Registry::new();
    events::register(&mut registry);
    control::register(&mut registry);
    text::register(&mut registry);
    vars::register(&mut registry);
    game::register(&mut registry);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compile, BlockSpec, Fragment};
    use lunablocks_graph::{FieldValue, Graph, Node, NodeId, NodeType, TypeSet};

    fn add(graph: &mut Graph, registry: &Registry, type_id: &str) -> NodeId {
        graph.add_node(registry.create_node(type_id).unwrap())
    }

    fn add_with_field(
        graph: &mut Graph,
        registry: &Registry,
        type_id: &str,
        field: &str,
        value: FieldValue,
    ) -> NodeId {
        graph.add_node(
            registry
                .create_node(type_id)
                .unwrap()
                .with_field(field, value),
        )
    }

    /// Build `if` + `count` `elif` links, optionally a trailing `else`, with
    /// literal `true` conditions.
    fn conditional_chain(
        graph: &mut Graph,
        registry: &Registry,
        elif_count: usize,
        trailing_else: bool,
    ) {
        let head = add(graph, registry, "if");
        let cond = add(graph, registry, "boolean_literal");
        graph.plug(cond, head, "CONDITION").unwrap();
        let mut prev = head;
        for _ in 0..elif_count {
            let link = add(graph, registry, "elif");
            let cond = add(graph, registry, "boolean_literal");
            graph.plug(cond, link, "CONDITION").unwrap();
            graph.link_next(prev, link).unwrap();
            prev = link;
        }
        if trailing_else {
            let link = add(graph, registry, "else");
            graph.link_next(prev, link).unwrap();
        }
    }

    fn if_openings(source: &str) -> usize {
        source
            .lines()
            .filter(|l| l.trim_start().starts_with("if "))
            .count()
    }

    fn end_lines(source: &str) -> usize {
        source.lines().filter(|l| l.trim() == "end").count()
    }

    #[test]
    fn test_conditional_folding() {
        let registry = standard_registry();
        for elif_count in [0, 1, 3] {
            for trailing_else in [false, true] {
                let mut graph = Graph::new("fold");
                conditional_chain(&mut graph, &registry, elif_count, trailing_else);
                let compiled = compile(&graph, &registry).unwrap();
                assert_eq!(
                    if_openings(&compiled.source),
                    1,
                    "one opening keyword for {elif_count} elifs (else: {trailing_else})"
                );
                assert_eq!(
                    end_lines(&compiled.source),
                    1,
                    "one terminator for {elif_count} elifs (else: {trailing_else})"
                );
                if trailing_else {
                    assert!(compiled.source.contains("else\n"));
                }
                assert_eq!(
                    compiled.source.matches("elseif").count(),
                    elif_count,
                    "one elseif per link"
                );
            }
        }
    }

    #[test]
    fn test_missing_condition_renders_sentinel() {
        let registry = standard_registry();
        let mut graph = Graph::new("hole");
        add(&mut graph, &registry, "if");

        let compiled = compile(&graph, &registry).unwrap();
        assert!(compiled
            .source
            .contains("if error(\"missing value\") then"));
    }

    #[test]
    fn test_match_folding() {
        let registry = standard_registry();
        let mut graph = Graph::new("match");
        let head = add(&mut graph, &registry, "match");
        let scrutinee =
            add_with_field(&mut graph, &registry, "number_literal", "VALUE", FieldValue::Number(5.0));
        graph.plug(scrutinee, head, "VALUE").unwrap();

        let first = add(&mut graph, &registry, "case");
        let one =
            add_with_field(&mut graph, &registry, "number_literal", "VALUE", FieldValue::Number(1.0));
        graph.plug(one, first, "VALUE").unwrap();
        graph.plug(first, head, "BODY").unwrap();

        let second = add(&mut graph, &registry, "case");
        let two =
            add_with_field(&mut graph, &registry, "number_literal", "VALUE", FieldValue::Number(2.0));
        graph.plug(two, second, "VALUE").unwrap();
        graph.link_next(first, second).unwrap();

        let fallback = add(&mut graph, &registry, "otherwise");
        graph.link_next(second, fallback).unwrap();

        let compiled = compile(&graph, &registry).unwrap();
        assert!(compiled.source.contains("local __match = 5"));
        // One opening `if`, one `elseif` per extra case, one shared
        // terminator inside the do block.
        assert_eq!(if_openings(&compiled.source), 1);
        assert_eq!(compiled.source.matches("elseif").count(), 1);
        assert_eq!(end_lines(&compiled.source), 2);
        assert!(compiled.source.contains("__match == 2"));
    }

    #[test]
    fn test_empty_match_stays_valid() {
        let registry = standard_registry();
        let mut graph = Graph::new("match");
        add(&mut graph, &registry, "match");

        let compiled = compile(&graph, &registry).unwrap();
        assert!(compiled
            .source
            .contains("local __match = error(\"missing value\")\ndo\nend\n"));
    }

    #[test]
    fn test_orphan_chain_link_generates_nothing() {
        let registry = standard_registry();
        for link in ["elif", "else", "case", "otherwise"] {
            let mut graph = Graph::new("orphan");
            add(&mut graph, &registry, link);
            let compiled = compile(&graph, &registry).unwrap();
            assert_eq!(compiled.source, "", "floating '{link}' must render nothing");
        }

        // A detached run of links is suppressed as a whole.
        let mut graph = Graph::new("orphan");
        let head = add(&mut graph, &registry, "elif");
        let tail = add(&mut graph, &registry, "else");
        graph.link_next(head, tail).unwrap();
        assert_eq!(compile(&graph, &registry).unwrap().source, "");
    }

    #[test]
    fn test_assignment_through_setter() {
        let registry = standard_registry();
        let mut graph = Graph::new("assign");
        let assign = add(&mut graph, &registry, "assign");
        let target =
            add_with_field(&mut graph, &registry, "variable", "NAME", FieldValue::Text("x".into()));
        let value =
            add_with_field(&mut graph, &registry, "number_literal", "VALUE", FieldValue::Number(7.0));
        graph.plug(target, assign, "TARGET").unwrap();
        graph.plug(value, assign, "VALUE").unwrap();

        let compiled = compile(&graph, &registry).unwrap();
        assert_eq!(compiled.source, "x = 7\n");
    }

    #[test]
    fn test_table_field_setter() {
        let registry = standard_registry();
        let mut graph = Graph::new("assign");
        let assign = add(&mut graph, &registry, "assign");
        let field = add(&mut graph, &registry, "table_field");
        let table =
            add_with_field(&mut graph, &registry, "variable", "NAME", FieldValue::Text("t".into()));
        let key = add_with_field(
            &mut graph,
            &registry,
            "string_literal",
            "VALUE",
            FieldValue::Text("k".into()),
        );
        let value = add(&mut graph, &registry, "boolean_literal");
        graph.plug(table, field, "TABLE").unwrap();
        graph.plug(key, field, "KEY").unwrap();
        graph.plug(field, assign, "TARGET").unwrap();
        graph.plug(value, assign, "VALUE").unwrap();

        let compiled = compile(&graph, &registry).unwrap();
        assert_eq!(compiled.source, "t[\"k\"] = true\n");
    }

    #[test]
    fn test_unsupported_assignment_target_is_recovered() {
        fn opaque_value(
            _: &mut crate::EmitCtx<'_>,
            _: &Node,
        ) -> Result<Fragment, crate::CompileError> {
            Ok(Fragment::atomic("opaque"))
        }

        let mut registry = standard_registry();
        // Addressable by tag, but nobody registered a setter for it.
        registry.register(
            BlockSpec::new(NodeType::new("opaque", "Opaque").output(TypeSet::any()))
                .emit_value(opaque_value),
        );

        let mut graph = Graph::new("assign");
        let assign = add(&mut graph, &registry, "assign");
        let target = add(&mut graph, &registry, "opaque");
        graph.plug(target, assign, "TARGET").unwrap();

        let compiled = compile(&graph, &registry).unwrap();
        assert!(compiled
            .source
            .contains("unsupported assignment target: opaque"));
    }

    #[test]
    fn test_event_supplies_player_context() {
        let registry = standard_registry();
        let mut graph = Graph::new("events");
        let event = add(&mut graph, &registry, "on_player_load");
        let set = add(&mut graph, &registry, "set_part_visible");
        graph.plug(set, event, "BODY").unwrap();

        let compiled = compile(&graph, &registry).unwrap();
        assert!(compiled.source.contains("function events.entity_init()"));
        assert!(compiled.diagnostics.is_empty());
    }

    #[test]
    fn test_requirer_warns_outside_player_context() {
        let registry = standard_registry();
        let mut graph = Graph::new("events");
        let event = add(&mut graph, &registry, "on_load");
        let set = add(&mut graph, &registry, "set_part_visible");
        graph.plug(set, event, "BODY").unwrap();

        let compiled = compile(&graph, &registry).unwrap();
        assert_eq!(compiled.diagnostics.len(), 1);
        assert_eq!(compiled.diagnostics[0].node, set);
        assert!(compiled.diagnostics[0].message.contains("player loaded"));
    }

    #[test]
    fn test_redundant_guard_warns() {
        let registry = standard_registry();
        let mut graph = Graph::new("guards");
        let event = add(&mut graph, &registry, "on_player_load");
        let guard = add(&mut graph, &registry, "if_player_loaded");
        graph.plug(guard, event, "BODY").unwrap();

        let compiled = compile(&graph, &registry).unwrap();
        assert_eq!(compiled.diagnostics.len(), 1);
        assert_eq!(compiled.diagnostics[0].node, guard);

        // The same guard at top level has nothing to be redundant with.
        let mut graph = Graph::new("guards");
        add(&mut graph, &registry, "if_player_loaded");
        let compiled = compile(&graph, &registry).unwrap();
        assert!(compiled.diagnostics.is_empty());
    }

    #[test]
    fn test_guard_satisfies_its_own_body() {
        let registry = standard_registry();
        let mut graph = Graph::new("guards");
        let guard = add(&mut graph, &registry, "if_player_loaded");
        let set = add(&mut graph, &registry, "set_part_visible");
        graph.plug(set, guard, "BODY").unwrap();

        let compiled = compile(&graph, &registry).unwrap();
        assert!(compiled.diagnostics.is_empty());
        assert!(compiled.source.contains("if player:isLoaded() then"));
    }

    #[test]
    fn test_capture_continuation_wraps_rest_of_chain() {
        let registry = standard_registry();
        let mut graph = Graph::new("cont");
        let capture = add(&mut graph, &registry, "capture_continuation");
        let invoke = add(&mut graph, &registry, "run");
        let cont = add(&mut graph, &registry, "captured_continuation");
        let after = add(&mut graph, &registry, "print");
        let message = add_with_field(
            &mut graph,
            &registry,
            "string_literal",
            "VALUE",
            FieldValue::Text("after".into()),
        );

        graph.plug(cont, invoke, "VALUE").unwrap();
        graph.plug(invoke, capture, "BODY").unwrap();
        graph.link_next(capture, after).unwrap();
        graph.plug(message, after, "VALUE").unwrap();

        let compiled = compile(&graph, &registry).unwrap();
        assert_eq!(
            compiled.source,
            "local function __continuation()\n  print(\"after\")\nend\ndo\n  (__continuation)()\nend\n"
        );
    }

    #[test]
    fn test_continue_with_renders_tail_transfer() {
        let registry = standard_registry();
        let mut graph = Graph::new("cont");
        let transfer = add(&mut graph, &registry, "continue_with");
        let cont = add(&mut graph, &registry, "captured_continuation");
        graph.plug(cont, transfer, "VALUE").unwrap();

        let compiled = compile(&graph, &registry).unwrap();
        assert_eq!(compiled.source, "return (__continuation)()\n");
    }

    #[test]
    fn test_compile_is_deterministic() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let registry = standard_registry();
        let mut graph = Graph::new("det");
        let event = add(&mut graph, &registry, "on_load");
        let guard = add(&mut graph, &registry, "if_host");
        let chat = add(&mut graph, &registry, "send_chat");
        let message = add_with_field(
            &mut graph,
            &registry,
            "string_literal",
            "VALUE",
            FieldValue::Text("hello".into()),
        );
        graph.plug(guard, event, "BODY").unwrap();
        graph.plug(chat, guard, "BODY").unwrap();
        graph.plug(message, chat, "VALUE").unwrap();

        let first = compile(&graph, &registry).unwrap();
        let second = compile(&graph, &registry).unwrap();
        assert_eq!(first.source, second.source);
        assert_eq!(first.diagnostics, second.diagnostics);
        assert!(first.diagnostics.is_empty());
        assert!(first.source.contains("host:sendChatMessage(\"hello\")"));
    }

    #[test]
    fn test_concat_precedence() {
        let registry = standard_registry();
        let mut graph = Graph::new("concat");
        let print = add(&mut graph, &registry, "print");
        let concat = add(&mut graph, &registry, "concat");
        let a = add_with_field(
            &mut graph,
            &registry,
            "string_literal",
            "VALUE",
            FieldValue::Text("a".into()),
        );
        let b = add_with_field(
            &mut graph,
            &registry,
            "string_literal",
            "VALUE",
            FieldValue::Text("b".into()),
        );
        graph.plug(a, concat, "A").unwrap();
        graph.plug(b, concat, "B").unwrap();
        graph.plug(concat, print, "VALUE").unwrap();

        let compiled = compile(&graph, &registry).unwrap();
        // Print splices in a loose context; no parentheses needed.
        assert_eq!(compiled.source, "print(\"a\" .. \"b\")\n");
    }
}
