// SPDX-License-Identifier: MIT OR Apache-2.0
//! Rendered code fragments, operator precedence, and text helpers.

use serde::{Deserialize, Serialize};

/// Lua operator precedence, loosest binding last.
///
/// Value emitters report the precedence of their outermost operator; callers
/// compare it against the precedence of the position the code is spliced
/// into and parenthesize when the child binds more loosely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Precedence {
    /// Literals, names, parenthesized or call expressions
    Atomic,
    /// `not`, unary `-`, `#`
    Unary,
    /// `*`, `/`, `%`
    Multiplicative,
    /// `+`, `-`
    Additive,
    /// `..`
    Concat,
    /// `==`, `~=`, `<`, `>`, `<=`, `>=`
    Comparison,
    /// `and`
    And,
    /// `or`
    Or,
    /// Never parenthesized against; the loosest context
    None,
}

/// A rendered value expression plus its precedence hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Lua expression text
    pub code: String,
    /// Precedence of the outermost operator in `code`
    pub precedence: Precedence,
}

impl Fragment {
    /// A fragment with the given precedence.
    pub fn new(code: impl Into<String>, precedence: Precedence) -> Self {
        Self {
            code: code.into(),
            precedence,
        }
    }

    /// A fragment that never needs parenthesizing.
    pub fn atomic(code: impl Into<String>) -> Self {
        Self::new(code, Precedence::Atomic)
    }

    /// The code, parenthesized if it binds more loosely than `context`.
    pub fn in_context(&self, context: Precedence) -> String {
        if self.precedence > context {
            format!("({})", self.code)
        } else {
            self.code.clone()
        }
    }
}

/// Sentinel expression for an empty value slot. Valid Lua that fails at
/// runtime instead of producing broken syntax.
pub fn missing_value() -> Fragment {
    Fragment::atomic(r#"error("missing value")"#)
}

/// Sentinel statement for a node type without a registered emitter.
pub fn unimplemented_statement(type_id: &str) -> String {
    format!("error(\"code generation for '{type_id}' not implemented\")\n")
}

/// Sentinel expression for a node type without a registered emitter.
pub fn unimplemented_value(type_id: &str) -> Fragment {
    Fragment::atomic(format!(
        "error(\"code generation for '{type_id}' not implemented\")"
    ))
}

/// Sentinel statement for an assignment target whose type has no setter.
pub fn unsupported_target(type_id: &str) -> String {
    format!("error(\"unsupported assignment target: {type_id}\")\n")
}

/// Quote a string as a Lua literal.
pub fn quote_lua(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Format a number the way Lua prints integral floats.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Indent every non-empty line by one step (two spaces).
pub fn indent(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    for line in code.lines() {
        if !line.is_empty() {
            out.push_str("  ");
            out.push_str(line);
        }
        out.push('\n');
    }
    // Drop the trailing newline we may have added past the original end.
    if !code.ends_with('\n') && out.ends_with('\n') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parenthesize_only_looser_bindings() {
        let concat = Fragment::new("a .. b", Precedence::Concat);
        assert_eq!(concat.in_context(Precedence::Atomic), "(a .. b)");
        assert_eq!(concat.in_context(Precedence::None), "a .. b");
        assert_eq!(concat.in_context(Precedence::Concat), "a .. b");

        let atom = Fragment::atomic("x");
        assert_eq!(atom.in_context(Precedence::Atomic), "x");
    }

    #[test]
    fn test_quote_lua_escapes() {
        assert_eq!(quote_lua("hi"), "\"hi\"");
        assert_eq!(quote_lua("a\"b"), "\"a\\\"b\"");
        assert_eq!(quote_lua("line\nbreak"), "\"line\\nbreak\"");
        assert_eq!(quote_lua("back\\slash"), "\"back\\\\slash\"");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-2.0), "-2");
        assert_eq!(format_number(1.5), "1.5");
    }

    #[test]
    fn test_indent_skips_blank_lines() {
        assert_eq!(indent("a\n\nb\n"), "  a\n\n  b\n");
    }
}
