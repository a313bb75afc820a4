//! Path compilation
//!
//! Turns a textual path into an ordered [`PathSegment`] list. The lexer
//! runs left to right with two boolean modes: `in_bracket` inside `[...]`
//! and `in_filter` inside `(...)` within a bracket, so a `]` that belongs
//! to a filter expression never closes the bracket early.
//!
//! Filter expressions compile separately via [`compile_filter`], which is
//! deliberately infallible: an expression that cannot be parsed degrades
//! to a filter that matches nothing, with a warning on the side.

use tracing::warn;

use super::ast::{CompareOp, Condition, Filter, Literal, LogicOp, PathSegment};
use crate::error::{MapQueryError, Result};

/// Compile a textual path into navigation steps.
pub fn compile(path: &str) -> Result<Vec<PathSegment>> {
    let text = path.trim();
    let Some(rest) = text.strip_prefix('$') else {
        return Err(MapQueryError::InvalidPath(format!(
            "path must start with `$`: {}",
            path
        )));
    };

    let mut segments = Vec::new();
    let mut buf = String::new();
    let mut in_bracket = false;
    let mut in_filter = false;

    for ch in rest.chars() {
        match ch {
            '.' if !in_bracket => flush_property(&mut buf, &mut segments),
            '[' if !in_bracket => {
                flush_property(&mut buf, &mut segments);
                in_bracket = true;
            }
            ']' if in_bracket && !in_filter => {
                segments.push(bracket_segment(buf.trim()));
                buf.clear();
                in_bracket = false;
            }
            '(' if in_bracket && !in_filter => {
                in_filter = true;
                buf.push(ch);
            }
            ')' if in_filter => {
                in_filter = false;
                buf.push(ch);
            }
            _ => buf.push(ch),
        }
    }
    flush_property(&mut buf, &mut segments);

    if in_bracket {
        return Err(MapQueryError::InvalidPath(format!(
            "unterminated bracket in {}",
            path
        )));
    }
    if segments.is_empty() {
        return Err(MapQueryError::InvalidPath(format!(
            "path selects nothing: {}",
            path
        )));
    }
    Ok(segments)
}

fn flush_property(buf: &mut String, segments: &mut Vec<PathSegment>) {
    let name = buf.trim();
    if !name.is_empty() {
        segments.push(PathSegment::Property(name.to_string()));
    }
    buf.clear();
}

/// Disambiguate the content of one bracketed token.
fn bracket_segment(token: &str) -> PathSegment {
    if token == "*" {
        return PathSegment::AllElements;
    }
    if let Ok(index) = token.parse::<usize>() {
        return PathSegment::ArrayIndex(index);
    }
    if let Some(expr) = token.strip_prefix('?') {
        return PathSegment::Filter(compile_filter(expr.trim()));
    }
    PathSegment::Property(strip_quotes(token).to_string())
}

/// Strip one layer of matching `'` or `"` quotes.
fn strip_quotes(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'\'' || bytes[0] == b'"')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Compile a filter expression into a [`Filter`] tree.
///
/// `||` binds looser than `&&`, so the expression splits on `||` first.
/// Grouping parentheses nest to any depth. Unbalanced or unparseable
/// input yields a match-nothing filter.
pub fn compile_filter(expr: &str) -> Filter {
    let expr = expr.trim();
    if expr.is_empty() {
        return Filter::match_nothing();
    }
    if !parens_balanced(expr) {
        warn!(expr, "unbalanced parentheses in filter expression");
        return Filter::match_nothing();
    }
    let expr = strip_outer_parens(expr);

    if let Some(parts) = split_top_level(expr, "||") {
        return Filter::group(LogicOp::Or, parts.into_iter().map(compile_filter).collect());
    }
    if let Some(parts) = split_top_level(expr, "&&") {
        return Filter::group(LogicOp::And, parts.into_iter().map(compile_filter).collect());
    }

    match parse_condition(expr) {
        Some(condition) => Filter::leaf(LogicOp::And, vec![condition]),
        None => {
            warn!(expr, "unparseable filter condition");
            Filter::match_nothing()
        }
    }
}

fn parens_balanced(expr: &str) -> bool {
    let mut depth = 0i32;
    for byte in expr.bytes() {
        match byte {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Repeatedly strip a pair of outermost parentheses iff they are a
/// matched pair spanning the whole expression.
fn strip_outer_parens(mut expr: &str) -> &str {
    loop {
        expr = expr.trim();
        let bytes = expr.as_bytes();
        if bytes.len() < 2 || bytes[0] != b'(' || bytes[bytes.len() - 1] != b')' {
            return expr;
        }
        let mut depth = 0i32;
        for (i, &byte) in bytes.iter().enumerate() {
            match byte {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 && i != bytes.len() - 1 {
                        // The opening paren closes before the end
                        return expr;
                    }
                }
                _ => {}
            }
        }
        expr = &expr[1..expr.len() - 1];
    }
}

/// Split at every depth-0 occurrence of `op`; `None` when absent.
fn split_top_level<'e>(expr: &'e str, op: &str) -> Option<Vec<&'e str>> {
    let bytes = expr.as_bytes();
    let needle = op.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => depth += 1,
            b')' => depth -= 1,
            _ if depth == 0 && bytes[i..].starts_with(needle) => {
                parts.push(&expr[start..i]);
                i += needle.len();
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    if parts.is_empty() {
        return None;
    }
    parts.push(&expr[start..]);
    Some(parts)
}

// Two-character operators come first; trying `<` before `<=` would split
// `a<=b` into `a` and `=b`.
const OPERATORS: [(&str, CompareOp); 6] = [
    ("<=", CompareOp::Le),
    (">=", CompareOp::Ge),
    ("==", CompareOp::Eq),
    ("!=", CompareOp::Ne),
    ("<", CompareOp::Lt),
    (">", CompareOp::Gt),
];

fn parse_condition(expr: &str) -> Option<Condition> {
    for (symbol, op) in OPERATORS {
        if let Some(at) = expr.find(symbol) {
            let lhs = expr[..at].trim();
            let rhs = expr[at + symbol.len()..].trim();
            let property = lhs.strip_prefix("@.").unwrap_or(lhs).trim();
            if property.is_empty() || rhs.is_empty() {
                return None;
            }
            return Some(Condition {
                property: property.to_string(),
                op,
                value: parse_literal(rhs),
            });
        }
    }
    None
}

/// Coerce the right operand: integer, then decimal, then boolean, then
/// quoted string; anything else is kept as an unquoted string.
fn parse_literal(text: &str) -> Literal {
    if let Ok(n) = text.parse::<i64>() {
        return Literal::Integer(n);
    }
    if let Ok(f) = text.parse::<f64>() {
        return Literal::Float(f);
    }
    match text {
        "true" => Literal::Bool(true),
        "false" => Literal::Bool(false),
        _ => Literal::String(strip_quotes(text).to_string()),
    }
}
