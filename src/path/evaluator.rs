//! Streaming path evaluation
//!
//! A single depth-first pass over the token stream, entering only the
//! subtrees the compiled path requires and skipping sibling values
//! without materializing them. When a filter segment matches an array
//! element, the materialized element is re-streamed through a fresh
//! in-memory tokenizer so the remaining segments evaluate uniformly.

use super::ast::{Filter, PathSegment};
use super::filter;
use crate::error::Result;
use crate::reader;
use crate::tokenizer::{JsonTokenizer, Token};
use crate::value::Value;

/// Caller-supplied predicate applied at leaf materializations.
pub type RowPredicate = dyn Fn(&Value) -> bool;

/// One evaluation pass. Owns the result list; segments, limit and
/// predicate are fixed for the lifetime of the pass.
pub struct Evaluator<'q> {
    segments: &'q [PathSegment],
    limit: usize,
    predicate: Option<&'q RowPredicate>,
    results: Vec<Value>,
}

impl<'q> Evaluator<'q> {
    /// A non-positive `limit` means unlimited.
    pub fn new(
        segments: &'q [PathSegment],
        limit: i64,
        predicate: Option<&'q RowPredicate>,
    ) -> Self {
        let limit = if limit <= 0 {
            usize::MAX
        } else {
            limit as usize
        };
        Self {
            segments,
            limit,
            predicate,
            results: Vec::new(),
        }
    }

    /// Walk the stream from its start. An empty document yields an empty
    /// result list.
    pub fn run(mut self, tok: &mut JsonTokenizer<'_>) -> Result<Vec<Value>> {
        let first = tok.next_token()?;
        if first != Token::Eof {
            self.walk(tok, first, 0)?;
        }
        Ok(self.results)
    }

    fn full(&self) -> bool {
        self.results.len() >= self.limit
    }

    fn walk(
        &mut self,
        tok: &mut JsonTokenizer<'_>,
        first: Token,
        index: usize,
    ) -> Result<()> {
        let segments = self.segments;
        let Some(segment) = segments.get(index) else {
            // Past the last segment: materialize and emit
            let value = reader::read_from(tok, first)?;
            if !self.full() && self.predicate.map_or(true, |pred| pred(&value)) {
                self.results.push(value);
            }
            return Ok(());
        };

        match (first, segment) {
            (Token::ObjectStart, PathSegment::Property(name)) => {
                self.walk_object_property(tok, name, index)
            }
            (Token::ObjectStart, PathSegment::AllElements) => {
                self.walk_object_wildcard(tok, index)
            }
            (first @ Token::ObjectStart, _) => tok.skip_from(&first),
            (Token::ArrayStart, PathSegment::ArrayIndex(target)) => {
                self.walk_array_index(tok, *target, index)
            }
            (Token::ArrayStart, PathSegment::AllElements) => {
                self.walk_array_wildcard(tok, index)
            }
            (Token::ArrayStart, PathSegment::Filter(tree)) => {
                self.walk_array_filter(tok, tree, index)
            }
            (first @ Token::ArrayStart, _) => tok.skip_from(&first),
            // The path requires structure but the value is primitive
            _ => Ok(()),
        }
    }

    /// Enter an object looking for one key. Remaining fields are drained
    /// even after the limit is reached so the container terminates
    /// correctly.
    fn walk_object_property(
        &mut self,
        tok: &mut JsonTokenizer<'_>,
        name: &str,
        index: usize,
    ) -> Result<()> {
        loop {
            match tok.next_token()? {
                Token::Key(key) => {
                    if key == name && !self.full() {
                        let first = tok.next_token()?;
                        self.walk(tok, first, index + 1)?;
                    } else {
                        tok.skip_value()?;
                    }
                }
                Token::ObjectEnd => return Ok(()),
                Token::Eof => return Err(tok.err("unexpected end of input in object")),
                _ => {}
            }
        }
    }

    fn walk_object_wildcard(
        &mut self,
        tok: &mut JsonTokenizer<'_>,
        index: usize,
    ) -> Result<()> {
        loop {
            match tok.next_token()? {
                Token::Key(_) => {
                    if self.full() {
                        tok.skip_value()?;
                    } else {
                        let first = tok.next_token()?;
                        self.walk(tok, first, index + 1)?;
                    }
                }
                Token::ObjectEnd => return Ok(()),
                Token::Eof => return Err(tok.err("unexpected end of input in object")),
                _ => {}
            }
        }
    }

    fn walk_array_index(
        &mut self,
        tok: &mut JsonTokenizer<'_>,
        target: usize,
        index: usize,
    ) -> Result<()> {
        let mut position = 0usize;
        loop {
            match tok.next_token()? {
                Token::ArrayEnd => return Ok(()),
                Token::Eof => return Err(tok.err("unexpected end of input in array")),
                first => {
                    if position == target && !self.full() {
                        self.walk(tok, first, index + 1)?;
                    } else {
                        tok.skip_from(&first)?;
                    }
                    position += 1;
                }
            }
        }
    }

    fn walk_array_wildcard(
        &mut self,
        tok: &mut JsonTokenizer<'_>,
        index: usize,
    ) -> Result<()> {
        loop {
            match tok.next_token()? {
                Token::ArrayEnd => return Ok(()),
                Token::Eof => return Err(tok.err("unexpected end of input in array")),
                first => {
                    if self.full() {
                        tok.skip_from(&first)?;
                    } else {
                        self.walk(tok, first, index + 1)?;
                    }
                }
            }
        }
    }

    /// Filter each array element. Only objects can match; a match is
    /// re-streamed through an in-memory tokenizer and the remaining
    /// segments continue on that stream.
    fn walk_array_filter(
        &mut self,
        tok: &mut JsonTokenizer<'_>,
        tree: &Filter,
        index: usize,
    ) -> Result<()> {
        loop {
            match tok.next_token()? {
                Token::ArrayEnd => return Ok(()),
                Token::Eof => return Err(tok.err("unexpected end of input in array")),
                Token::ObjectStart if !self.full() => {
                    let element = reader::read_from(tok, Token::ObjectStart)?;
                    let matched = match &element {
                        Value::Object(map) => filter::matches(map, tree),
                        _ => false,
                    };
                    if matched {
                        let json = element.to_json();
                        let mut sub = JsonTokenizer::new(json.as_bytes());
                        let first = sub.next_token()?;
                        self.walk(&mut sub, first, index + 1)?;
                    }
                }
                first => tok.skip_from(&first)?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::compiler::compile;

    fn run(doc: &str, path: &str, limit: i64) -> Vec<Value> {
        let segments = compile(path).unwrap();
        let mut tok = JsonTokenizer::new(doc.as_bytes());
        Evaluator::new(&segments, limit, None).run(&mut tok).unwrap()
    }

    const DOC: &str = r#"{
        "items": [
            {"name": "a", "rank": 1},
            {"name": "b", "rank": 2},
            {"name": "c", "rank": 3}
        ],
        "meta": {"count": 3}
    }"#;

    #[test]
    fn test_property_chain() {
        let results = run(DOC, "$.meta.count", -1);
        assert_eq!(results, vec![Value::Integer(3)]);
    }

    #[test]
    fn test_array_index() {
        let results = run(DOC, "$.items[1].name", -1);
        assert_eq!(results, vec![Value::String("b".into())]);
    }

    #[test]
    fn test_wildcard_over_array() {
        let results = run(DOC, "$.items[*].rank", -1);
        assert_eq!(
            results,
            vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]
        );
    }

    #[test]
    fn test_wildcard_over_object() {
        let results = run(r#"{"a": 1, "b": 2}"#, "$[*]", -1);
        assert_eq!(results, vec![Value::Integer(1), Value::Integer(2)]);
    }

    #[test]
    fn test_limit_stops_and_drains() {
        let results = run(DOC, "$.items[*]", 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].get("name"), Some(&Value::String("a".into())));
        assert_eq!(results[1].get("name"), Some(&Value::String("b".into())));
    }

    #[test]
    fn test_filter_continues_remaining_segments() {
        let results = run(DOC, "$.items[?(@.rank>1)].name", -1);
        assert_eq!(
            results,
            vec![Value::String("b".into()), Value::String("c".into())]
        );
    }

    #[test]
    fn test_filter_skips_non_objects() {
        let results = run(r#"{"xs": [1, {"v": 2}, "s", {"v": 9}]}"#, "$.xs[?(@.v>1)]", -1);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].get("v"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_scalar_under_remaining_segment() {
        let results = run(r#"{"a": 5}"#, "$.a.b", -1);
        assert!(results.is_empty());
    }

    #[test]
    fn test_predicate_applies_at_leaf() {
        let segments = compile("$.items[*]").unwrap();
        let mut tok = JsonTokenizer::new(DOC.as_bytes());
        let pred = |v: &Value| v.get("rank") == Some(&Value::Integer(2));
        let results = Evaluator::new(&segments, -1, Some(&pred))
            .run(&mut tok)
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].get("name"), Some(&Value::String("b".into())));
    }

    #[test]
    fn test_empty_document() {
        let segments = compile("$.anything").unwrap();
        let mut tok = JsonTokenizer::new(b"");
        let results = Evaluator::new(&segments, -1, None).run(&mut tok).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_float_survives_filter_restream() {
        let results = run(
            r#"{"xs": [{"price": 10.0}, {"price": 3.5}]}"#,
            "$.xs[?(@.price>5)].price",
            -1,
        );
        assert_eq!(results, vec![Value::Float(10.0)]);
    }
}
