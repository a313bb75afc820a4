//! Materialized array cache
//!
//! A handle materializes a named array once; thereafter any
//! `<path>[?(<filter>)]` query whose array path is cached is answered by
//! re-applying the filter to the in-memory list, bypassing the file.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::path::ast::Filter;
use crate::path::filter::matches;
use crate::value::Value;

/// Per-handle cache from textual array path to materialized elements.
#[derive(Default, Debug)]
pub struct ArrayCache {
    entries: RwLock<HashMap<String, Vec<Value>>>,
}

impl ArrayCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an evaluation result under `key`.
    ///
    /// A one-element result whose element is an array is unwrapped and
    /// its elements stored; any other non-empty result is stored as-is;
    /// an empty result stores nothing and reports `None`.
    pub fn store(&self, key: &str, result: Vec<Value>) -> Option<Vec<Value>> {
        let values = match result {
            result if result.is_empty() => return None,
            mut result
                if result.len() == 1 && matches!(result[0], Value::Array(_)) =>
            {
                match result.pop() {
                    Some(Value::Array(items)) => items,
                    _ => unreachable!(),
                }
            }
            result => result,
        };
        self.entries
            .write()
            .insert(key.to_string(), values.clone());
        Some(values)
    }

    /// Fetch a deep copy of the entry for `key`.
    pub fn lookup(&self, key: &str) -> Option<Vec<Value>> {
        self.entries.read().get(key).cloned()
    }

    /// True when `key` has an entry.
    pub fn is_cached(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Drop the entry for `key`, if any.
    pub fn invalidate(&self, key: &str) {
        self.entries.write().remove(key);
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

/// Split `<arrayPath>[?(<filter>)]` into its array path and filter
/// expression. The closing `]` is found with a paren-balanced scan, and
/// only a filter that ends the path counts; anything else is `None` and
/// falls through to streaming.
pub fn split_filter_query(path: &str) -> Option<(&str, &str)> {
    let start = path.find("[?")?;
    let bytes = path.as_bytes();
    let mut depth = 0i32;
    let mut i = start + 2;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => depth += 1,
            b')' => depth -= 1,
            b']' if depth == 0 => {
                if i != bytes.len() - 1 {
                    return None;
                }
                let expr = path[start + 2..i].trim();
                return Some((&path[..start], expr));
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Scan a cached list with a compiled filter, skipping non-object
/// elements, up to `limit` matches. A non-positive `limit` is unlimited.
pub fn filter_scan(values: &[Value], filter: &Filter, limit: i64) -> Vec<Value> {
    let limit = if limit <= 0 {
        usize::MAX
    } else {
        limit as usize
    };
    let mut out = Vec::new();
    for value in values {
        if out.len() >= limit {
            break;
        }
        if let Value::Object(map) = value {
            if matches(map, filter) {
                out.push(value.clone());
            }
        }
    }
    out
}
