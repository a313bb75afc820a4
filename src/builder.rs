//! Fluent query builder
//!
//! A thin layer over [`Document::query`]. Predicates added with
//! [`QueryBuilder::filter`] compose by logical AND and run after
//! streaming completes; they are not pushed into the evaluator.

use tracing::warn;

use crate::error::{MapQueryError, Result};
use crate::handle::Document;
use crate::value::Value;

/// Chainable query over one document. Every call to
/// [`Document::select`] returns an independent builder.
pub struct QueryBuilder<'d> {
    document: &'d Document,
    path: Option<String>,
    limit: i64,
    predicates: Vec<Box<dyn Fn(&Value) -> bool + 'd>>,
}

impl Document {
    /// Start a fluent query against this document.
    pub fn select(&self) -> QueryBuilder<'_> {
        QueryBuilder {
            document: self,
            path: None,
            limit: -1,
            predicates: Vec::new(),
        }
    }
}

impl<'d> QueryBuilder<'d> {
    /// Set the path to evaluate.
    pub fn from(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Bound the result count; non-positive means unlimited.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Add a post-stream predicate; multiple predicates AND together.
    pub fn filter(mut self, predicate: impl Fn(&Value) -> bool + 'd) -> Self {
        self.predicates.push(Box::new(predicate));
        self
    }

    /// Run the query and return all rows.
    pub fn execute(self) -> Vec<Value> {
        let QueryBuilder {
            document,
            path,
            limit,
            predicates,
        } = self;
        let Some(path) = path else {
            warn!("select() executed without a path");
            return Vec::new();
        };
        let rows = document.query(&path, limit, None);
        if predicates.is_empty() {
            rows
        } else {
            rows.into_iter()
                .filter(|row| predicates.iter().all(|pred| pred(row)))
                .collect()
        }
    }

    /// Run the query and transform each row.
    pub fn map<T>(self, f: impl Fn(&Value) -> T) -> Vec<T> {
        self.execute().iter().map(f).collect()
    }

    /// First row, or an error when the result set is empty.
    pub fn first(self) -> Result<Value> {
        self.execute()
            .into_iter()
            .next()
            .ok_or(MapQueryError::NoResults)
    }

    /// First row, or `None` when the result set is empty.
    pub fn first_or_null(self) -> Option<Value> {
        self.execute().into_iter().next()
    }

    /// Number of matching rows.
    pub fn count(self) -> usize {
        self.execute().len()
    }
}
