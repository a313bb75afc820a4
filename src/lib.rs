#![warn(missing_docs)]

//! # mapquery
//!
//! A read-only JSONPath query engine over memory-mapped JSON documents,
//! tuned for repeated filtered lookups on large, mostly-array-shaped
//! configuration files where the typical query extracts a few records
//! from a big array by predicate over object fields.
//!
//! Three subsystems do the work: a path compiler that turns a textual
//! JSONPath into navigation steps, a streaming evaluator that walks the
//! token stream entering only the subtrees the path requires, and a
//! per-document array cache that answers `<array>[?(<filter>)]` queries
//! from memory once the array has been materialized.
//!
//! ## Example
//!
//! ```rust,no_run
//! use mapquery::registry;
//!
//! # fn main() -> mapquery::Result<()> {
//! let doc = registry::get_or_create("data/items.json")?;
//!
//! // Direct query
//! let cheap = doc.query("$.store.book[?(@.price<10)]", -1, None);
//!
//! // Fluent form
//! let titles: Vec<String> = doc
//!     .select()
//!     .from("$.store.book[*]")
//!     .limit(5)
//!     .map(|book| {
//!         book.get("title")
//!             .and_then(|t| t.as_str())
//!             .unwrap_or_default()
//!             .to_string()
//!     });
//!
//! // Repeated filtered lookups: materialize once, filter in memory
//! doc.cache_array("$.store.book");
//! let fiction = doc.query("$.store.book[?(@.category==\"fiction\")]", -1, None);
//! # let _ = (cheap, titles, fiction);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod cache;
pub mod config;
pub mod error;
pub mod handle;
pub mod path;
pub mod reader;
pub mod registry;
pub mod source;
pub mod tokenizer;
pub mod value;

pub use builder::QueryBuilder;
pub use config::EngineConfig;
pub use error::{MapQueryError, Result};
pub use handle::{Document, QueryMetrics};
pub use path::{Filter, PathSegment, RowPredicate};
pub use value::Value;
