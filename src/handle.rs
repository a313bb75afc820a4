//! Document handle
//!
//! Owns the mapped source and the per-document array cache, and exposes
//! the query surface. A handle is not meant for concurrent queries;
//! callers serialize access per document (the internal locks exist for
//! memory safety, not throughput).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::cache::{filter_scan, split_filter_query, ArrayCache};
use crate::config::EngineConfig;
use crate::error::{MapQueryError, Result};
use crate::path::compiler::{compile, compile_filter};
use crate::path::evaluator::{Evaluator, RowPredicate};
use crate::source::DataSource;
use crate::value::Value;

/// Counter snapshot published by [`Document::metrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryMetrics {
    /// Calls to [`Document::query`]
    pub queries: u64,
    /// Queries answered from the array cache
    pub cache_hits: u64,
    /// Queries that fell through to streaming
    pub cache_misses: u64,
    /// Tokenizer passes opened over the mapped file
    pub tokenizer_opens: u64,
}

/// Handle over one memory-mapped JSON document.
#[derive(Debug)]
pub struct Document {
    path: PathBuf,
    config: EngineConfig,
    source: RwLock<Option<DataSource>>,
    cache: ArrayCache,
    queries: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    tokenizer_opens: AtomicU64,
}

impl Document {
    /// Open a document with the default configuration.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, EngineConfig::default())
    }

    /// Open a document with an explicit configuration.
    pub fn open_with(path: impl AsRef<Path>, config: EngineConfig) -> Result<Self> {
        let source = DataSource::open(path.as_ref(), config.max_depth)?;
        Ok(Self {
            path: source.path().to_path_buf(),
            config,
            source: RwLock::new(Some(source)),
            cache: ArrayCache::new(),
            queries: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            tokenizer_opens: AtomicU64::new(0),
        })
    }

    /// Path this document was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Primary entry point: evaluate `path` against the document.
    ///
    /// A non-positive `limit` means unlimited. The optional predicate is
    /// applied at leaf materializations, after any path-level filter.
    /// Query-time failures are logged and yield an empty list; the
    /// handle stays usable.
    pub fn query(
        &self,
        path: &str,
        limit: i64,
        predicate: Option<&RowPredicate>,
    ) -> Vec<Value> {
        self.queries.fetch_add(1, Ordering::Relaxed);

        if self.config.enable_array_cache {
            if let Some(hit) = self.query_cached(path, limit, predicate) {
                self.cache_hits.fetch_add(1, Ordering::Relaxed);
                debug!(path, "served from array cache");
                return hit;
            }
            self.cache_misses.fetch_add(1, Ordering::Relaxed);
        }

        match self.stream_query(path, limit, predicate) {
            Ok(results) => flatten(results),
            Err(e) => {
                warn!(path, error = %e, "query failed");
                Vec::new()
            }
        }
    }

    /// Serve from the cache, or `None` on miss.
    fn query_cached(
        &self,
        path: &str,
        limit: i64,
        predicate: Option<&RowPredicate>,
    ) -> Option<Vec<Value>> {
        match split_filter_query(path) {
            // No filter: a full-path entry is returned verbatim
            None => self.cache.lookup(path),
            Some((array_path, expr)) => {
                let values = self.cache.lookup(array_path)?;
                let filter = compile_filter(expr);
                let mut hits = filter_scan(&values, &filter, limit);
                if let Some(pred) = predicate {
                    hits.retain(|row| pred(row));
                }
                Some(hits)
            }
        }
    }

    /// Compile and stream, without the single-array unwrap.
    fn stream_query(
        &self,
        path: &str,
        limit: i64,
        predicate: Option<&RowPredicate>,
    ) -> Result<Vec<Value>> {
        let segments = compile(path)?;
        let guard = self.source.read();
        let Some(source) = guard.as_ref() else {
            return Err(MapQueryError::Released(self.path.clone()));
        };
        self.tokenizer_opens.fetch_add(1, Ordering::Relaxed);
        let mut tok = source.tokenizer();
        Evaluator::new(&segments, limit, predicate).run(&mut tok)
    }

    /// Materialize the array at `path` into the cache.
    ///
    /// Returns the cached elements, or `None` when the path selected
    /// nothing.
    pub fn cache_array(&self, path: &str) -> Option<Vec<Value>> {
        self.cache_array_as(path, path)
    }

    /// Materialize `path` but cache it under an explicit key, aliasing
    /// later queries on that key.
    pub fn cache_array_as(&self, path: &str, cache_key: &str) -> Option<Vec<Value>> {
        match self.stream_query(path, -1, None) {
            Ok(result) => {
                let stored = self.cache.store(cache_key, result);
                debug!(
                    path,
                    cache_key,
                    cached = stored.as_ref().map_or(0, Vec::len),
                    "array cache fill"
                );
                stored
            }
            Err(e) => {
                warn!(path, error = %e, "array cache fill failed");
                None
            }
        }
    }

    /// True when `path` has a cache entry.
    pub fn is_array_cached(&self, path: &str) -> bool {
        self.cache.is_cached(path)
    }

    /// Drop the cache entry for `path`.
    pub fn invalidate_array_cache(&self, path: &str) {
        self.cache.invalidate(path);
    }

    /// Drop every cache entry.
    pub fn clear_array_cache(&self) {
        self.cache.clear();
    }

    /// Release the mapped buffer and clear the array cache. Subsequent
    /// queries return empty results; reopening is explicit.
    pub fn release(&self) {
        *self.source.write() = None;
        self.cache.clear();
        debug!(path = %self.path.display(), "released document");
    }

    /// Current counter snapshot.
    pub fn metrics(&self) -> QueryMetrics {
        QueryMetrics {
            queries: self.queries.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            tokenizer_opens: self.tokenizer_opens.load(Ordering::Relaxed),
        }
    }
}

/// A one-element result whose sole element is an array unwraps one
/// level, aligning `$.some.array` with `$.some.array[*]`.
fn flatten(mut results: Vec<Value>) -> Vec<Value> {
    if results.len() == 1 && matches!(results[0], Value::Array(_)) {
        if let Some(Value::Array(items)) = results.pop() {
            return items;
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture(json: &str) -> (tempfile::NamedTempFile, Document) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        let doc = Document::open(file.path()).unwrap();
        (file, doc)
    }

    const DOC: &str = r#"{"rows": [{"id": 1, "on": true}, {"id": 2, "on": false}, {"id": 3, "on": true}]}"#;

    #[test]
    fn test_query_flattens_single_array() {
        let (_file, doc) = fixture(DOC);
        let rows = doc.query("$.rows", -1, None);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows, doc.query("$.rows[*]", -1, None));
    }

    #[test]
    fn test_query_scalar_result_is_not_unwrapped() {
        let (_file, doc) = fixture(r#"{"n": 7}"#);
        assert_eq!(doc.query("$.n", -1, None), vec![Value::Integer(7)]);
    }

    #[test]
    fn test_invalid_path_yields_empty() {
        let (_file, doc) = fixture(DOC);
        assert!(doc.query("rows", -1, None).is_empty());
        assert!(doc.query("$", -1, None).is_empty());
    }

    #[test]
    fn test_malformed_document_yields_empty() {
        let (_file, doc) = fixture(r#"{"rows": [{"id": 1},"#);
        assert!(doc.query("$.rows[*]", -1, None).is_empty());
        // The handle stays usable
        assert!(doc.query("$.rows[0]", -1, None).is_empty());
    }

    #[test]
    fn test_cache_roundtrip() {
        let (_file, doc) = fixture(DOC);
        let cached = doc.cache_array("$.rows").unwrap();
        assert_eq!(cached.len(), 3);
        assert!(doc.is_array_cached("$.rows"));

        let opens_before = doc.metrics().tokenizer_opens;
        let hits = doc.query("$.rows[?(@.id>1)]", -1, None);
        assert_eq!(hits.len(), 2);
        assert_eq!(doc.metrics().tokenizer_opens, opens_before);

        doc.invalidate_array_cache("$.rows");
        assert!(!doc.is_array_cached("$.rows"));
    }

    #[test]
    fn test_cache_alias_key() {
        let (_file, doc) = fixture(DOC);
        doc.cache_array_as("$.rows", "$.aliased").unwrap();
        assert!(doc.is_array_cached("$.aliased"));
        assert!(!doc.is_array_cached("$.rows"));
        assert_eq!(doc.query("$.aliased[?(@.on==true)]", -1, None).len(), 2);
    }

    #[test]
    fn test_release_clears_state() {
        let (_file, doc) = fixture(DOC);
        doc.cache_array("$.rows").unwrap();
        doc.release();
        assert!(!doc.is_array_cached("$.rows"));
        assert!(doc.query("$.rows[*]", -1, None).is_empty());
    }

    #[test]
    fn test_cache_disabled_by_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DOC.as_bytes()).unwrap();
        let config = EngineConfig {
            enable_array_cache: false,
            ..EngineConfig::default()
        };
        let doc = Document::open_with(file.path(), config).unwrap();
        doc.cache_array("$.rows").unwrap();

        let opens_before = doc.metrics().tokenizer_opens;
        doc.query("$.rows[?(@.id>1)]", -1, None);
        // Dispatch ignored the cache and streamed
        assert_eq!(doc.metrics().tokenizer_opens, opens_before + 1);
    }
}
