//! Process-wide document registry
//!
//! One handle per canonical file path, shared across the process. The
//! registry holds its own reference; callers keep a handle alive by
//! holding their clone after release.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{MapQueryError, Result};
use crate::handle::Document;

static REGISTRY: OnceLock<Mutex<HashMap<PathBuf, Arc<Document>>>> = OnceLock::new();

fn registry() -> &'static Mutex<HashMap<PathBuf, Arc<Document>>> {
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

fn canonicalize(path: &Path) -> Result<PathBuf> {
    path.canonicalize().map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => MapQueryError::NotFound(path.to_path_buf()),
        _ => MapQueryError::Io(e),
    })
}

/// Return the handle for `path`, constructing it on first use.
///
/// Idempotent and thread-safe: identical canonical paths yield the same
/// handle.
pub fn get_or_create(path: impl AsRef<Path>) -> Result<Arc<Document>> {
    let canonical = canonicalize(path.as_ref())?;
    let mut map = registry().lock();
    if let Some(doc) = map.get(&canonical) {
        return Ok(Arc::clone(doc));
    }
    let doc = Arc::new(Document::open(&canonical)?);
    map.insert(canonical.clone(), Arc::clone(&doc));
    debug!(path = %canonical.display(), "registered document");
    Ok(doc)
}

/// Drop the registry's reference for `path`. Callers still holding the
/// handle keep it alive.
pub fn release_instance(path: impl AsRef<Path>) {
    if let Ok(canonical) = canonicalize(path.as_ref()) {
        registry().lock().remove(&canonical);
    }
}

/// Empty the registry.
pub fn release_all() {
    registry().lock().clear();
}
