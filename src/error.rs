//! Error types for mapquery
//!
//! Construction failures (missing file, failed mapping) surface to the
//! caller. Query-time failures never do: they are caught at the query
//! boundary, logged, and mapped to an empty result list.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for query engine operations
#[derive(Error, Debug)]
pub enum MapQueryError {
    /// Document file does not exist
    #[error("document not found: {0}")]
    NotFound(PathBuf),

    /// Underlying I/O error while opening or mapping the document
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Path expression could not be compiled
    #[error("invalid path expression: {0}")]
    InvalidPath(String),

    /// Malformed JSON encountered while streaming
    #[error("malformed JSON at byte {offset}: {message}")]
    Tokenize {
        /// Byte offset of the offending input
        offset: usize,
        /// What the tokenizer expected or found
        message: String,
    },

    /// The mapped buffer was released; reopening is explicit
    #[error("document released: {0}")]
    Released(PathBuf),

    /// A terminal builder operation found no rows
    #[error("query returned no results")]
    NoResults,
}

/// Result type alias for query engine operations
pub type Result<T> = std::result::Result<T, MapQueryError>;
