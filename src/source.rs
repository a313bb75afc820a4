//! Memory-mapped document source
//!
//! Owns the read-only view of the JSON file and produces pull tokenizers
//! positioned at offset 0. The mapping is shared freely by the OS page
//! cache; it stays immutable for the life of the source.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use tracing::debug;

use crate::error::{MapQueryError, Result};
use crate::tokenizer::JsonTokenizer;

/// Read-only mapping of one JSON document.
///
/// A zero-length file cannot be mapped, so it is represented by no
/// mapping at all; its tokenizer immediately reports end of stream.
#[derive(Debug)]
pub struct DataSource {
    path: PathBuf,
    map: Option<Mmap>,
    max_depth: usize,
}

impl DataSource {
    /// Open `path` read-only and map its full length.
    pub fn open(path: &Path, max_depth: usize) -> Result<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => MapQueryError::NotFound(path.to_path_buf()),
            _ => MapQueryError::Io(e),
        })?;
        let map = if file.metadata()?.len() == 0 {
            None
        } else {
            // The file is opened read-only and never written through
            // this handle; the mapping lives as long as `map`.
            Some(unsafe { Mmap::map(&file)? })
        };
        debug!(
            path = %path.display(),
            len = map.as_ref().map_or(0, |m| m.len()),
            "mapped document"
        );
        Ok(Self {
            path: path.to_path_buf(),
            map,
            max_depth,
        })
    }

    fn bytes(&self) -> &[u8] {
        self.map.as_deref().unwrap_or(&[])
    }

    /// Canonical path this source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mapped length in bytes.
    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    /// True for a zero-length document; queries over it yield `[]`.
    pub fn is_empty(&self) -> bool {
        self.bytes().is_empty()
    }

    /// A fresh tokenizer reading from offset 0.
    pub fn tokenizer(&self) -> JsonTokenizer<'_> {
        JsonTokenizer::with_max_depth(self.bytes(), self.max_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_DEPTH;
    use crate::tokenizer::Token;
    use std::io::Write;

    #[test]
    fn test_open_missing_file() {
        let err = DataSource::open(Path::new("/no/such/file.json"), DEFAULT_MAX_DEPTH)
            .unwrap_err();
        assert!(matches!(err, MapQueryError::NotFound(_)));
    }

    #[test]
    fn test_open_and_tokenize() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"a": 1}"#).unwrap();
        let source = DataSource::open(file.path(), DEFAULT_MAX_DEPTH).unwrap();
        assert_eq!(source.len(), 8);

        let mut tok = source.tokenizer();
        assert_eq!(tok.next_token().unwrap(), Token::ObjectStart);
        // Each call starts a fresh pass from offset 0
        let mut tok = source.tokenizer();
        assert_eq!(tok.next_token().unwrap(), Token::ObjectStart);
    }

    #[test]
    fn test_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let source = DataSource::open(file.path(), DEFAULT_MAX_DEPTH).unwrap();
        assert!(source.is_empty());
        let mut tok = source.tokenizer();
        assert_eq!(tok.next_token().unwrap(), Token::Eof);
    }
}
