//! Document byte sources
//!
//! A source is either a file path or an owned byte buffer. Byte buffers are
//! reference counted so a source can be cloned into a cache or across worker
//! threads without copying the document data.

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source data for a document
#[derive(Debug, Clone)]
pub enum DocumentSource {
    /// Document loaded from owned bytes
    Bytes(Arc<Vec<u8>>),
    /// Document loaded from a file path
    Path(PathBuf),
}

impl DocumentSource {
    /// Create a source from bytes
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self::Bytes(Arc::new(data))
    }

    /// Create a source from a file path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        Self::Path(path.as_ref().to_path_buf())
    }

    /// Human-readable locator used in error payloads and as a cache key
    pub fn locator(&self) -> String {
        match self {
            Self::Bytes(data) => format!("<{} bytes in memory>", data.len()),
            Self::Path(path) => path.display().to_string(),
        }
    }
}
