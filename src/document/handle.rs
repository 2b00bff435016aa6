//! Opened PDF documents
//!
//! `PdfDocument` validates a byte source as a PDF container on open and
//! exposes the ordered page list. Each page resolves to an immutable
//! [`Page`] value carrying its geometry and decoded content-stream bytes,
//! so rendering never needs to touch the document again.
//!
//! The whole source is read into memory on open; no file handles outlive
//! the call. A `PdfDocument` is immutable after construction and safe to
//! share across worker threads behind an `Arc`.

use lopdf::{Document, ObjectId};
use tracing::debug;

use crate::document::geometry::{self, PageGeometry};
use crate::document::DocumentSource;
use crate::error::{RasterError, RasterResult};

/// An opened, validated PDF document
#[derive(Debug)]
pub struct PdfDocument {
    doc: Document,
    /// Page object ids in document order (index 0 = first page)
    pages: Vec<ObjectId>,
    locator: String,
}

/// A single resolved page, immutable once created
#[derive(Debug, Clone)]
pub struct Page {
    /// Zero-based page index
    pub index: usize,
    /// Media-box geometry and rotation
    pub geometry: PageGeometry,
    /// Decoded content-stream bytes (empty for a page with no content)
    pub content: Vec<u8>,
}

impl PdfDocument {
    /// Open and validate a document from a byte source
    ///
    /// Fails with [`RasterError::DocumentOpenFailed`] if the source does not
    /// exist, is not readable, is not a well-formed PDF container, or is
    /// encrypted.
    pub fn open(source: &DocumentSource) -> RasterResult<Self> {
        let locator = source.locator();
        let open_failed = |reason: String| RasterError::DocumentOpenFailed {
            locator: locator.clone(),
            reason,
        };

        let doc = match source {
            DocumentSource::Bytes(data) => {
                Document::load_mem(data).map_err(|e| open_failed(e.to_string()))?
            }
            DocumentSource::Path(path) => {
                Document::load(path).map_err(|e| open_failed(e.to_string()))?
            }
        };

        if doc.is_encrypted() {
            return Err(open_failed("document is encrypted".into()));
        }

        // get_pages is keyed by 1-based page number; BTreeMap iteration
        // yields document order.
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        debug!(locator = %locator, page_count = pages.len(), "opened document");

        Ok(Self {
            doc,
            pages,
            locator,
        })
    }

    /// Number of pages in the document
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Locator this document was opened from
    pub fn locator(&self) -> &str {
        &self.locator
    }

    /// Resolve the page at a zero-based index
    ///
    /// Fails with [`RasterError::PageOpenFailed`] when the index is out of
    /// range `[0, page_count)` or the page object is corrupt.
    pub fn page(&self, index: usize) -> RasterResult<Page> {
        let page_id = *self
            .pages
            .get(index)
            .ok_or(RasterError::PageOpenFailed(index))?;

        let dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|_| RasterError::PageOpenFailed(index))?;

        let geometry = geometry::resolve(&self.doc, dict);

        // A page with no /Contents is legal and paints nothing.
        let content = if dict.get(b"Contents").is_ok() {
            self.doc
                .get_page_content(page_id)
                .map_err(|_| RasterError::PageOpenFailed(index))?
        } else {
            Vec::new()
        };

        Ok(Page {
            index,
            geometry,
            content,
        })
    }
}
