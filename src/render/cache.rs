//! Cached renderer
//!
//! `Renderer` keeps recently opened documents in a locator-keyed LRU cache
//! so repeated requests against the same file skip the open/parse step.
//! The cache lock only covers lookups and inserts; opens are guarded by a
//! per-locator gate, so at most one open runs per locator while requests
//! for other documents proceed in parallel. Opened documents are immutable
//! and shared via `Arc`, so concurrent renders never contend beyond the
//! cache lookup itself.
//!
//! Byte sources have no stable identity to key on and bypass the cache.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::debug;

use crate::document::{DocumentSource, PdfDocument};
use crate::error::RasterResult;
use crate::render::{self, PageSize, RenderSpec};

/// Cache configuration
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Maximum number of open documents to keep
    pub max_documents: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self { max_documents: 16 }
    }
}

/// A render frontend with a bounded document cache
pub struct Renderer {
    documents: Mutex<LruCache<String, Arc<PdfDocument>>>,
    /// In-flight opens keyed by locator; entries exist only while an open
    /// is running or waited on
    opening: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        let capacity =
            NonZeroUsize::new(config.max_documents.max(1)).expect("capacity is at least 1");
        Self {
            documents: Mutex::new(LruCache::new(capacity)),
            opening: Mutex::new(HashMap::new()),
        }
    }

    /// Rasterize one page to PNG bytes, reusing a cached document if present
    pub fn render_page(
        &self,
        source: &DocumentSource,
        page_index: usize,
        spec: &RenderSpec,
    ) -> RasterResult<Vec<u8>> {
        spec.validate()?;
        render::validate_source(source)?;
        let doc = self.document(source)?;
        let page = doc.page(page_index)?;
        render::render_resolved(&page, spec)
    }

    /// Number of pages in a document
    pub fn page_count(&self, source: &DocumentSource) -> RasterResult<usize> {
        render::validate_source(source)?;
        Ok(self.document(source)?.page_count())
    }

    /// Displayed size of one page in integer points
    pub fn page_size(&self, source: &DocumentSource, page_index: usize) -> RasterResult<PageSize> {
        render::validate_source(source)?;
        let doc = self.document(source)?;
        let page = doc.page(page_index)?;
        Ok(PageSize::of(&page.geometry))
    }

    /// Drop a cached document, e.g. after the file changed on disk
    pub fn evict(&self, locator: &str) {
        self.documents.lock().pop(locator);
    }

    /// Drop all cached documents
    pub fn clear(&self) {
        self.documents.lock().clear();
    }

    /// Fetch a cached document or open and cache it
    fn document(&self, source: &DocumentSource) -> RasterResult<Arc<PdfDocument>> {
        let key = match source {
            DocumentSource::Path(_) => source.locator(),
            // In-memory sources are opened per request.
            DocumentSource::Bytes(_) => {
                return Ok(Arc::new(PdfDocument::open(source)?));
            }
        };

        if let Some(doc) = self.documents.lock().get(&key) {
            return Ok(Arc::clone(doc));
        }

        // Take the per-locator gate; the maps' locks are never held across
        // a parse, so only same-locator opens serialize.
        let gate = Arc::clone(self.opening.lock().entry(key.clone()).or_default());
        let _open = gate.lock();

        // A request that held the gate before us may have cached the
        // document while we waited.
        {
            let mut cache = self.documents.lock();
            if let Some(doc) = cache.get(&key) {
                let doc = Arc::clone(doc);
                drop(cache);
                self.release_gate(&key, &gate);
                return Ok(doc);
            }
        }

        let result = PdfDocument::open(source).map(Arc::new);
        if let Ok(doc) = &result {
            self.documents.lock().put(key.clone(), Arc::clone(doc));
            debug!(locator = %key, "document cached");
        }
        self.release_gate(&key, &gate);
        result
    }

    /// Drop a locator's open gate once no other request holds it
    fn release_gate(&self, key: &str, gate: &Arc<Mutex<()>>) {
        let mut opening = self.opening.lock();
        // Two strong counts are the map entry and our own clone; more means
        // a waiter that will release the gate when it finishes.
        if Arc::strong_count(gate) <= 2 {
            opening.remove(key);
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RendererConfig::default())
    }
}
