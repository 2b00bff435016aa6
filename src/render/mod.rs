//! Render pipeline
//!
//! The caller-facing operations: `render_page`, `page_count`, and
//! `page_size`. Each request runs the same strictly sequential pipeline:
//! validate the spec, open the document, resolve the page, build the
//! transform, draw into a white canvas, encode PNG. The first error aborts
//! the request; there is no retry and no partial success.
//!
//! These functions open the document per request and share nothing, so they
//! are safe to call from any worker context. [`Renderer`] layers a document
//! cache on top for callers issuing repeated requests.

mod cache;

pub use cache::{Renderer, RendererConfig};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::{DocumentSource, Page, PageGeometry, PdfDocument};
use crate::error::{RasterError, RasterResult};
use crate::raster::{build_transform, encode_png, RasterCanvas};

/// Caller-supplied render parameters
///
/// `width`/`height` are the target canvas size in pixels. Transport shims
/// exposing a required-size interface should pass both explicitly; omitting
/// a dimension is a convenience for direct callers, defaulting it to the
/// page's displayed size times `scale`, rounded to the nearest pixel with a
/// one-pixel minimum. Offsets are post-scale device pixels and may be
/// negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSpec {
    /// Target canvas width in pixels, must be positive when given
    pub width: Option<u32>,
    /// Target canvas height in pixels, must be positive when given
    pub height: Option<u32>,
    /// Uniform content scale factor, finite and non-negative
    pub scale: f32,
    /// Horizontal viewport offset in device pixels
    pub x_offset: i32,
    /// Vertical viewport offset in device pixels
    pub y_offset: i32,
}

impl Default for RenderSpec {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            scale: 1.0,
            x_offset: 0,
            y_offset: 0,
        }
    }
}

impl RenderSpec {
    /// Check every field against its documented domain
    pub fn validate(&self) -> RasterResult<()> {
        if self.width == Some(0) {
            return Err(RasterError::InvalidArgument("width".into()));
        }
        if self.height == Some(0) {
            return Err(RasterError::InvalidArgument("height".into()));
        }
        if !self.scale.is_finite() || self.scale < 0.0 {
            return Err(RasterError::InvalidArgument("scale".into()));
        }
        Ok(())
    }

    /// Canvas pixel dimensions for a page
    ///
    /// Explicit dimensions are used verbatim. A missing dimension defaults
    /// to `round(display_dim * scale)`, clamped to one pixel so degenerate
    /// requests (scale 0, zero-area page) still yield an encodable blank
    /// canvas.
    fn canvas_size(&self, geometry: &PageGeometry) -> (u32, u32) {
        let scaled = |dim: f32| ((dim as f64 * self.scale as f64).round() as u32).max(1);
        (
            self.width.unwrap_or_else(|| scaled(geometry.display_width())),
            self.height.unwrap_or_else(|| scaled(geometry.display_height())),
        )
    }
}

/// Displayed page size in integer points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: u32,
    pub height: u32,
}

impl PageSize {
    fn of(geometry: &PageGeometry) -> Self {
        Self {
            width: geometry.display_width().round() as u32,
            height: geometry.display_height().round() as u32,
        }
    }
}

/// Rasterize one page to PNG bytes
pub fn render_page(
    source: &DocumentSource,
    page_index: usize,
    spec: &RenderSpec,
) -> RasterResult<Vec<u8>> {
    spec.validate()?;
    validate_source(source)?;
    let doc = PdfDocument::open(source)?;
    let page = doc.page(page_index)?;
    render_resolved(&page, spec)
}

/// Number of pages in a document
pub fn page_count(source: &DocumentSource) -> RasterResult<usize> {
    validate_source(source)?;
    Ok(PdfDocument::open(source)?.page_count())
}

/// Displayed size of one page in integer points
pub fn page_size(source: &DocumentSource, page_index: usize) -> RasterResult<PageSize> {
    validate_source(source)?;
    let doc = PdfDocument::open(source)?;
    let page = doc.page(page_index)?;
    Ok(PageSize::of(&page.geometry))
}

/// Render a resolved page: transform, canvas, draw, encode
pub(crate) fn render_resolved(page: &Page, spec: &RenderSpec) -> RasterResult<Vec<u8>> {
    let transform = build_transform(&page.geometry, spec.scale, spec.x_offset, spec.y_offset);
    let (width, height) = spec.canvas_size(&page.geometry);
    debug!(
        page = page.index,
        width,
        height,
        scale = spec.scale,
        "rendering page"
    );

    let mut canvas = RasterCanvas::new(width, height)?;
    canvas.draw_page(page, transform)?;
    encode_png(canvas)
}

/// Reject unusable locators before any I/O is attempted
pub(crate) fn validate_source(source: &DocumentSource) -> RasterResult<()> {
    if let DocumentSource::Path(path) = source {
        if path.as_os_str().is_empty() {
            return Err(RasterError::InvalidArgument("path".into()));
        }
    }
    Ok(())
}
