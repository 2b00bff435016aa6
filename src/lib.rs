//! PDF page rasterization core
//!
//! A synchronous, self-contained rendering core for PDF pages: open a
//! document, count its pages, query page geometry, and rasterize a page
//! (or a tile of one) to a PNG byte stream.
//!
//! The crate is designed to sit behind a message-channel plugin shim or
//! any other transport layer. It exposes plain blocking functions with no
//! runtime dependency; the caller is responsible for dispatching them onto
//! a worker context and delivering results back to wherever they need to
//! reach.
//!
//! # Modules
//!
//! - `document`: document opening, page lookup, and page geometry
//! - `raster`: coordinate transform, canvas, content interpreter, encoder
//! - `render`: the render pipeline and the cached [`Renderer`]
//! - `error`: the caller-visible error type

pub mod document;
pub mod error;
pub mod raster;
pub mod render;

pub use document::{DocumentSource, Page, PageGeometry, PdfDocument};
pub use error::{RasterError, RasterResult};
pub use render::{
    page_count, page_size, render_page, PageSize, RenderSpec, Renderer, RendererConfig,
};
